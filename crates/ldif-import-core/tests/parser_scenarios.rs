//! # Parser Scenario Tests
//!
//! End-to-end Pass 1 behavior over realistic LDIF fragments.
//!
//! ## Scenarios
//! - S0: Record reconstruction (folding, separators, encodings)
//! - S1: Classification
//! - S2: Schema inference
//! - S3: DN index for member resolution

use ldif_import_core::{AttributeNameCache, ParsedDirectory, parse_ldif};

fn parse(text: &str) -> ParsedDirectory {
    parse_ldif(text.as_bytes(), &AttributeNameCache::new()).expect("parse")
}

const DIRECTORY: &str = "\
version: 1

dn: uid=bob,ou=People,dc=example,dc=com
objectClass: inetOrgPerson
objectClass: posixAccount
uid: bob
cn: Bob Jones
sn: Jones
mail: bob@x.com
telephoneNumber: 555-0100
telephoneNumber: 555-0101
description: A long description that was
  folded by the exporter

dn: cn=Jane Doe,ou=People,dc=example,dc=com
objectClass: person
cn: Jane Doe
givenName:: SmFuZQ==

dn: cn=staff,ou=Groups,dc=example,dc=com
objectClass: posixGroup
cn: staff
gidNumber: 5000
memberUid: bob
member: cn=Jane Doe,ou=People,dc=example,dc=com
";

// =============================================================================
// S0: RECORD RECONSTRUCTION
// =============================================================================

mod s0_reconstruction {
    use super::*;

    /// S0.1: Records come out in input order, header block included.
    #[test]
    fn records_in_input_order() {
        let parsed = parse(DIRECTORY);

        assert_eq!(parsed.records.len(), 4);
        assert_eq!(parsed.records[1].uid, "bob");
        assert_eq!(parsed.records[2].cn, "Jane Doe");
        assert_eq!(parsed.records[3].cn, "staff");
    }

    /// S0.2: Folded value keeps the continuation's own leading space.
    #[test]
    fn folded_value_is_joined() {
        let parsed = parse(DIRECTORY);
        assert_eq!(
            parsed.records[1].first("description"),
            Some("A long description that was folded by the exporter")
        );
    }

    /// S0.3: Multiple values keep order.
    #[test]
    fn multi_values_keep_order() {
        let parsed = parse(DIRECTORY);
        assert_eq!(
            parsed.records[1].values("telephonenumber"),
            ["555-0100", "555-0101"]
        );
    }

    /// S0.4: Base64 given name is decoded onto the alias target.
    #[test]
    fn base64_given_name_decoded() {
        let parsed = parse(DIRECTORY);
        assert_eq!(parsed.records[2].first("firstname"), Some("Jane"));
    }

    /// S0.5: Mirrored fields follow the canonical attributes.
    #[test]
    fn mirrored_fields() {
        let parsed = parse(DIRECTORY);
        let bob = &parsed.records[1];

        assert_eq!(bob.dn, "uid=bob,ou=People,dc=example,dc=com");
        assert_eq!(bob.mail, "bob@x.com");
        assert_eq!(bob.first("lastname"), Some("Jones"));
    }

    /// S0.6: A base64 mail address is decoded.
    #[test]
    fn base64_mail_decoded() {
        let parsed = parse("dn: uid=t\nuid: t\nmail:: dGVzdEBleGFtcGxlLmNvbQ==\n");
        assert_eq!(parsed.records[0].mail, "test@example.com");
    }
}

// =============================================================================
// S1: CLASSIFICATION
// =============================================================================

mod s1_classification {
    use super::*;

    /// S1.1: Each record class is recognized.
    #[test]
    fn classes_recognized() {
        let parsed = parse(DIRECTORY);
        let flags: Vec<(bool, bool)> = parsed
            .records
            .iter()
            .map(|r| (r.is_person, r.is_group))
            .collect();

        assert_eq!(
            flags,
            [(false, false), (true, false), (true, false), (false, true)]
        );
    }

    /// S1.2: A group keeps its group flag even with a uid.
    #[test]
    fn group_with_uid_is_not_a_person() {
        let parsed = parse("dn: cn=g\nobjectClass: posixGroup\nuid: g\ncn: g\n");
        assert!(parsed.records[0].is_group);
        assert!(!parsed.records[0].is_person);
    }
}

// =============================================================================
// S2: SCHEMA INFERENCE
// =============================================================================

mod s2_schema {
    use super::*;

    /// S2.1: Person catalog holds non-core person attributes.
    #[test]
    fn person_catalog() {
        let parsed = parse(DIRECTORY);
        let users = &parsed.user_schema;

        assert!(users.get("telephonenumber").expect("phone").is_list);
        assert!(!users.get("description").expect("description").is_list);
        assert!(users.get("uid").is_none());
        assert!(users.get("firstname").is_none());
    }

    /// S2.2: Group catalog is separate.
    #[test]
    fn group_catalog() {
        let parsed = parse(DIRECTORY);
        let groups = &parsed.group_schema;

        assert!(groups.get("gidnumber").is_some());
        assert!(groups.get("memberuid").is_some());
        assert!(parsed.user_schema.get("gidnumber").is_none());
    }

    /// S2.3: Cache spelling decides the catalog key.
    #[test]
    fn cache_spelling_used_in_catalog() {
        let cache = AttributeNameCache::from_names(["telephone_number"]);
        let parsed = parse_ldif(DIRECTORY.as_bytes(), &cache).expect("parse");

        assert!(parsed.user_schema.get("telephone_number").is_some());
        assert!(parsed.user_schema.get("telephonenumber").is_none());
    }
}

// =============================================================================
// S3: DN INDEX
// =============================================================================

mod s3_dn_index {
    use super::*;

    /// S3.1: Persons are indexed by lower-cased DN.
    #[test]
    fn persons_indexed() {
        let parsed = parse(DIRECTORY);

        assert_eq!(parsed.dn_index.len(), 2);
        assert_eq!(
            parsed
                .dn_index
                .resolve("cn=jane doe,ou=people,dc=example,dc=com"),
            Some("jane.doe")
        );
        assert_eq!(
            parsed.dn_index.resolve("UID=BOB,OU=PEOPLE,DC=EXAMPLE,DC=COM"),
            Some("bob")
        );
    }

    /// S3.2: Groups are never indexed.
    #[test]
    fn groups_not_indexed() {
        let parsed = parse(DIRECTORY);
        assert!(
            parsed
                .dn_index
                .resolve("cn=staff,ou=Groups,dc=example,dc=com")
                .is_none()
        );
    }
}
