//! # Property-Based Tests
//!
//! Invariants of the identity resolver and the parser, checked with proptest.

use ldif_import_core::{AttributeNameCache, parse_ldif, rotate_email, sanitize_id};
use proptest::prelude::*;
use std::collections::BTreeSet;

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Sanitized identifiers only contain the identifier alphabet.
    #[test]
    fn sanitized_ids_stay_in_alphabet(input in ".{0,64}") {
        let id = sanitize_id(&input);
        prop_assert!(id.chars().all(|c| c.is_ascii_lowercase()
            || c.is_ascii_digit()
            || matches!(c, '.' | '_' | '-')));
    }

    /// Sanitizing twice changes nothing.
    #[test]
    fn sanitize_is_idempotent(input in ".{0,64}") {
        let once = sanitize_id(&input);
        prop_assert_eq!(sanitize_id(&once), once.clone());
    }

    /// Rotation is a pure function of its inputs and never repeats an address.
    #[test]
    fn rotation_is_deterministic_and_distinct(
        local in "[a-z]{1,12}",
        domain in "[a-z]{1,12}\\.com",
        surname in "[A-Za-z]{1,12}",
    ) {
        let base = format!("{local}@{domain}");
        let mut seen = BTreeSet::new();
        for attempt in 0..100 {
            let first = rotate_email(&base, &surname, attempt, "imported.local");
            let second = rotate_email(&base, &surname, attempt, "imported.local");
            prop_assert_eq!(&first, &second);
            let domain_suffix = format!("@{domain}");
            prop_assert!(first.ends_with(&domain_suffix));
            prop_assert!(seen.insert(first));
        }
    }

    /// Folding a value at any split point yields the unfolded value.
    #[test]
    fn folding_concatenates_verbatim(value in "[a-zA-Z0-9 ]{2,80}", split in 1usize..79) {
        let split = split.min(value.len() - 1);
        let (head, tail) = value.split_at(split);
        let folded = format!("dn: cn=x\ndescription: {head}\n {tail}\n");

        let parsed = parse_ldif(folded.as_bytes(), &AttributeNameCache::new()).expect("parse");
        let expected = format!("{head}{tail}");
        prop_assert_eq!(parsed.records[0].first("description"), Some(expected.trim()));
    }
}
