//! # Innate Primitives
//!
//! Hardcoded constants for the import pipeline.
//!
//! The tables and limits below are compiled into the binary and are immutable
//! at runtime. Values that an operator may reasonably want to change (domains,
//! fallback password, admin account) are only *defaults* here; the app layer
//! exposes them through its configuration file.

// =============================================================================
// ATTRIBUTE ALIASES
// =============================================================================

/// A fixed mapping from a directory attribute spelling to a target name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAlias {
    /// Lower-cased source key as it appears in the export.
    pub source: &'static str,
    /// Canonical attribute name on the record.
    pub target: &'static str,
    /// Binary payload that the store accepts in base64 form.
    ///
    /// Base64-marked values of binary aliases are kept encoded; every other
    /// base64-marked value is decoded.
    pub binary: bool,
}

/// Alias table consulted before name normalization.
pub const FIELD_ALIASES: &[FieldAlias] = &[
    FieldAlias { source: "jpegphoto", target: AVATAR_ATTRIBUTE, binary: true },
    FieldAlias { source: "photo", target: AVATAR_ATTRIBUTE, binary: true },
    FieldAlias { source: "givenname", target: FIRSTNAME_ATTRIBUTE, binary: false },
    FieldAlias { source: "given_name", target: FIRSTNAME_ATTRIBUTE, binary: false },
    FieldAlias { source: "sn", target: LASTNAME_ATTRIBUTE, binary: false },
    FieldAlias { source: "surname", target: LASTNAME_ATTRIBUTE, binary: false },
    FieldAlias { source: "mail", target: "mail", binary: false },
    FieldAlias { source: "uid", target: "uid", binary: false },
];

/// Look up a raw key in the alias table (case-insensitive, exact).
pub fn lookup_alias(raw_key: &str) -> Option<&'static FieldAlias> {
    let lower = raw_key.to_lowercase();
    FIELD_ALIASES.iter().find(|alias| alias.source == lower)
}

// =============================================================================
// ATTRIBUTE NAMES
// =============================================================================

pub const DN_ATTRIBUTE: &str = "dn";
pub const UID_ATTRIBUTE: &str = "uid";
pub const CN_ATTRIBUTE: &str = "cn";
pub const MAIL_ATTRIBUTE: &str = "mail";
pub const FIRSTNAME_ATTRIBUTE: &str = "firstname";
pub const LASTNAME_ATTRIBUTE: &str = "lastname";
pub const PASSWORD_ATTRIBUTE: &str = "userpassword";
pub const AVATAR_ATTRIBUTE: &str = "avatar";

/// Raw `jpegPhoto` spelling, only reachable through the attribute cache.
pub const JPEG_PHOTO_ATTRIBUTE: &str = "jpegphoto";

/// Both spellings under which object classes may be stored.
pub const OBJECT_CLASS_ATTRIBUTES: [&str; 2] = ["objectclass", "object_class"];

/// Both spellings under which literal member identifiers may be stored.
pub const MEMBER_UID_ATTRIBUTES: [&str; 2] = ["memberuid", "member_uid"];

/// Member references by distinguished name.
pub const MEMBER_DN_ATTRIBUTE: &str = "member";

/// User attribute holding the source DN of an imported entry.
pub const LEGACY_DN_ATTRIBUTE: &str = "legacydn";

/// Reserved names that are mapped onto dedicated store fields and are never
/// registered as custom attributes.
pub const CORE_ATTRIBUTES: &[&str] = &[
    DN_ATTRIBUTE,
    UID_ATTRIBUTE,
    CN_ATTRIBUTE,
    MAIL_ATTRIBUTE,
    "objectclass",
    "object_class",
    PASSWORD_ATTRIBUTE,
    FIRSTNAME_ATTRIBUTE,
    LASTNAME_ATTRIBUTE,
];

/// Check whether an attribute name is reserved.
#[must_use]
pub fn is_core_attribute(name: &str) -> bool {
    CORE_ATTRIBUTES.contains(&name)
}

// =============================================================================
// OBJECT CLASSES
// =============================================================================

/// Object class marking a group entry (compared lower-cased).
pub const GROUP_OBJECT_CLASS: &str = "posixgroup";

/// Object classes marking a person entry (compared lower-cased).
pub const PERSON_OBJECT_CLASSES: &[&str] = &[
    "inetorgperson",
    "posixaccount",
    "simplesecurityobject",
    "shadowaccount",
    "person",
];

/// Object class marking a service account (compared lower-cased).
pub const SERVICE_OBJECT_CLASS: &str = "simplesecurityobject";

// =============================================================================
// CAPABILITY GROUPS
// =============================================================================

/// Group tagging every user imported with an explicit uid.
pub const POSIX_USER_GROUP: &str = "posixUser";

/// Group tagging every service account.
pub const SERVICE_GROUP: &str = "service";

// =============================================================================
// RECONCILIATION LIMITS
// =============================================================================

/// Upper bound on creation attempts for one record.
pub const MAX_CREATE_ATTEMPTS: usize = 100;

/// Imported passwords shorter than this are replaced by the fallback.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Largest avatar (after whitespace removal) submitted to the store.
pub const MAX_AVATAR_BYTES: usize = 50_000;

/// Family name given to ordinary records without a surname.
pub const DEFAULT_FAMILY_NAME: &str = "Imported";

/// Maximum physical line length accepted by the parser (50 MiB).
pub const MAX_LINE_BYTES: usize = 50 * 1024 * 1024;

// =============================================================================
// CONFIGURABLE DEFAULTS
// =============================================================================

pub const DEFAULT_BASE_URL: &str = "http://localhost:17170";
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_FALLBACK_PASSWORD: &str = "ChangeMe!2025";
pub const DEFAULT_SERVICE_DOMAIN: &str = "services.local";
pub const DEFAULT_IMPORT_DOMAIN: &str = "imported.local";
pub const DEFAULT_SET_PASSWORD_BIN: &str = "/usr/local/bin/lldap_set_password";
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 50;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_lookup_is_case_insensitive() {
        let alias = lookup_alias("givenName").expect("alias");
        assert_eq!(alias.target, FIRSTNAME_ATTRIBUTE);
        assert!(lookup_alias("GIVEN_NAME").is_some());
        assert!(lookup_alias("given name").is_none());
    }

    #[test]
    fn photo_aliases_are_binary() {
        assert!(lookup_alias("jpegPhoto").expect("alias").binary);
        assert!(lookup_alias("photo").expect("alias").binary);
        assert!(!lookup_alias("mail").expect("alias").binary);
    }

    #[test]
    fn core_attributes_cover_both_class_spellings() {
        for name in OBJECT_CLASS_ATTRIBUTES {
            assert!(is_core_attribute(name));
        }
        assert!(!is_core_attribute("description"));
    }
}
