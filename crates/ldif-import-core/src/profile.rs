//! # User Profile Derivation
//!
//! Turns a person record into the fields submitted on creation: identifier,
//! display/given/family names, contact address and password. This is the
//! pure part of reconciliation; everything here is decided before the first
//! request is sent.

use crate::identity::sanitize_id;
use crate::primitives::{
    DEFAULT_FALLBACK_PASSWORD, DEFAULT_FAMILY_NAME, DEFAULT_IMPORT_DOMAIN, DEFAULT_SERVICE_DOMAIN,
    FIRSTNAME_ATTRIBUTE, LASTNAME_ATTRIBUTE, MIN_PASSWORD_LENGTH, PASSWORD_ATTRIBUTE,
};
use crate::types::Record;
use serde::{Deserialize, Serialize};

/// Operator-tunable inputs of profile derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDefaults {
    /// Domain of synthesized service-account addresses.
    pub service_domain: String,
    /// Domain of synthesized ordinary addresses.
    pub import_domain: String,
    /// Password used when the imported one is unusable.
    pub fallback_password: String,
}

impl Default for ProfileDefaults {
    fn default() -> Self {
        Self {
            service_domain: DEFAULT_SERVICE_DOMAIN.to_string(),
            import_domain: DEFAULT_IMPORT_DOMAIN.to_string(),
            fallback_password: DEFAULT_FALLBACK_PASSWORD.to_string(),
        }
    }
}

/// Why the imported password was not used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PasswordSource {
    /// The record's own password is long enough.
    Imported,
    /// The record carries no password.
    FallbackMissing,
    /// The record's password is shorter than the minimum (length attached).
    FallbackTooShort(usize),
}

/// Creation fields derived from one person record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Lower-cased identifier requested from the store.
    pub id: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    /// Address submitted on the first attempt and base of rotation.
    pub email: String,
    pub password: String,
    pub password_source: PasswordSource,
    /// Record carried an explicit uid.
    pub has_uid: bool,
    /// Record carries the service-account class.
    pub is_service: bool,
}

impl UserProfile {
    /// Derive the creation profile of a record.
    ///
    /// Returns `None` when the record yields no usable identifier.
    #[must_use]
    pub fn derive(record: &Record, defaults: &ProfileDefaults) -> Option<Self> {
        let id = record.effective_id();
        if id.is_empty() {
            return None;
        }

        let is_service = record.is_service_account();

        let display_name = if record.cn.is_empty() {
            id.clone()
        } else {
            record.cn.clone()
        };

        let first_name = record
            .first(FIRSTNAME_ATTRIBUTE)
            .map(str::to_string)
            .unwrap_or_else(|| display_name.clone());

        let last_name = match record.first(LASTNAME_ATTRIBUTE) {
            Some(explicit) => explicit.to_string(),
            None if is_service => display_name.clone(),
            None => DEFAULT_FAMILY_NAME.to_string(),
        };

        let email = if record.mail.contains('@') {
            record.mail.clone()
        } else if is_service {
            format!(
                "service-{}@{}",
                sanitize_id(&display_name),
                defaults.service_domain
            )
        } else {
            format!("{}@{}", id, defaults.import_domain)
        };

        let imported = record.first(PASSWORD_ATTRIBUTE).unwrap_or("");
        let length = imported.chars().count();
        let (password, password_source) = if length >= MIN_PASSWORD_LENGTH {
            (imported.to_string(), PasswordSource::Imported)
        } else if length == 0 {
            (defaults.fallback_password.clone(), PasswordSource::FallbackMissing)
        } else {
            (
                defaults.fallback_password.clone(),
                PasswordSource::FallbackTooShort(length),
            )
        };

        Some(Self {
            id,
            display_name,
            first_name,
            last_name,
            email,
            password,
            password_source,
            has_uid: !record.uid.is_empty(),
            is_service,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn person(uid: &str, cn: &str, mail: &str) -> Record {
        let mut record = Record {
            uid: uid.to_string(),
            cn: cn.to_string(),
            mail: mail.to_string(),
            is_person: true,
            ..Record::default()
        };
        if !uid.is_empty() {
            record.push_value("uid", uid.to_string());
        }
        record
    }

    #[test]
    fn ordinary_person_defaults() {
        let record = person("Bob", "Bob Jones", "bob@x.com");
        let profile = UserProfile::derive(&record, &ProfileDefaults::default()).expect("profile");

        assert_eq!(profile.id, "bob");
        assert_eq!(profile.display_name, "Bob Jones");
        assert_eq!(profile.first_name, "Bob Jones");
        assert_eq!(profile.last_name, "Imported");
        assert_eq!(profile.email, "bob@x.com");
        assert_eq!(profile.password, DEFAULT_FALLBACK_PASSWORD);
        assert_eq!(profile.password_source, PasswordSource::FallbackMissing);
        assert!(profile.has_uid);
        assert!(!profile.is_service);
    }

    #[test]
    fn explicit_names_override_defaults() {
        let mut record = person("ann", "Ann Lee", "");
        record.push_value(FIRSTNAME_ATTRIBUTE, "Ann".to_string());
        record.push_value(LASTNAME_ATTRIBUTE, "Lee".to_string());

        let profile = UserProfile::derive(&record, &ProfileDefaults::default()).expect("profile");
        assert_eq!(profile.first_name, "Ann");
        assert_eq!(profile.last_name, "Lee");
        assert_eq!(profile.email, "ann@imported.local");
    }

    #[test]
    fn service_account_gets_synthesized_address() {
        let mut record = person("", "Backup Agent", "not-an-address");
        record.push_value("objectclass", "simpleSecurityObject".to_string());

        let profile = UserProfile::derive(&record, &ProfileDefaults::default()).expect("profile");
        assert_eq!(profile.id, "backup.agent");
        assert_eq!(profile.last_name, "Backup Agent");
        assert_eq!(profile.email, "service-backup.agent@services.local");
        assert!(profile.is_service);
        assert!(!profile.has_uid);
    }

    #[test]
    fn missing_cn_uses_identifier_as_display_name() {
        let record = person("carol", "", "");
        let profile = UserProfile::derive(&record, &ProfileDefaults::default()).expect("profile");
        assert_eq!(profile.display_name, "carol");
        assert_eq!(profile.first_name, "carol");
    }

    #[test]
    fn password_length_threshold() {
        let mut record = person("dave", "Dave", "");
        record.push_value(PASSWORD_ATTRIBUTE, "short".to_string());
        let profile = UserProfile::derive(&record, &ProfileDefaults::default()).expect("profile");
        assert_eq!(profile.password_source, PasswordSource::FallbackTooShort(5));

        let mut record = person("dave", "Dave", "");
        record.push_value(PASSWORD_ATTRIBUTE, "longenough".to_string());
        let profile = UserProfile::derive(&record, &ProfileDefaults::default()).expect("profile");
        assert_eq!(profile.password, "longenough");
        assert_eq!(profile.password_source, PasswordSource::Imported);
    }

    #[test]
    fn unusable_identifier_yields_none() {
        let record = person("", "!!!", "");
        assert!(UserProfile::derive(&record, &ProfileDefaults::default()).is_none());
    }
}
