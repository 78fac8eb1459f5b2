//! # Attribute Name Cache
//!
//! Tracks the attribute names already registered in the target store.
//!
//! Keys are normalized (see [`normalize_attribute_name`]) so that spelling
//! variants from the source collapse onto the canonical target name. The
//! cache is seeded once from the store and grows on every successful
//! registration.

use crate::identity::normalize_attribute_name;
use std::collections::BTreeMap;

/// Normalized name -> canonical registered name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeNameCache {
    names: BTreeMap<String, String>,
}

impl AttributeNameCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a cache from names reported by the store.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cache = Self::new();
        for name in names {
            cache.insert(name);
        }
        cache
    }

    /// Record a canonical name as registered.
    pub fn insert(&mut self, canonical: impl Into<String>) {
        let canonical = canonical.into();
        let key = normalize_attribute_name(&canonical);
        if !key.is_empty() {
            self.names.insert(key, canonical);
        }
    }

    /// Canonical name registered for any spelling of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.names
            .get(&normalize_attribute_name(name))
            .map(String::as_str)
    }

    /// Whether any spelling of `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Resolve a source key to the attribute name used on records.
    ///
    /// Falls back to the normalized key when the store has no match.
    #[must_use]
    pub fn resolve(&self, raw_key: &str) -> String {
        let normalized = normalize_attribute_name(raw_key);
        match self.names.get(&normalized) {
            Some(canonical) => canonical.clone(),
            None => normalized,
        }
    }

    /// Number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_collapses_variants_onto_canonical_name() {
        let cache = AttributeNameCache::from_names(["employee_number", "mail"]);

        assert_eq!(cache.resolve("employeeNumber"), "employee_number");
        assert_eq!(cache.resolve("Employee-Number"), "employee_number");
    }

    #[test]
    fn resolve_falls_back_to_normalized_key() {
        let cache = AttributeNameCache::new();
        assert_eq!(cache.resolve("telephoneNumber"), "telephonenumber");
    }

    #[test]
    fn contains_is_case_insensitive() {
        let mut cache = AttributeNameCache::new();
        assert!(!cache.contains("Department"));

        cache.insert("department");

        assert!(cache.contains("Department"));
        assert!(cache.contains("DEPARTMENT"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn unnormalizable_names_are_ignored() {
        let mut cache = AttributeNameCache::new();
        cache.insert("---");
        assert!(cache.is_empty());
    }
}
