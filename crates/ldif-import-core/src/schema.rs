//! # Schema Inference
//!
//! Record finalization: classification, schema observation and
//! DN -> identifier registration.
//!
//! Runs once per record, at the blank line that terminates it. The
//! inferencer accumulates two attribute catalogs (one per record class) and
//! the DN index consumed later by the linking pass.

use crate::primitives::{GROUP_OBJECT_CLASS, PERSON_OBJECT_CLASSES, is_core_attribute};
use crate::types::{AttributeDefinition, Record, SchemaTarget};
use std::collections::BTreeMap;

// =============================================================================
// SCHEMA CATALOG
// =============================================================================

/// Custom attributes observed for one record class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaCatalog {
    entries: BTreeMap<String, AttributeDefinition>,
}

impl SchemaCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe `name` carrying `value_count` values on one record.
    ///
    /// An attribute once seen multi-valued stays multi-valued.
    pub fn observe(&mut self, name: &str, value_count: usize) {
        let entry = self
            .entries
            .entry(name.to_string())
            .or_insert_with(|| AttributeDefinition {
                name: name.to_string(),
                is_list: false,
            });
        if value_count > 1 {
            entry.is_list = true;
        }
    }

    /// Definition for `name`, if observed.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeDefinition> {
        self.entries.get(name)
    }

    /// Definitions in name order.
    pub fn iter(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.entries.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// DN INDEX
// =============================================================================

/// Lower-cased DN -> lower-cased effective identifier, persons only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnIndex {
    ids: BTreeMap<String, String>,
}

impl DnIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a DN. Later registrations of the same DN win.
    pub fn register(&mut self, dn: &str, id: &str) {
        self.ids.insert(dn.to_lowercase(), id.to_lowercase());
    }

    /// Resolve a member DN reference (case-insensitive).
    #[must_use]
    pub fn resolve(&self, dn: &str) -> Option<&str> {
        self.ids.get(&dn.to_lowercase()).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Set the person/group flags of a record from its object classes.
///
/// A `posixGroup` class makes a group. A person class makes a person, and so
/// does a non-empty uid on a record that is not a group. Both flags may end
/// up set when a record carries both kinds of class.
pub fn classify(record: &mut Record) {
    let mut is_group = false;
    let mut is_person = false;

    for class in record.object_classes() {
        let lower = class.to_lowercase();
        if lower == GROUP_OBJECT_CLASS {
            is_group = true;
        }
        if PERSON_OBJECT_CLASSES.contains(&lower.as_str()) {
            is_person = true;
        }
    }

    if !record.uid.is_empty() && !is_group {
        is_person = true;
    }

    record.is_group = is_group;
    record.is_person = is_person;
}

// =============================================================================
// INFERENCER
// =============================================================================

/// Accumulates schema catalogs and the DN index across finalized records.
#[derive(Debug, Clone, Default)]
pub struct SchemaInferencer {
    user_schema: SchemaCatalog,
    group_schema: SchemaCatalog,
    dn_index: DnIndex,
}

impl SchemaInferencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finalize a record: classify it, observe its custom attributes and
    /// register its identifier when it is a person.
    pub fn finalize(&mut self, record: &mut Record) {
        classify(record);

        let catalog = if record.is_group {
            &mut self.group_schema
        } else {
            &mut self.user_schema
        };
        for (name, values) in &record.attributes {
            if is_core_attribute(name) {
                continue;
            }
            catalog.observe(name, values.len());
        }

        if record.is_person {
            let id = record.effective_id();
            if !id.is_empty() {
                self.dn_index.register(&record.dn, &id);
            }
        }
    }

    /// Catalog for one store schema.
    #[must_use]
    pub fn catalog(&self, target: SchemaTarget) -> &SchemaCatalog {
        match target {
            SchemaTarget::User => &self.user_schema,
            SchemaTarget::Group => &self.group_schema,
        }
    }

    /// Consume the inferencer into its catalogs and index.
    #[must_use]
    pub fn into_parts(self) -> (SchemaCatalog, SchemaCatalog, DnIndex) {
        (self.user_schema, self.group_schema, self.dn_index)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(attrs: &[(&str, &str)]) -> Record {
        let mut record = Record::new();
        for (name, value) in attrs {
            record.push_value(name, (*value).to_string());
            match *name {
                "dn" => record.dn = (*value).to_string(),
                "uid" => record.uid = (*value).to_string(),
                "cn" => record.cn = (*value).to_string(),
                _ => {}
            }
        }
        record
    }

    #[test]
    fn posix_group_wins_over_uid() {
        let mut record = record_with(&[("objectclass", "posixGroup"), ("uid", "staff")]);
        classify(&mut record);

        assert!(record.is_group);
        assert!(!record.is_person);
    }

    #[test]
    fn uid_alone_makes_a_person() {
        let mut record = record_with(&[("uid", "bob")]);
        classify(&mut record);

        assert!(record.is_person);
        assert!(!record.is_group);
    }

    #[test]
    fn person_and_group_classes_set_both_flags() {
        let mut record =
            record_with(&[("objectclass", "PosixGroup"), ("objectclass", "inetOrgPerson")]);
        classify(&mut record);

        assert!(record.is_group);
        assert!(record.is_person);
    }

    #[test]
    fn unclassified_record_is_neither() {
        let mut record = record_with(&[("objectclass", "organizationalUnit"), ("ou", "people")]);
        classify(&mut record);

        assert!(!record.is_group);
        assert!(!record.is_person);
    }

    #[test]
    fn multi_valued_flag_is_sticky() {
        let mut catalog = SchemaCatalog::new();
        catalog.observe("phone", 2);
        catalog.observe("phone", 1);

        assert!(catalog.get("phone").expect("phone").is_list);
    }

    #[test]
    fn finalize_routes_attributes_by_class() {
        let mut inferencer = SchemaInferencer::new();

        let mut person = record_with(&[("uid", "bob"), ("title", "Engineer")]);
        inferencer.finalize(&mut person);

        let mut group = record_with(&[
            ("objectclass", "posixGroup"),
            ("cn", "staff"),
            ("memberuid", "bob"),
            ("memberuid", "eve"),
        ]);
        inferencer.finalize(&mut group);

        let users = inferencer.catalog(SchemaTarget::User);
        let groups = inferencer.catalog(SchemaTarget::Group);
        assert!(users.get("title").is_some());
        assert!(users.get("uid").is_none());
        assert!(groups.get("memberuid").expect("memberuid").is_list);
        assert!(groups.get("objectclass").is_none());
    }

    #[test]
    fn finalize_registers_person_dn_with_effective_id() {
        let mut inferencer = SchemaInferencer::new();
        let mut person = record_with(&[
            ("dn", "cn=Jane Doe,ou=People,dc=example,dc=com"),
            ("cn", "Jane Doe"),
            ("objectclass", "inetOrgPerson"),
        ]);
        inferencer.finalize(&mut person);

        let (_, _, index) = inferencer.into_parts();
        assert_eq!(
            index.resolve("CN=Jane Doe,ou=People,dc=example,dc=com"),
            Some("jane.doe")
        );
    }

    #[test]
    fn finalize_skips_persons_without_usable_id() {
        let mut inferencer = SchemaInferencer::new();
        let mut person = record_with(&[("dn", "cn=???,dc=x"), ("cn", "???"), ("objectclass", "person")]);
        inferencer.finalize(&mut person);

        let (_, _, index) = inferencer.into_parts();
        assert!(index.is_empty());
    }
}
