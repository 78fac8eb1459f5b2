//! # Core Type Definitions
//!
//! This module contains the core types shared by the parser and the
//! reconciliation layers:
//! - Directory records (`Record`)
//! - Schema catalog entries (`AttributeDefinition`)
//! - Error types (`ImportError`)
//!
//! ## Determinism Guarantees
//!
//! Attribute maps use `BTreeMap` so that every walk over a record visits
//! attributes in the same order on every run.

use crate::identity::sanitize_id;
use crate::primitives::{OBJECT_CLASS_ATTRIBUTES, SERVICE_OBJECT_CLASS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// =============================================================================
// RECORD
// =============================================================================

/// One directory entry reconstructed from the export.
///
/// The `dn`, `uid`, `cn` and `mail` fields mirror the last value seen for the
/// corresponding canonical attribute. All values, including those, are also
/// kept in `attributes` in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Distinguished name.
    pub dn: String,
    /// Explicit short identifier (empty when absent).
    pub uid: String,
    /// Common name (empty when absent).
    pub cn: String,
    /// Primary mail address (empty when absent).
    pub mail: String,
    /// Classified as a person entry.
    pub is_person: bool,
    /// Classified as a group entry.
    pub is_group: bool,
    /// Canonical attribute name -> ordered values.
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under a canonical attribute name.
    pub fn push_value(&mut self, name: &str, value: String) {
        self.attributes
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    /// All values for an attribute, empty when absent.
    #[must_use]
    pub fn values(&self, name: &str) -> &[String] {
        self.attributes.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First value for an attribute.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name).first().map(String::as_str)
    }

    /// Object class values under either spelling.
    pub fn object_classes(&self) -> impl Iterator<Item = &str> {
        OBJECT_CLASS_ATTRIBUTES
            .iter()
            .flat_map(|name| self.values(name))
            .map(String::as_str)
    }

    /// Whether any object class equals `class` (case-insensitive).
    #[must_use]
    pub fn has_object_class(&self, class: &str) -> bool {
        self.object_classes().any(|c| c.eq_ignore_ascii_case(class))
    }

    /// Service accounts carry the `simpleSecurityObject` class.
    #[must_use]
    pub fn is_service_account(&self) -> bool {
        self.has_object_class(SERVICE_OBJECT_CLASS)
    }

    /// The identifier under which this record is stored in the target.
    ///
    /// The explicit uid wins; otherwise the sanitized common name is used.
    /// The result is lower-cased and may be empty.
    #[must_use]
    pub fn effective_id(&self) -> String {
        if self.uid.is_empty() {
            sanitize_id(&self.cn)
        } else {
            self.uid.to_lowercase()
        }
    }
}

// =============================================================================
// SCHEMA
// =============================================================================

/// A custom attribute observed on at least one record of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    /// Canonical attribute name.
    pub name: String,
    /// Seen with more than one value on a single record.
    pub is_list: bool,
}

/// Which of the two store schemas an attribute belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SchemaTarget {
    User,
    Group,
}

impl std::fmt::Display for SchemaTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Group => write!(f, "group"),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by the core pipeline.
///
/// Record-level anomalies (missing colon, undecodable base64) are not errors;
/// only conditions that make the whole input unusable surface here.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Reading the input stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A physical line exceeded the parser's buffer limit.
    #[error("Line {line} exceeds the maximum of {max} bytes")]
    LineTooLong { line: usize, max: usize },
}

// =============================================================================
// TESTS
// =============================================================================
