//! # ldif-import-core
//!
//! The deterministic parsing and derivation engine for ldif-import - THE LOGIC.
//!
//! This crate turns an LDIF export into classified directory records, infers
//! the custom-attribute schema the target store needs, and derives every
//! value the reconciliation engine submits (identifiers, names, addresses,
//! rotation candidates).
//!
//! ## Architectural Constraints
//!
//! - NO async, NO network dependencies (pure Rust)
//! - Deterministic: `BTreeMap` everywhere, so two runs over the same input
//!   walk records and attributes in the same order
//! - Silent: nothing here logs; the app layer decides what to report

// =============================================================================
// MODULES
// =============================================================================

pub mod attributes;
pub mod identity;
pub mod parser;
pub mod primitives;
pub mod profile;
pub mod schema;
pub mod stats;
pub mod types;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use attributes::AttributeNameCache;
pub use identity::{normalize_attribute_name, rotate_email, sanitize_id};
pub use parser::{AttributeLine, LdifParser, ParsedDirectory, parse_attribute_line, parse_ldif};
pub use profile::{PasswordSource, ProfileDefaults, UserProfile};
pub use schema::{DnIndex, SchemaCatalog, SchemaInferencer, classify};
pub use stats::{FieldRow, FieldStats, FieldWeight, ImportSummary, write_report};
pub use types::{AttributeDefinition, ImportError, Record, SchemaTarget};
