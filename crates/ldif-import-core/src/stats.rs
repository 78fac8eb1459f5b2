//! # Field Statistics & Report
//!
//! Run-wide counters of attribute occurrences and byte weight, and the
//! end-of-run summary table built from them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;

// =============================================================================
// FIELD STATS
// =============================================================================

/// Occurrence counters for one canonical attribute name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldWeight {
    /// Number of values seen.
    pub entries: u64,
    /// Sum of value lengths in bytes.
    pub bytes: u64,
}

/// One line of the summary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRow {
    pub name: String,
    pub entries: u64,
    pub bytes: u64,
}

/// Counters keyed by canonical attribute name, across the whole input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldStats {
    fields: BTreeMap<String, FieldWeight>,
}

impl FieldStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one value under `name`.
    pub fn record(&mut self, name: &str, value: &str) {
        let weight = self.fields.entry(name.to_string()).or_default();
        weight.entries = weight.entries.saturating_add(1);
        weight.bytes = weight.bytes.saturating_add(value.len() as u64);
    }

    /// Counters for one attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<FieldWeight> {
        self.fields.get(name).copied()
    }

    /// Rows sorted by descending byte weight, then by name.
    #[must_use]
    pub fn rows(&self) -> Vec<FieldRow> {
        let mut rows: Vec<FieldRow> = self
            .fields
            .iter()
            .map(|(name, weight)| FieldRow {
                name: name.clone(),
                entries: weight.entries,
                bytes: weight.bytes,
            })
            .collect();
        rows.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.name.cmp(&b.name)));
        rows
    }
}

// =============================================================================
// SUMMARY
// =============================================================================

/// Run totals printed under the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub records_parsed: usize,
    pub users_created: usize,
    pub groups_created: usize,
    pub links_created: usize,
}

/// Write the attribute table followed by the run totals.
pub fn write_report<W: Write>(
    out: &mut W,
    stats: &FieldStats,
    summary: &ImportSummary,
) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{:<30} {:<10} {:<15}", "ATTRIBUTE", "ENTRIES", "WEIGHT (BYTES)")?;
    writeln!(out, "{}", "-".repeat(65))?;
    for row in stats.rows() {
        writeln!(out, "{:<30} {:<10} {:<15}", row.name, row.entries, row.bytes)?;
    }
    writeln!(out)?;
    writeln!(out, "Summary: Parsed {} records.", summary.records_parsed)?;
    writeln!(
        out,
        "Created: {} users, {} groups, {} links.",
        summary.users_created, summary.groups_created, summary.links_created
    )?;
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_accumulates_entries_and_bytes() {
        let mut stats = FieldStats::new();
        stats.record("cn", "Bob");
        stats.record("cn", "Alice");
        stats.record("mail", "");

        assert_eq!(stats.get("cn"), Some(FieldWeight { entries: 2, bytes: 8 }));
        assert_eq!(stats.get("mail"), Some(FieldWeight { entries: 1, bytes: 0 }));
    }

    #[test]
    fn rows_sort_by_descending_weight() {
        let mut stats = FieldStats::new();
        stats.record("uid", "bob");
        stats.record("avatar", "aGVsbG8gd29ybGQ=");
        stats.record("cn", "abc");

        let names: Vec<String> = stats.rows().into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["avatar", "cn", "uid"]);
    }

    #[test]
    fn report_ends_with_totals() {
        let mut stats = FieldStats::new();
        stats.record("uid", "bob");
        let summary = ImportSummary {
            records_parsed: 2,
            users_created: 1,
            groups_created: 1,
            links_created: 1,
        };

        let mut out = Vec::new();
        write_report(&mut out, &stats, &summary).expect("write");
        let text = String::from_utf8(out).expect("utf8");

        assert!(text.contains("ATTRIBUTE"));
        assert!(text.contains("Summary: Parsed 2 records."));
        assert!(text.ends_with("Created: 1 users, 1 groups, 1 links.\n"));
    }
}
