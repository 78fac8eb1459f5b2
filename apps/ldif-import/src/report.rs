//! # Report Output
//!
//! The end-of-run report goes to the `--summary` file when it can be created,
//! otherwise to stdout. It is emitted even when records failed.

use crate::error::AppError;
use ldif_import_core::{FieldRow, FieldStats, ImportSummary, write_report};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Machine-readable form of the report (`--json`).
#[derive(Debug, Serialize)]
pub struct ReportDocument<'a> {
    pub summary: &'a ImportSummary,
    pub fields: Vec<FieldRow>,
}

/// Render the report into `out`.
pub fn render<W: Write>(
    out: &mut W,
    stats: &FieldStats,
    summary: &ImportSummary,
    json: bool,
) -> Result<(), AppError> {
    if json {
        let document = ReportDocument {
            summary,
            fields: stats.rows(),
        };
        serde_json::to_writer_pretty(&mut *out, &document)
            .map_err(|e| AppError::Io(std::io::Error::other(e)))?;
        writeln!(out)?;
    } else {
        write_report(out, stats, summary)?;
    }
    out.flush()?;
    Ok(())
}

/// Write the report to `target`, falling back to stdout.
pub fn emit_report(
    stats: &FieldStats,
    summary: &ImportSummary,
    target: Option<&Path>,
    json: bool,
) -> Result<(), AppError> {
    if let Some(path) = target {
        match File::create(path) {
            Ok(file) => {
                render(&mut BufWriter::new(file), stats, summary, json)?;
                tracing::info!(path = %path.display(), "Report written");
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "Cannot create report file, using stdout: {}", e);
            }
        }
    }

    let stdout = std::io::stdout();
    render(&mut stdout.lock(), stats, summary, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (FieldStats, ImportSummary) {
        let mut stats = FieldStats::new();
        stats.record("cn", "Bob Jones");
        stats.record("uid", "bob");
        let summary = ImportSummary {
            records_parsed: 2,
            users_created: 1,
            groups_created: 1,
            links_created: 1,
        };
        (stats, summary)
    }

    #[test]
    fn text_report_ends_with_totals() {
        let (stats, summary) = sample();
        let mut out = Vec::new();
        render(&mut out, &stats, &summary, false).expect("render");

        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("Summary: Parsed 2 records."));
        assert!(text.trim_end().ends_with("Created: 1 users, 1 groups, 1 links."));
    }

    #[test]
    fn json_report_carries_rows_by_weight() {
        let (stats, summary) = sample();
        let mut out = Vec::new();
        render(&mut out, &stats, &summary, true).expect("render");

        let value: serde_json::Value = serde_json::from_slice(&out).expect("json");
        assert_eq!(value["summary"]["links_created"], 1);
        assert_eq!(value["fields"][0]["name"], "cn");
        assert_eq!(value["fields"][1]["name"], "uid");
    }
}
