//! # LDIF Parser
//!
//! Streaming reconstruction of directory records from an LDIF export.
//!
//! - Lines starting with a single space continue the previous logical line
//!   (the space is dropped, nothing is inserted).
//! - A blank line terminates the current record; end of input does too.
//! - `key: value` is a plain value, `key:: value` a base64 value.
//! - Lines without a colon and `#` comments are ignored.
//!
//! Every terminated record is finalized by the [`SchemaInferencer`] before it
//! is appended to the output.

use crate::attributes::AttributeNameCache;
use crate::primitives::{
    CN_ATTRIBUTE, DN_ATTRIBUTE, MAIL_ATTRIBUTE, MAX_LINE_BYTES, UID_ATTRIBUTE, lookup_alias,
};
use crate::schema::{DnIndex, SchemaCatalog, SchemaInferencer};
use crate::stats::FieldStats;
use crate::types::{ImportError, Record};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::io::{BufRead, Read};

// =============================================================================
// OUTPUT
// =============================================================================

/// Everything Pass 1 produces from one input stream.
#[derive(Debug, Clone, Default)]
pub struct ParsedDirectory {
    /// Records in input order.
    pub records: Vec<Record>,
    /// Custom attributes of person-like (and unclassified) records.
    pub user_schema: SchemaCatalog,
    /// Custom attributes of group records.
    pub group_schema: SchemaCatalog,
    /// Member DN -> identifier, persons only.
    pub dn_index: DnIndex,
    /// Run-wide attribute counters.
    pub stats: FieldStats,
}

// =============================================================================
// ATTRIBUTE LINES
// =============================================================================

/// A decoded `key: value` pair with its canonical name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeLine {
    pub name: String,
    pub value: String,
}

/// Parse one logical line into a canonical attribute and its value.
///
/// Returns `None` for comments and for lines without a colon.
#[must_use]
pub fn parse_attribute_line(line: &str, cache: &AttributeNameCache) -> Option<AttributeLine> {
    if line.starts_with('#') {
        return None;
    }
    let (raw_key, rest) = line.split_once(':')?;

    let (is_base64, rest) = match rest.strip_prefix(':') {
        Some(encoded) => (true, encoded),
        None => (false, rest),
    };
    let value = rest.trim();

    let (name, binary) = match lookup_alias(raw_key) {
        Some(alias) => (alias.target.to_string(), alias.binary),
        None => (cache.resolve(raw_key), false),
    };

    let value = if is_base64 && !binary {
        decode_base64_text(value)
    } else {
        value.to_string()
    };

    Some(AttributeLine { name, value })
}

/// Decode base64 into text, replacing invalid UTF-8.
///
/// Undecodable input is kept verbatim.
fn decode_base64_text(encoded: &str) -> String {
    match STANDARD.decode(encoded) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => encoded.to_string(),
    }
}

// =============================================================================
// PARSER
// =============================================================================

/// Line-fed LDIF parser.
///
/// The parser borrows the attribute cache read-only: names resolved during
/// Pass 1 reflect the store's schema as seeded in Pass 0.
pub struct LdifParser<'a> {
    cache: &'a AttributeNameCache,
    inferencer: SchemaInferencer,
    stats: FieldStats,
    records: Vec<Record>,
    current: Option<Record>,
    logical: String,
}

impl<'a> LdifParser<'a> {
    /// Create a parser resolving names through `cache`.
    #[must_use]
    pub fn new(cache: &'a AttributeNameCache) -> Self {
        Self {
            cache,
            inferencer: SchemaInferencer::new(),
            stats: FieldStats::new(),
            records: Vec::new(),
            current: None,
            logical: String::new(),
        }
    }

    /// Feed one physical line (without its line terminator).
    pub fn feed_line(&mut self, line: &str) {
        if let Some(continuation) = line.strip_prefix(' ') {
            self.logical.push_str(continuation);
            return;
        }

        self.flush_logical();

        if line.trim().is_empty() {
            self.finish_record();
            return;
        }

        self.logical.push_str(line);
    }

    /// Terminate any open record and return the parse result.
    #[must_use]
    pub fn finish(mut self) -> ParsedDirectory {
        self.flush_logical();
        self.finish_record();

        let (user_schema, group_schema, dn_index) = self.inferencer.into_parts();
        ParsedDirectory {
            records: self.records,
            user_schema,
            group_schema,
            dn_index,
            stats: self.stats,
        }
    }

    /// Drive the parser over a whole stream.
    ///
    /// Lines may be arbitrarily large up to [`MAX_LINE_BYTES`]; a longer line
    /// aborts the parse. `\r\n` terminators are accepted.
    pub fn parse_reader<R: BufRead>(mut self, mut reader: R) -> Result<ParsedDirectory, ImportError> {
        let mut buf = Vec::new();
        let mut line_no = 0usize;

        loop {
            buf.clear();
            let read = (&mut reader)
                .take(MAX_LINE_BYTES as u64 + 1)
                .read_until(b'\n', &mut buf)?;
            if read == 0 {
                break;
            }
            line_no += 1;

            if buf.last() == Some(&b'\n') {
                buf.pop();
                if buf.last() == Some(&b'\r') {
                    buf.pop();
                }
            }
            if buf.len() > MAX_LINE_BYTES {
                return Err(ImportError::LineTooLong {
                    line: line_no,
                    max: MAX_LINE_BYTES,
                });
            }

            self.feed_line(&String::from_utf8_lossy(&buf));
        }

        Ok(self.finish())
    }

    /// Parse the buffered logical line into the current record.
    fn flush_logical(&mut self) {
        if self.logical.is_empty() {
            return;
        }
        let line = std::mem::take(&mut self.logical);
        let Some(AttributeLine { name, value }) = parse_attribute_line(&line, self.cache) else {
            return;
        };
        let record = self.current.get_or_insert_with(Record::new);

        match name.as_str() {
            DN_ATTRIBUTE => record.dn.clone_from(&value),
            UID_ATTRIBUTE => record.uid.clone_from(&value),
            CN_ATTRIBUTE => record.cn.clone_from(&value),
            MAIL_ATTRIBUTE => record.mail.clone_from(&value),
            _ => {}
        }

        self.stats.record(&name, &value);
        record.push_value(&name, value);
    }

    /// Finalize and store the open record, if any.
    fn finish_record(&mut self) {
        if let Some(mut record) = self.current.take() {
            self.inferencer.finalize(&mut record);
            self.records.push(record);
        }
    }
}

/// Parse a complete LDIF stream.
pub fn parse_ldif<R: BufRead>(
    reader: R,
    cache: &AttributeNameCache,
) -> Result<ParsedDirectory, ImportError> {
    LdifParser::new(cache).parse_reader(reader)
}

// =============================================================================
// TESTS
// =============================================================================
