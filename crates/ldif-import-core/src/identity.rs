//! # Identity Resolver
//!
//! Pure string functions that turn free-text directory values into
//! identifiers accepted by the target store.

/// Sanitize free text into the identifier alphabet.
///
/// Lower-cases the input, turns every space into `.`, then drops every
/// character outside `[a-z0-9._-]`. An empty result means the input carries
/// no usable identifier.
#[must_use]
pub fn sanitize_id(input: &str) -> String {
    input
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' { '.' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
        .collect()
}

/// Normalize an attribute name for cache lookups.
///
/// Lower-cases and strips everything but ASCII letters and digits, so that
/// `givenName`, `given_name` and `Given-Name` all collapse to `givenname`.
#[must_use]
pub fn normalize_attribute_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Produce the alternate contact address for a creation attempt.
///
/// Attempt 0 appends the lower-cased family name to the local part; later
/// attempts append a zero-padded counter starting at `000`. A base address
/// that does not split into exactly one local part and one domain yields a
/// placeholder under `import_domain`.
#[must_use]
pub fn rotate_email(base: &str, family_name: &str, attempt: usize, import_domain: &str) -> String {
    let parts: Vec<&str> = base.split('@').collect();
    let [local, domain] = parts.as_slice() else {
        return format!("bad-email-{attempt}@{import_domain}");
    };

    if attempt == 0 {
        format!("{local}.{}@{domain}", family_name.to_lowercase())
    } else {
        format!("{local}-{:03}@{domain}", attempt - 1)
    }
}

// =============================================================================
// TESTS
// =============================================================================
