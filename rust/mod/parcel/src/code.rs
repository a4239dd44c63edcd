//! Tracking codes: `<category>-<sequence>`, sequence zero-padded to three digits.
//!
//! The next code for a category is one past the highest sequence found
//! among existing codes. Nothing reserves the number, so two writers
//! reading at the same time get the same code.

use std::sync::LazyLock;

use regex::Regex;

/// Minimum width of the numeric part.
pub const SEQUENCE_WIDTH: usize = 3;

static SEQUENCE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-(\d+)$").expect("valid sequence regex"));

/// Numeric suffix of a code, if it has one.
pub fn sequence_of(code: &str) -> Option<u64> {
    SEQUENCE_SUFFIX
        .captures(code)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn format_code(category: &str, sequence: u64) -> String {
    format!("{}-{:0width$}", category, sequence, width = SEQUENCE_WIDTH)
}

/// Next code for `category` given the codes already stored for it.
/// Codes without a numeric suffix are ignored.
pub fn next_code<I, S>(category: &str, existing: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let max = existing
        .into_iter()
        .filter_map(|c| sequence_of(c.as_ref()))
        .max()
        .unwrap_or(0);
    format_code(category, max.saturating_add(1))
}
