//! Filename and log-field sanitizing.
//!
//! Document display names come straight from the registry and may contain
//! anything; these helpers turn them into safe file names and keep full
//! filesystem paths out of span attributes.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// Maximum length (in characters) of a sanitized file name stem.
pub const MAX_FILENAME_LENGTH: usize = 50;

/// Stem used when nothing survives sanitization.
const FALLBACK_FILENAME: &str = "document";

static RE_UNSAFE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static RE_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]+").unwrap());

/// Makes a display name filesystem-safe.
///
/// Drops every character that is not a word character, whitespace or hyphen,
/// collapses whitespace/hyphen runs into a single underscore and truncates to
/// [`MAX_FILENAME_LENGTH`] characters.
///
/// - `Orden Ministerial (2024) - Bases!` → `Orden_Ministerial_2024_Bases`
/// - `Bases.pdf` → `Basespdf`
pub fn clean_filename(name: &str) -> String {
    clean_filename_with_limit(name, MAX_FILENAME_LENGTH)
}

pub fn clean_filename_with_limit(name: &str, max_length: usize) -> String {
    let stripped = RE_UNSAFE.replace_all(name, "");
    let collapsed = RE_SEPARATORS.replace_all(&stripped, "_");
    let truncated: String = collapsed.chars().take(max_length).collect();
    let trimmed = truncated.trim_matches('_');

    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Returns only the filename component of a path (no directory).
///
/// Used for span fields so full paths stay out of the logs.
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Returns at most `max_chars` characters of `text`, with a trailing `...`
/// when something was cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
