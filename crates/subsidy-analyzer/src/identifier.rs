//! Canonical subsidy identifier (BDNS code) resolution.
//!
//! Sources are tried in a fixed priority order; the first one that yields a
//! non-empty value wins:
//!
//! 1. an explicit identifier already on the run
//! 2. the trailing numeric path segment of the source URL
//! 3. a code field inside the data bag, see [`DATA_CODE_KEYS`]

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

/// Data bag keys that may carry the code, in priority order.
pub const DATA_CODE_KEYS: [&str; 2] = ["codigo_bdns", "bdns_code"];

static RE_TRAILING_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/(\d+)$").unwrap());

/// Where a resolved identifier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierSource {
    Explicit,
    SourceUrl,
    DataBag,
}

impl std::fmt::Display for IdentifierSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            IdentifierSource::Explicit => "explicit code",
            IdentifierSource::SourceUrl => "source URL",
            IdentifierSource::DataBag => "subsidy data",
        };
        f.write_str(label)
    }
}

/// Extracts the code from a URL ending in `/<digits>`.
///
/// `https://www.subvenciones.gob.es/bdnstrans/GE/es/convocatorias/845133` → `845133`
pub fn from_url(url: &str) -> Option<String> {
    RE_TRAILING_CODE
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Looks the code up under [`DATA_CODE_KEYS`]. Numbers are accepted as well
/// as strings since registry exports are not consistent about it.
pub fn from_data(data: &Map<String, Value>) -> Option<String> {
    DATA_CODE_KEYS
        .iter()
        .filter_map(|key| data.get(*key))
        .find_map(code_value)
}

fn code_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Applies the priority list. Returns the identifier and which source won.
pub fn resolve(
    explicit: Option<&str>,
    source_url: Option<&str>,
    data: &Map<String, Value>,
) -> Option<(String, IdentifierSource)> {
    if let Some(code) = explicit.map(str::trim).filter(|c| !c.is_empty()) {
        return Some((code.to_string(), IdentifierSource::Explicit));
    }

    if let Some(code) = source_url.and_then(from_url) {
        return Some((code, IdentifierSource::SourceUrl));
    }

    from_data(data).map(|code| (code, IdentifierSource::DataBag))
}
