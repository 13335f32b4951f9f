use serde_json::{Map, Value};

use crate::documents::DocumentRef;
use crate::registry::document_url;

/// Key of the document listing inside a registry record.
pub const DOCUMENTS_KEY: &str = "documentos";

/// Display-name fields, in priority order.
const NAME_FIELDS: [&str; 3] = ["nombreFic", "nombre", "name"];

/// Declared-type fields, in priority order.
const TYPE_FIELDS: [&str; 2] = ["tipo", "type"];

const PDF_TYPE: &str = "PDF";

const UNKNOWN_NAME: &str = "Unknown";

/// Filters the registry's document listing down to PDF candidates.
///
/// An entry qualifies when its declared type is exactly `PDF` or its display
/// name contains `pdf` (any case), and it carries a usable `id`. Source order
/// is preserved; a missing or empty listing yields no references. Pure: the
/// same `data` always yields the same references.
pub fn locate_documents(
    data: &Map<String, Value>,
    identifier: &str,
    base_url: &str,
) -> Vec<DocumentRef> {
    let Some(entries) = data.get(DOCUMENTS_KEY).and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|entry| {
            let display_name = first_text(entry, &NAME_FIELDS).unwrap_or(UNKNOWN_NAME);
            let declared_type = first_text(entry, &TYPE_FIELDS).unwrap_or("");

            let is_candidate =
                declared_type == PDF_TYPE || display_name.to_lowercase().contains("pdf");
            if !is_candidate {
                return None;
            }

            let id = entry.get("id").and_then(id_value)?;

            Some(DocumentRef {
                url: document_url(base_url, identifier, &id),
                display_name: display_name.to_string(),
                id,
            })
        })
        .collect()
}

/// First non-empty string among `fields`.
fn first_text<'a>(entry: &'a Map<String, Value>, fields: &[&str]) -> Option<&'a str> {
    fields
        .iter()
        .filter_map(|field| entry.get(*field).and_then(Value::as_str))
        .find(|value| !value.is_empty())
}

/// Registry ids arrive as strings or numbers; empty strings and zero are
/// treated as absent.
fn id_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}
