//! Prompt construction and model-output interpretation.

pub mod prompts;
pub mod response;
pub mod schema;

use serde_json::{Map, Value};

use crate::documents::DocumentText;

pub use response::{extract_json_span, parse_response, ParsedResponse, RAW_RESPONSE_KEY};
pub use schema::{
    format_territorial_distribution, AnalysisMetadata, Deadlines, Details, EconomicConditions,
    Identification, StructuredResult,
};

/// Joins document texts, each under a `=== DOCUMENT: <name> ===` header.
pub fn combine_documents(texts: &[DocumentText]) -> String {
    texts
        .iter()
        .map(|doc| format!("=== DOCUMENT: {} ===\n{}", doc.display_name, doc.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Picks the prompt variant: with documents when any text was extracted.
pub fn build_user_prompt(data: &Map<String, Value>, texts: &[DocumentText]) -> String {
    let subsidy_data = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());

    if texts.is_empty() {
        prompts::without_documents(&subsidy_data)
    } else {
        prompts::with_documents(&subsidy_data, &combine_documents(texts))
    }
}
