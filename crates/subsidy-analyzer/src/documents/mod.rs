//! Document discovery and acquisition.

pub mod acquirer;
pub mod locator;

use std::path::PathBuf;

use serde::Serialize;

use crate::sanitize::preview;

pub use acquirer::{DocumentAcquirer, SkipReason};
pub use locator::locate_documents;

/// Number of documents shown by [`summarize_texts`].
const SUMMARY_DOCUMENTS: usize = 3;

/// A located candidate PDF, not yet downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRef {
    pub url: String,
    pub display_name: String,
    pub id: String,
}

/// A downloaded document with non-blank extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentText {
    pub display_name: String,
    pub text: String,
    pub storage_path: PathBuf,
}

/// Short human-readable preview of extracted texts, for debug logging.
pub fn summarize_texts(texts: &[DocumentText], max_chars: usize) -> String {
    if texts.is_empty() {
        return "No document content available".to_string();
    }

    let mut parts: Vec<String> = texts
        .iter()
        .take(SUMMARY_DOCUMENTS)
        .map(|doc| format!("[{}]: {}", doc.display_name, preview(&doc.text, max_chars)))
        .collect();

    if texts.len() > SUMMARY_DOCUMENTS {
        parts.push(format!(
            "... and {} more documents",
            texts.len() - SUMMARY_DOCUMENTS
        ));
    }

    parts.join("\n\n")
}
