use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::analysis::StructuredResult;
use crate::documents::{DocumentRef, DocumentText};

/// Mutable record threaded through every stage of one run.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    // Input; the identifier is fixed once the resolve stage sets it
    pub identifier: String,
    pub source_url: Option<String>,

    // Grows with every registry merge
    pub data: Map<String, Value>,

    // Locate stage result
    pub document_refs: Vec<DocumentRef>,

    // Acquire stage result, a subsequence of document_refs
    pub document_texts: Vec<DocumentText>,
    pub document_count: usize,

    // Analyze stage result; at most one of these is the "real" outcome
    pub analysis_result: Option<StructuredResult>,
    pub raw_analysis: Option<Map<String, Value>>,

    // Persist stage result
    pub artifact_path: Option<PathBuf>,

    // First recorded failure
    pub error: Option<String>,
    pub logs: Vec<String>,

    // Set by the driver after the last stage
    pub processing_time: Option<f64>,
}

impl RunState {
    pub fn new(
        identifier: Option<String>,
        source_url: Option<String>,
        data: Map<String, Value>,
    ) -> Self {
        Self {
            identifier: identifier.unwrap_or_default(),
            source_url,
            data,
            ..Self::default()
        }
    }

    pub fn log(&mut self, message: impl Into<String>) {
        self.logs.push(message.into());
    }

    /// Logs the failure and keeps it as `error` unless one is already set.
    pub fn record_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.logs.push(format!("Error: {}", message));
        if self.error.is_none() {
            self.error = Some(message);
        }
    }

    pub fn has_result(&self) -> bool {
        self.analysis_result.is_some() || self.raw_analysis.is_some()
    }
}
