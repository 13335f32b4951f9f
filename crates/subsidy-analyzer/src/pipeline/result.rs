use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::analysis::StructuredResult;
use crate::pipeline::context::RunState;

/// What a caller gets back from every entry point.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub success: bool,
    pub analysis_result: Option<StructuredResult>,
    pub raw_analysis: Option<Map<String, Value>>,
    pub processing_time: f64,
    pub document_count: usize,
    pub logs: Vec<String>,
    pub error: Option<String>,
    pub artifact_path: Option<PathBuf>,
}

impl RunResult {
    pub fn from_state(state: RunState) -> Self {
        Self {
            success: state.error.is_none(),
            analysis_result: state.analysis_result,
            raw_analysis: state.raw_analysis,
            processing_time: state.processing_time.unwrap_or_default(),
            document_count: state.document_count,
            logs: state.logs,
            error: state.error,
            artifact_path: state.artifact_path,
        }
    }

    /// Input rejected before any stage ran.
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            analysis_result: None,
            raw_analysis: None,
            processing_time: 0.0,
            document_count: 0,
            logs: Vec::new(),
            error: Some(error.into()),
            artifact_path: None,
        }
    }

    /// Panic escaped the stage sequence.
    pub fn crashed(message: &str, processing_time: f64) -> Self {
        Self {
            success: false,
            analysis_result: None,
            raw_analysis: None,
            processing_time,
            document_count: 0,
            logs: vec![format!("Workflow failed: {}", message)],
            error: Some(message.to_string()),
            artifact_path: None,
        }
    }

    /// Structured result if available, otherwise the raw payload.
    pub fn result_json(&self) -> Option<Value> {
        match (&self.analysis_result, &self.raw_analysis) {
            (Some(result), _) => result.to_json().ok(),
            (None, Some(raw)) => Some(Value::Object(raw.clone())),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_follows_error() {
        let mut state = RunState::default();
        state.processing_time = Some(1.5);
        state.document_count = 2;
        let ok = RunResult::from_state(state.clone());
        assert!(ok.success);
        assert_eq!(ok.processing_time, 1.5);
        assert_eq!(ok.document_count, 2);

        state.record_error("boom");
        let failed = RunResult::from_state(state);
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_rejected_shape() {
        let result = RunResult::rejected("Could not extract BDNS code from URL: x");
        assert!(!result.success);
        assert_eq!(result.processing_time, 0.0);
        assert!(result.logs.is_empty());
        assert_eq!(result.document_count, 0);
    }

    #[test]
    fn test_crashed_shape() {
        let result = RunResult::crashed("index out of bounds", 0.25);
        assert!(!result.success);
        assert_eq!(result.logs, vec!["Workflow failed: index out of bounds"]);
        assert_eq!(result.error.as_deref(), Some("index out of bounds"));
        assert_eq!(result.document_count, 0);
    }

    #[test]
    fn test_result_json_prefers_raw_when_unstructured() {
        let mut result = RunResult::rejected("x");
        assert!(result.result_json().is_none());

        result.raw_analysis = Some(json!({"raw_response": "hola"}).as_object().cloned().unwrap());
        assert_eq!(result.result_json().unwrap()["raw_response"], "hola");
    }

    #[test]
    fn test_serializes_all_fields() {
        let value = serde_json::to_value(RunResult::rejected("x")).unwrap();
        for key in [
            "success",
            "analysis_result",
            "raw_analysis",
            "processing_time",
            "document_count",
            "logs",
            "error",
            "artifact_path",
        ] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
    }
}
