//! Test harness for isolated pipeline runs.
//!
//! Network and model access are replaced by scripted fakes; PDF text
//! extraction uses the real lopdf-backed extractor.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;

use subsidy_analyzer::llm::{Completion, CompletionModel, LlmError, TokenUsage};
use subsidy_analyzer::registry;
use subsidy_analyzer::{FetchError, HttpFetcher, HttpResponse, PdfTextExtractor, Pipeline, PipelineConfig};

pub const REGISTRY_BASE: &str = "https://registry.test/bdnstrans";

/// Serves canned responses by exact URL; unknown URLs fail like an
/// unreachable host.
#[derive(Default)]
pub struct ScriptedFetcher {
    routes: Mutex<HashMap<String, HttpResponse>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn route(&self, url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.into(), HttpResponse::new(status, body));
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpFetcher for ScriptedFetcher {
    fn get(&self, url: &str, _timeout: Duration) -> Result<HttpResponse, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.routes
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Request {
                url: url.to_string(),
                message: "connection refused".to_string(),
            })
    }
}

#[derive(Debug, Clone)]
pub enum ModelReply {
    Text(String),
    Fail(String),
    Panic(String),
}

/// Completion model returning a fixed reply and recording every prompt.
pub struct ScriptedModel {
    reply: Mutex<ModelReply>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedModel {
    pub fn new(reply: ModelReply) -> Self {
        Self {
            reply: Mutex::new(reply),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn set_reply(&self, reply: ModelReply) {
        *self.reply.lock().unwrap() = reply;
    }

    /// `(system, user)` pairs in call order.
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn last_user_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().map(|(_, user)| user.clone())
    }
}

impl CompletionModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted-model"
    }

    fn complete(&self, system: &str, user: &str) -> Result<Completion, LlmError> {
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));

        let reply = self.reply.lock().unwrap().clone();
        match reply {
            ModelReply::Text(text) => Ok(Completion {
                usage: TokenUsage::estimate("scripted-model", system, user, &text),
                text,
            }),
            ModelReply::Fail(message) => Err(LlmError::Api {
                status: 503,
                message,
            }),
            ModelReply::Panic(message) => panic!("{}", message),
        }
    }
}

/// Isolated environment for one pipeline test.
pub struct TestHarness {
    temp_dir: TempDir,
    pub download_dir: PathBuf,
    pub fetcher: Arc<ScriptedFetcher>,
    pub model: Arc<ScriptedModel>,
}

impl TestHarness {
    /// Harness whose model answers with `reply`.
    pub fn new(reply: ModelReply) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let download_dir = temp_dir.path().join("downloads");

        Self {
            temp_dir,
            download_dir,
            fetcher: Arc::new(ScriptedFetcher::default()),
            model: Arc::new(ScriptedModel::new(reply)),
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config(&self) -> PipelineConfig {
        PipelineConfig {
            download_directory: self.download_dir.clone(),
            artifact_prefix: "Subsidy_Analysis".to_string(),
            registry_base_url: REGISTRY_BASE.to_string(),
            registry_timeout: Duration::from_secs(5),
            document_timeout: Duration::from_secs(5),
            user_agent: "subsidy-analyzer-tests".to_string(),
        }
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(
            Arc::new(self.config()),
            self.fetcher.clone(),
            Arc::new(PdfTextExtractor::new()),
            self.model.clone(),
        )
    }

    /// Serves `record` as the registry answer for `identifier`.
    pub fn serve_registry(&self, identifier: &str, record: &serde_json::Value) {
        self.fetcher.route(
            registry::query_url(REGISTRY_BASE, identifier),
            200,
            record.to_string().into_bytes(),
        );
    }

    pub fn serve_document(&self, identifier: &str, document_id: &str, status: u16, body: Vec<u8>) {
        self.fetcher.route(
            registry::document_url(REGISTRY_BASE, identifier, document_id),
            status,
            body,
        );
    }

    /// Files currently in the download directory, sorted by name.
    pub fn downloaded_files(&self) -> Vec<String> {
        let mut names: Vec<String> = match std::fs::read_dir(&self.download_dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }
}
