use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};
use tracing::{debug, error, info, info_span, warn};

use crate::analysis::{self, AnalysisMetadata, ParsedResponse};
use crate::documents::{self, locate_documents, DocumentAcquirer};
use crate::error::AnalyzerError;
use crate::http::{HttpFetcher, ReqwestFetcher};
use crate::identifier;
use crate::llm::CompletionModel;
use crate::processor::{PdfTextExtractor, TextExtractor};
use crate::registry::{self, merge_record, RegistryClient, RegistryLookup};
use crate::sanitize;
use crate::storage::FileStorage;

use super::config::PipelineConfig;
use super::context::RunState;
use super::error::PipelineError;
use super::result::RunResult;

/// Preview length used when document texts are summarized in debug logs.
const SUMMARY_PREVIEW_CHARS: usize = 200;

/// The six stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolveIdentifier,
    FetchRegistry,
    LocateDocuments,
    AcquireDocuments,
    Analyze,
    Persist,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::ResolveIdentifier,
        Stage::FetchRegistry,
        Stage::LocateDocuments,
        Stage::AcquireDocuments,
        Stage::Analyze,
        Stage::Persist,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::ResolveIdentifier => "resolve_identifier",
            Stage::FetchRegistry => "fetch_registry",
            Stage::LocateDocuments => "locate_documents",
            Stage::AcquireDocuments => "acquire_documents",
            Stage::Analyze => "analyze",
            Stage::Persist => "persist",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub struct Pipeline {
    config: Arc<PipelineConfig>,
    registry: RegistryClient,
    acquirer: DocumentAcquirer,
    model: Arc<dyn CompletionModel>,
    storage: FileStorage,
}

impl Pipeline {
    /// Production constructor: reqwest for HTTP, lopdf for text extraction.
    pub fn from_config(
        config: Arc<PipelineConfig>,
        model: Arc<dyn CompletionModel>,
    ) -> Result<Self, AnalyzerError> {
        let fetcher: Arc<dyn HttpFetcher> = Arc::new(ReqwestFetcher::new(&config.user_agent)?);
        let extractor: Arc<dyn TextExtractor> = Arc::new(PdfTextExtractor::new());
        Ok(Self::new(config, fetcher, extractor, model))
    }

    /// Constructor with injected collaborators.
    pub fn new(
        config: Arc<PipelineConfig>,
        fetcher: Arc<dyn HttpFetcher>,
        extractor: Arc<dyn TextExtractor>,
        model: Arc<dyn CompletionModel>,
    ) -> Self {
        let registry = RegistryClient::new(
            Arc::clone(&fetcher),
            config.registry_base_url.clone(),
            config.registry_timeout,
        );
        let acquirer = DocumentAcquirer::new(
            fetcher,
            extractor,
            FileStorage::new(&config.download_directory),
            config.document_timeout,
        );
        let storage = FileStorage::new(&config.download_directory);

        Self {
            config,
            registry,
            acquirer,
            model,
            storage,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the pipeline for a known BDNS code.
    pub fn analyze_identifier(&self, code: &str) -> RunResult {
        let code = code.trim();
        if code.is_empty() {
            return RunResult::rejected("A BDNS code must be provided");
        }

        let source_url = registry::landing_url(&self.config.registry_base_url, code);
        let state = RunState::new(Some(code.to_string()), Some(source_url), Map::new());
        self.run(state).0
    }

    /// Runs the pipeline for an announcement URL ending in its BDNS code.
    pub fn analyze_url(&self, url: &str) -> RunResult {
        match identifier::from_url(url) {
            Some(code) => self.analyze_identifier(&code),
            None => RunResult::rejected(format!("Could not extract BDNS code from URL: {}", url)),
        }
    }

    /// Runs the pipeline for subsidy data already at hand. The data must carry
    /// a code (`codigo_bdns` / `bdns_code`) or a `source_url` ending in one.
    pub fn analyze_data(&self, data: Map<String, Value>) -> RunResult {
        let code = identifier::from_data(&data);
        let source_url = data
            .get("source_url")
            .and_then(Value::as_str)
            .filter(|url| !url.trim().is_empty())
            .map(str::to_string);

        let url_has_code = source_url.as_deref().and_then(identifier::from_url).is_some();
        if code.is_none() && !url_has_code {
            return RunResult::rejected(
                "Either a BDNS code or a source_url ending in one must be provided in the subsidy data",
            );
        }

        let state = RunState::new(code, source_url, data);
        self.run(state).0
    }

    /// Runs all six stages on `state` and reports the outcome.
    ///
    /// A stage failure is recorded on the state and the next stage still
    /// runs. Only a panic escaping the stages yields the crash result; the
    /// partially updated state is returned alongside for inspection.
    pub fn run(&self, mut state: RunState) -> (RunResult, RunState) {
        let run_id = uuid::Uuid::new_v4();
        let _pipeline_span = info_span!("pipeline",
            run_id = %run_id,
            identifier = %state.identifier,
        )
        .entered();

        let start = Instant::now();
        let outcome = catch_unwind(AssertUnwindSafe(|| self.execute(&mut state)));
        let elapsed = start.elapsed().as_secs_f64();

        match outcome {
            Ok(()) => {
                state.processing_time = Some(elapsed);
                info!(
                    identifier = %state.identifier,
                    elapsed_secs = elapsed,
                    documents = state.document_count,
                    "Workflow completed"
                );
                if let Some(ref e) = state.error {
                    error!(error = %e, "Workflow error");
                }
                (RunResult::from_state(state.clone()), state)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(error = %message, "Workflow failed");
                (RunResult::crashed(&message, elapsed), state)
            }
        }
    }

    fn execute(&self, state: &mut RunState) {
        for stage in Stage::ALL {
            let _step = info_span!("stage", name = stage.name()).entered();
            if let Err(e) = self.run_stage(stage, state) {
                warn!(stage = %stage, error = %e, "Stage failed");
                state.record_error(e.to_string());
            }
        }
    }

    fn run_stage(&self, stage: Stage, state: &mut RunState) -> Result<(), PipelineError> {
        match stage {
            Stage::ResolveIdentifier => self.step_resolve_identifier(state),
            Stage::FetchRegistry => self.step_fetch_registry(state),
            Stage::LocateDocuments => {
                self.step_locate_documents(state);
                Ok(())
            }
            Stage::AcquireDocuments => {
                self.step_acquire_documents(state);
                Ok(())
            }
            Stage::Analyze => self.step_analyze(state),
            Stage::Persist => self.step_persist(state),
        }
    }

    pub(crate) fn step_resolve_identifier(&self, state: &mut RunState) -> Result<(), PipelineError> {
        let (code, source) = identifier::resolve(
            Some(&state.identifier),
            state.source_url.as_deref(),
            &state.data,
        )
        .ok_or(PipelineError::IdentifierUnresolved)?;

        debug!(identifier = %code, source = %source, "Identifier resolved");
        state.log(format!("BDNS code: {}", code));
        state.identifier = code;
        Ok(())
    }

    pub(crate) fn step_fetch_registry(&self, state: &mut RunState) -> Result<(), PipelineError> {
        if state.identifier.is_empty() {
            state.log("Skipping registry lookup: no BDNS code");
            return Ok(());
        }

        match self.registry.lookup(&state.identifier)? {
            RegistryLookup::Found(record) => {
                debug!(keys = record.len(), "Merging registry record");
                merge_record(&mut state.data, record);
                state.log("Registry data fetched successfully");
            }
            RegistryLookup::Status(status) => {
                warn!(status, "Registry returned non-success status");
                state.log(format!("Registry call failed with status: {}", status));
            }
            RegistryLookup::Unreachable(e) => {
                warn!(error = %e, "Registry unreachable");
                state.log(format!("Registry call failed: {}", e));
            }
        }

        Ok(())
    }

    pub(crate) fn step_locate_documents(&self, state: &mut RunState) {
        let refs = locate_documents(
            &state.data,
            &state.identifier,
            &self.config.registry_base_url,
        );

        for doc in &refs {
            debug!(name = %doc.display_name, id = %doc.id, "Found PDF");
        }

        state.log(format!("Found {} PDFs", refs.len()));
        state.document_refs = refs;
    }

    pub(crate) fn step_acquire_documents(&self, state: &mut RunState) {
        if state.document_refs.is_empty() {
            info!("No PDFs to download");
            state.document_texts = Vec::new();
            state.document_count = 0;
            state.log("No PDFs to download");
            return;
        }

        let mut skipped = Vec::new();
        let texts = self
            .acquirer
            .acquire_all(&state.identifier, &state.document_refs, |doc, reason| {
                warn!(name = %doc.display_name, reason = %reason, "Skipping document");
                skipped.push(format!("Skipped {}: {}", doc.display_name, reason));
            });

        state.logs.extend(skipped);
        state.document_count = texts.len();
        state.document_texts = texts;

        debug!(
            summary = %documents::summarize_texts(&state.document_texts, SUMMARY_PREVIEW_CHARS),
            "Document texts"
        );
        state.log(format!(
            "Downloaded and processed {} PDFs",
            state.document_count
        ));
    }

    pub(crate) fn step_analyze(&self, state: &mut RunState) -> Result<(), PipelineError> {
        let user_prompt = analysis::build_user_prompt(&state.data, &state.document_texts);

        info!(
            model = %self.model.model_name(),
            with_documents = !state.document_texts.is_empty(),
            "Calling model for analysis"
        );
        let completion = self
            .model
            .complete(analysis::prompts::SYSTEM_PROMPT, &user_prompt)?;

        info!(
            model = %completion.usage.model_name,
            input_tokens = completion.usage.input_tokens,
            output_tokens = completion.usage.output_tokens,
            "Token usage"
        );

        let metadata = AnalysisMetadata {
            analysis_date: chrono::Local::now().to_rfc3339(),
            subsidy_code: state.identifier.clone(),
            used_pdf: !state.document_texts.is_empty(),
            pdf_count: state.document_texts.len(),
            model_used: self.model.model_name().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            token_usage: Some(completion.usage.clone()),
        };

        let outcome = match analysis::parse_response(&completion.text) {
            ParsedResponse::Structured(mut result) => {
                info!("Analysis parsed into structured format");
                result.metadata = metadata.to_map();
                state.analysis_result = Some(*result);
                Ok(())
            }
            ParsedResponse::Unstructured(mut raw) => {
                warn!("Keeping unstructured analysis JSON");
                raw.insert("metadata".to_string(), Value::Object(metadata.to_map()));
                state.raw_analysis = Some(raw);
                Ok(())
            }
            ParsedResponse::NoJson(text) => {
                error!("Could not extract JSON from model response");
                let mut raw = analysis::response::raw_response_payload(&text);
                raw.insert("metadata".to_string(), Value::Object(metadata.to_map()));
                state.raw_analysis = Some(raw);
                Err(PipelineError::NoJsonInResponse)
            }
        };

        state.log("Analysis completed");
        outcome
    }

    pub(crate) fn step_persist(&self, state: &mut RunState) -> Result<(), PipelineError> {
        if !state.has_result() || state.identifier.is_empty() {
            warn!("No analysis result or BDNS code to save");
            state.log("No analysis result to save");
            return Ok(());
        }

        let filename = artifact_filename(
            &self.config.artifact_prefix,
            &state.identifier,
            state.document_count,
            &chrono::Local::now().format("%Y%m%d_%H%M%S").to_string(),
        );

        let path = match (&state.analysis_result, &state.raw_analysis) {
            (Some(result), _) => self.storage.store_json(&filename, result)?,
            (None, Some(raw)) => self.storage.store_json(&filename, raw)?,
            (None, None) => return Ok(()),
        };

        info!(file = %sanitize::redact_path(&path), "Analysis saved");
        state.log(format!("Results saved to {}", path.display()));
        state.artifact_path = Some(path);
        Ok(())
    }
}

/// `<prefix>_<identifier>_<timestamp>_with_<N>_PDFs.json`, or `_JSON_only`
/// when no document contributed.
pub fn artifact_filename(
    prefix: &str,
    identifier: &str,
    document_count: usize,
    timestamp: &str,
) -> String {
    let indicator = if document_count > 0 {
        format!("with_{}_PDFs", document_count)
    } else {
        "JSON_only".to_string()
    };
    format!("{}_{}_{}_{}.json", prefix, identifier, timestamp, indicator)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
