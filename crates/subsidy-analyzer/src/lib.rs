pub mod analysis;
pub mod config;
pub mod documents;
pub mod error;
pub mod http;
pub mod identifier;
pub mod llm;
pub mod pipeline;
pub mod processor;
pub mod registry;
pub mod sanitize;
pub mod secrets;
pub mod storage;

pub use analysis::{AnalysisMetadata, StructuredResult};
pub use config::{default_config_path, load_config, Config};
pub use error::{AnalyzerError, ConfigError, FetchError, ProcessError, Result, StorageError};
pub use http::{HttpFetcher, HttpResponse, ReqwestFetcher};
pub use llm::{build_model, Completion, CompletionModel, LlmError, ModelProvider, TokenUsage};
pub use pipeline::{Pipeline, PipelineConfig, PipelineError, RunResult, RunState, Stage};
pub use processor::{PdfTextExtractor, TextExtractor};
pub use secrets::{resolve_secret, SecretError};
