use std::path::PathBuf;
use thiserror::Error;

use crate::llm::LlmError;
use crate::secrets::SecretError;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Model error: {0}")]
    Llm(#[from] LlmError),

    #[error("Secret error: {0}")]
    Secret(#[from] SecretError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Unknown model '{name}': set model.provider explicitly")]
    UnknownModel { name: String },
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Request to '{url}' failed: {message}")]
    Request { url: String, message: String },

    #[error("Request to '{url}' timed out")]
    Timeout { url: String },

    #[error("Failed to read response body from '{url}': {message}")]
    Body { url: String, message: String },

    #[error("Response from '{url}' is not a JSON object: {message}")]
    InvalidJson { url: String, message: String },
}

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Content is not a PDF (missing %PDF signature)")]
    NotPdf,

    #[error("Failed to process PDF: {0}")]
    PdfProcessing(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize artifact: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
