use thiserror::Error;

/// Stage-level failure. The driver records it on the run and moves on to the
/// next stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No BDNS code could be extracted")]
    IdentifierUnresolved,

    #[error("Registry data unusable: {0}")]
    Registry(#[from] crate::error::FetchError),

    #[error("Error in model analysis: {0}")]
    Completion(#[from] crate::llm::LlmError),

    #[error("Could not extract valid JSON from model response")]
    NoJsonInResponse,

    #[error("Error saving results: {0}")]
    Storage(#[from] crate::error::StorageError),
}
