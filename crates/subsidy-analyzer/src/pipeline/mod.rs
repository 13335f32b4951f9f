pub mod config;
pub mod context;
pub mod error;
pub mod result;
pub mod runner;

pub use config::PipelineConfig;
pub use context::RunState;
pub use error::PipelineError;
pub use result::RunResult;
pub use runner::{Pipeline, Stage};
