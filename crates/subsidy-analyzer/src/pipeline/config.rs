use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;

pub struct PipelineConfig {
    pub download_directory: PathBuf,
    pub artifact_prefix: String,
    pub registry_base_url: String,
    pub registry_timeout: Duration,
    pub document_timeout: Duration,
    pub user_agent: String,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            download_directory: PathBuf::from(&config.download_directory),
            artifact_prefix: config.artifact_prefix.clone(),
            registry_base_url: config.registry.base_url.trim_end_matches('/').to_string(),
            registry_timeout: Duration::from_secs(config.registry.timeout_secs),
            document_timeout: Duration::from_secs(config.registry.document_timeout_secs),
            user_agent: config.registry.user_agent.clone(),
        }
    }
}
