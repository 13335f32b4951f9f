use serde::{Deserialize, Serialize};

use crate::llm::ModelProvider;

pub const DEFAULT_REGISTRY_BASE_URL: &str = "https://www.subvenciones.gob.es/bdnstrans";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_download_directory")]
    pub download_directory: String,
    #[serde(default = "default_artifact_prefix")]
    pub artifact_prefix: String,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_download_directory() -> String {
    "downloaded_files".to_string()
}

fn default_artifact_prefix() -> String {
    "Subsidy_Analysis".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            download_directory: default_download_directory(),
            artifact_prefix: default_artifact_prefix(),
            registry: RegistryConfig::default(),
            model: ModelConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_base_url")]
    pub base_url: String,
    #[serde(default = "default_registry_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_document_timeout")]
    pub document_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_registry_base_url() -> String {
    DEFAULT_REGISTRY_BASE_URL.to_string()
}

fn default_registry_timeout() -> u64 {
    30
}

fn default_document_timeout() -> u64 {
    60
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: default_registry_base_url(),
            timeout_secs: default_registry_timeout(),
            document_timeout_secs: default_document_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_name")]
    pub name: String,
    /// Overrides the provider lookup by model name.
    #[serde(default)]
    pub provider: Option<ModelProvider>,
    /// Overrides the provider's default endpoint (proxies, self-hosted gateways).
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_file: Option<String>,
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
}

fn default_model_name() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_model_timeout() -> u64 {
    120
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            provider: None,
            base_url: None,
            api_key: None,
            api_key_file: None,
            api_key_env: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_model_timeout(),
        }
    }
}
