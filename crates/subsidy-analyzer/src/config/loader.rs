use std::path::{Path, PathBuf};

use crate::config::schema::Config;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

const SUPPORTED_VERSION: &str = "1.0";

/// `<config dir>/subsidy-analyzer/config.json`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("subsidy-analyzer").join("config.json"))
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();

    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

/// Semantic checks the schema cannot express. Callers that modify a loaded
/// config should run this again.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != SUPPORTED_VERSION {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.download_directory.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "download_directory must not be empty".to_string(),
        });
    }

    if config.artifact_prefix.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "artifact_prefix must not be empty".to_string(),
        });
    }

    if config.model.name.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "model.name must not be empty".to_string(),
        });
    }

    validate_http_url("registry.base_url", &config.registry.base_url)?;
    if let Some(base_url) = &config.model.base_url {
        validate_http_url("model.base_url", base_url)?;
    }

    if config.registry.timeout_secs == 0
        || config.registry.document_timeout_secs == 0
        || config.model.timeout_secs == 0
    {
        return Err(ConfigError::Validation {
            message: "timeouts must be greater than zero".to_string(),
        });
    }

    if !(0.0..=2.0).contains(&config.model.temperature) {
        return Err(ConfigError::Validation {
            message: format!(
                "model.temperature must be between 0 and 2, got {}",
                config.model.temperature
            ),
        });
    }

    Ok(())
}

fn validate_http_url(field: &str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::Validation {
            message: format!("{} must be an http(s) URL, got '{}'", field, url),
        })
    }
}
