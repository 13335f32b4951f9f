//! Public subsidy registry (BDNS) endpoints.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::error::FetchError;
use crate::http::HttpFetcher;

/// Registry query for one announcement.
pub fn query_url(base_url: &str, identifier: &str) -> String {
    format!(
        "{}/api/convocatorias?numConv={}&vpd=GE",
        base_url.trim_end_matches('/'),
        identifier
    )
}

/// Download link for one document attached to an announcement.
pub fn document_url(base_url: &str, identifier: &str, document_id: &str) -> String {
    format!(
        "{}/GE/es/convocatoria/{}/document/{}",
        base_url.trim_end_matches('/'),
        identifier,
        document_id
    )
}

/// Public landing page of an announcement.
pub fn landing_url(base_url: &str, identifier: &str) -> String {
    format!(
        "{}/GE/es/convocatorias/{}",
        base_url.trim_end_matches('/'),
        identifier
    )
}

/// Outcome of a registry query that did not hit a malformed body.
#[derive(Debug)]
pub enum RegistryLookup {
    Found(Map<String, Value>),
    /// Any status other than 200.
    Status(u16),
    Unreachable(FetchError),
}

pub struct RegistryClient {
    fetcher: Arc<dyn HttpFetcher>,
    base_url: String,
    timeout: Duration,
}

impl RegistryClient {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            timeout,
        }
    }

    /// One GET, no retries. Only a 200 whose body is not a JSON object is
    /// returned as `Err`; other failures are reported through the lookup.
    pub fn lookup(&self, identifier: &str) -> Result<RegistryLookup, FetchError> {
        let url = query_url(&self.base_url, identifier);
        tracing::debug!(url = %url, "Querying registry");

        let response = match self.fetcher.get(&url, self.timeout) {
            Ok(response) => response,
            Err(e) => return Ok(RegistryLookup::Unreachable(e)),
        };

        if !response.is_ok() {
            return Ok(RegistryLookup::Status(response.status));
        }

        tracing::debug!(bytes = response.body.len(), "Registry response received");

        match serde_json::from_slice::<Value>(&response.body) {
            Ok(Value::Object(record)) => Ok(RegistryLookup::Found(record)),
            Ok(other) => Err(FetchError::InvalidJson {
                url,
                message: format!("expected an object, got {}", json_kind(&other)),
            }),
            Err(e) => Err(FetchError::InvalidJson {
                url,
                message: e.to_string(),
            }),
        }
    }
}

/// Shallow merge: incoming top-level keys overwrite existing ones, nothing is
/// removed.
pub fn merge_record(data: &mut Map<String, Value>, record: Map<String, Value>) {
    for (key, value) in record {
        data.insert(key, value);
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
