//! Blocking HTTP access to the registry and document endpoints.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{self, HeaderMap, HeaderValue};

use crate::error::FetchError;

/// Connect timeout shared by every request; the per-request timeout is
/// supplied by the caller.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Single GET with a caller-supplied timeout.
///
/// Non-2xx statuses come back as a normal [`HttpResponse`]; only transport
/// failures are errors.
pub trait HttpFetcher: Send + Sync {
    fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, FetchError>;
}

pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .default_headers(default_headers(user_agent)?)
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }
}

impl HttpFetcher for ReqwestFetcher {
    fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    FetchError::Request {
                        url: url.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status().as_u16();
        let body = response.bytes().map_err(|e| FetchError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// The registry rejects obvious bot traffic, so requests look like a browser.
fn default_headers(user_agent: &str) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    let agent = HeaderValue::from_str(user_agent)
        .map_err(|e| FetchError::ClientBuild(format!("Invalid user agent: {}", e)))?;
    headers.insert(header::USER_AGENT, agent);
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("es-ES,es;q=0.9,en;q=0.8"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    Ok(headers)
}
