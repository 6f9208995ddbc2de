//! HTTP access for the third-party lookups
//!
//! All network calls go through [`JsonSource`], so the geocoder and the air
//! quality lookup can be exercised against canned responses in tests.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use log::debug;

use crate::Result;
use crate::SunpathError;

/// User agent sent with every request; Nominatim rejects anonymous clients
pub const USER_AGENT: &str = "SolarPathVisualizer_v1";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_S: u64 = 10;

/// Get the cache directory path
pub fn get_cache_dir() -> PathBuf {
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".cache").join("sunpath")
}

/// Something that answers a GET with a JSON document
pub trait JsonSource {
    /// Fetch `url` with the given query parameters and parse the body as JSON
    fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<serde_json::Value>;
}

impl<S: JsonSource + ?Sized> JsonSource for &S {
    fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<serde_json::Value> {
        (**self).get_json(url, query)
    }
}

/// Blocking `reqwest` client with a timeout and the crate's user agent
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::blocking::Client,
}

impl HttpClient {
    /// Create an HTTP client with the default timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_S))
    }

    /// Create an HTTP client with a custom timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SunpathError::DataError(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl JsonSource for HttpClient {
    fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<serde_json::Value> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| SunpathError::DataError(format!("Request failed: {}", e)))?;

        // Check if the request was successful
        if !response.status().is_success() {
            return Err(SunpathError::DataError(format!(
                "Request failed, status: {}",
                response.status()
            )));
        }

        response
            .json::<serde_json::Value>()
            .map_err(|e| SunpathError::DataError(format!("Malformed JSON response: {}", e)))
    }
}
