//! Client configuration
//!
//! Centralized configuration for the Retell API client with environment
//! variable support and sensible defaults.

use serde::Serialize;
use std::env;
use std::time::Duration;

/// Default Retell API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.retellai.com";
/// Default per-request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default base delay between retries in milliseconds
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

/// Retell API client configuration
#[derive(Debug, Clone, Serialize)]
pub struct ClientConfig {
    /// Base URL of the REST API
    pub base_url: String,
    /// Bearer API key
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Transport-level timeout for each request, in milliseconds
    pub timeout_ms: u64,
    /// Retries after the first attempt for transient failures
    pub max_retries: u32,
    /// Base delay of the linear backoff, in milliseconds
    pub retry_delay_ms: u64,
    /// Optional relay prefix placed in front of every request URL
    pub proxy_url: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            proxy_url: None,
        }
    }
}

impl ClientConfig {
    /// Create a configuration for the given endpoint and key, other fields default
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("RETELL_API_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: env::var("RETELL_API_KEY").unwrap_or_default(),
            timeout_ms: parse_env("RETELL_API_TIMEOUT_MS").unwrap_or(DEFAULT_TIMEOUT_MS),
            max_retries: parse_env("RETELL_API_MAX_RETRIES").unwrap_or(DEFAULT_MAX_RETRIES),
            retry_delay_ms: parse_env("RETELL_API_RETRY_DELAY_MS")
                .unwrap_or(DEFAULT_RETRY_DELAY_MS),
            proxy_url: env::var("RETELL_API_PROXY_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }

    /// Set the retry ceiling and base delay
    pub fn with_retry(mut self, max_retries: u32, retry_delay_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the relay prefix
    pub fn with_proxy_url(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }

    /// Validate the configuration
    /// Returns Ok(()) if valid, Err with message if invalid
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.trim().is_empty() {
            return Err("RETELL_API_KEY is not set".to_string());
        }
        if self.base_url.trim().is_empty() {
            return Err("base_url cannot be empty".to_string());
        }
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be > 0".to_string());
        }
        Ok(())
    }

    /// Per-request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Full URL for an API path, honouring the relay prefix
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        match self.proxy_url.as_deref() {
            Some(proxy) => format!("{}{}{}", proxy, base, path),
            None => format!("{}{}", base, path),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
