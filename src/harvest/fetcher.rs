//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made by the harvester:
//! - Building the HTTP client with the configured user agent and timeouts
//! - GET requests that only accept status 200
//! - Bounded retries with a fixed delay, through [`retry`]

use crate::config::FetchConfig;
use crate::harvest::retry::{retry, RetryPolicy};
use reqwest::{Client, StatusCode};
use std::fmt;
use thiserror::Error;

/// Why a single attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The server answered with a status other than 200
    Status(u16),

    /// Connection, timeout, or body read error
    Transport(String),
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "HTTP {}", code),
            Self::Transport(error) => write!(f, "transport error: {}", error),
        }
    }
}

/// Terminal fetch failure, returned once every attempt has failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to fetch {url} after {attempts} attempt(s): {last}")]
pub struct FetchError {
    pub url: String,
    pub attempts: u32,
    pub last: FetchFailure,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use ces_harvest::config::FetchConfig;
/// use ces_harvest::harvest::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Retrying page fetcher
///
/// Every non-200 answer and every transport error is retried until the
/// policy's attempt bound is reached; the caller then receives a
/// [`FetchError`] and decides whether it is fatal.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    /// Creates a fetcher from configuration
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            policy: RetryPolicy::from_config(config),
        })
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches a URL and returns its body
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 200 | Return body |
    /// | Any other status | Retry after the fixed delay |
    /// | Timeout / connection / body error | Retry after the fixed delay |
    /// | Attempts exhausted | Return `FetchError` |
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let max_attempts = self.policy.max_attempts;

        retry(&self.policy, |_: &FetchFailure| true, |attempt| async move {
            let result = self.attempt(url).await;
            if let Err(failure) = &result {
                tracing::warn!(
                    "{} at try {}/{} for {}",
                    failure,
                    attempt,
                    max_attempts,
                    url
                );
            }
            result
        })
        .await
        .map_err(|err| {
            let attempts = err.attempts();
            let last = err.into_inner();
            tracing::error!("Max retries reached ({}) for {}", attempts, url);
            FetchError {
                url: url.to_string(),
                attempts,
                last,
            }
        })
    }

    /// Makes a single GET request
    async fn attempt(&self, url: &str) -> Result<String, FetchFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchFailure::Transport(describe_transport_error(&e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| FetchFailure::Transport(describe_transport_error(&e)))
    }
}

/// Classifies a reqwest error for logging
fn describe_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timeout".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&FetchConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_fetcher_uses_configured_bound() {
        let config = FetchConfig {
            max_retries: 4,
            ..FetchConfig::default()
        };
        let fetcher = Fetcher::new(&config).unwrap();
        assert_eq!(fetcher.policy().max_attempts, 4);
    }

    #[test]
    fn test_failure_display() {
        assert_eq!(FetchFailure::Status(503).to_string(), "HTTP 503");

        let err = FetchError {
            url: "https://example.com/".to_string(),
            attempts: 10,
            last: FetchFailure::Status(500),
        };
        assert_eq!(
            err.to_string(),
            "failed to fetch https://example.com/ after 10 attempt(s): HTTP 500"
        );
    }

    // Retry behavior against a live server is covered with wiremock in the
    // integration tests
}
