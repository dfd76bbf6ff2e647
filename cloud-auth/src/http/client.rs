//! HTTP client builder with retry middleware.

use std::time::Duration;

use reqwest_retry::RetryTransientMiddleware;

use super::BackoffPolicy;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum number of retries.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further attempt.
    pub base_retry_delay: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            base_retry_delay: Duration::from_secs(1),
            user_agent: format!("call-insights/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client whose requests are retried on transient failures.
pub type HttpClient = reqwest_middleware::ClientWithMiddleware;

/// Builder for HTTP clients used against storage and identity endpoints.
///
/// Transient failures (connection errors, 408, 429 and 5xx responses) are
/// retried with exponential backoff up to `max_retries` times.
pub struct ClientBuilder {
    config: HttpClientConfig,
}

impl ClientBuilder {
    /// Create a new client builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Set the delay before the first retry.
    pub fn with_base_retry_delay(mut self, delay: Duration) -> Self {
        self.config.base_retry_delay = delay;
        self
    }

    /// Build the configured HTTP client.
    pub fn build(self) -> Result<HttpClient, reqwest::Error> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent)
            .build()?;

        let retry_policy = BackoffPolicy::new(self.config.max_retries)
            .with_delays(self.config.base_retry_delay, Duration::from_secs(30));
        let client_with_middleware = reqwest_middleware::ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(client_with_middleware)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
