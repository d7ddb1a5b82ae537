//! Configuration management for the operator console

use std::time::Duration;

use crate::error::{ConsoleError, Result};
use crate::poller::RetryPolicy;
use worker::Env;

/// Operator console configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment (production, staging, development)
    pub environment: String,

    /// Log level ("debug" turns on per-request logging)
    pub log_level: String,

    /// Base URL of the trading backend, without trailing slash
    pub backend_url: String,

    /// Chart refresh cadence while the backend is healthy
    pub poll_interval_seconds: u64,

    /// Retry backoff
    pub retry_base_delay_seconds: u64, // first retry delay, doubled per attempt
    pub retry_max_delay_seconds: u64,  // cap on any single delay
    pub retry_max_attempts: u32,       // give up (and reset) after this many

    /// Page heading
    pub dashboard_title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    /// Load configuration from Cloudflare environment variables
    pub fn from_env(env: &Env) -> Result<Self> {
        let config = Self::from_lookup(|key| env.var(key).ok().map(|v| v.to_string()));
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from any key lookup, falling back to defaults for
    /// missing or unparseable values
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "production".to_string()),

            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),

            backend_url: lookup("BACKEND_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|| "http://localhost:5000".to_string()),

            poll_interval_seconds: lookup("POLL_INTERVAL_SECONDS")
                .map(|v| v.trim().parse().unwrap_or(30))
                .unwrap_or(30),

            retry_base_delay_seconds: lookup("RETRY_BASE_DELAY_SECONDS")
                .map(|v| v.trim().parse().unwrap_or(5))
                .unwrap_or(5),

            retry_max_delay_seconds: lookup("RETRY_MAX_DELAY_SECONDS")
                .map(|v| v.trim().parse().unwrap_or(30))
                .unwrap_or(30),

            retry_max_attempts: lookup("RETRY_MAX_ATTEMPTS")
                .map(|v| v.trim().parse().unwrap_or(3))
                .unwrap_or(3),

            dashboard_title: lookup("DASHBOARD_TITLE")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "Trading Console".to_string()),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.backend_url.is_empty() {
            return Err(ConsoleError::Config("BACKEND_URL must not be empty".into()));
        }
        if !(self.backend_url.starts_with("http://") || self.backend_url.starts_with("https://")) {
            return Err(ConsoleError::Config(format!(
                "BACKEND_URL must be http(s), got {}",
                self.backend_url
            )));
        }
        if self.poll_interval_seconds == 0 {
            return Err(ConsoleError::Config("poll_interval_seconds must be positive".into()));
        }
        if self.retry_base_delay_seconds == 0 {
            return Err(ConsoleError::Config("retry_base_delay_seconds must be positive".into()));
        }
        if self.retry_max_delay_seconds < self.retry_base_delay_seconds {
            return Err(ConsoleError::Config(
                "retry_max_delay_seconds must be >= retry_base_delay_seconds".into(),
            ));
        }
        if self.retry_max_attempts == 0 {
            return Err(ConsoleError::Config("retry_max_attempts must be at least 1".into()));
        }
        Ok(())
    }

    pub fn is_debug(&self) -> bool {
        self.log_level.eq_ignore_ascii_case("debug")
    }

    /// Retry policy for the chart poller
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            poll_interval: Duration::from_secs(self.poll_interval_seconds),
            base_delay: Duration::from_secs(self.retry_base_delay_seconds),
            max_delay: Duration::from_secs(self.retry_max_delay_seconds),
            max_attempts: self.retry_max_attempts,
        }
    }
}
