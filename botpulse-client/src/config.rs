//! Client configuration.
//!
//! Resolution order is environment variable, then hardcoded default, with
//! builder methods for overrides in code (tests mostly use the builder).

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

/// Get API base address from BOTPULSE_API_URL env var (default: http://127.0.0.1:8000)
fn default_api_url() -> String {
    static API_URL: OnceLock<String> = OnceLock::new();
    API_URL
        .get_or_init(|| {
            std::env::var("BOTPULSE_API_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string())
        })
        .clone()
}

/// Get refresh interval from BOTPULSE_REFRESH_SECS env var (default: 10 seconds)
fn default_refresh_interval() -> Duration {
    static REFRESH_SECS: OnceLock<u64> = OnceLock::new();
    let secs = *REFRESH_SECS.get_or_init(|| {
        std::env::var("BOTPULSE_REFRESH_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10)
    });
    Duration::from_secs(secs)
}

/// Get token slot path from BOTPULSE_TOKEN_PATH env var (default: ~/.botpulse/token)
fn default_token_path() -> PathBuf {
    static TOKEN_PATH: OnceLock<PathBuf> = OnceLock::new();
    TOKEN_PATH
        .get_or_init(|| {
            std::env::var("BOTPULSE_TOKEN_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                    PathBuf::from(home).join(".botpulse").join("token")
                })
        })
        .clone()
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST API base address
    pub api_url: String,
    /// Interval between dashboard refresh batches
    pub refresh_interval: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Durable slot holding the session token
    pub token_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            refresh_interval: default_refresh_interval(),
            request_timeout: Duration::from_secs(10),
            token_path: default_token_path(),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with a custom API base address
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Default::default()
        }
    }

    /// Set refresh interval
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Set per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set token slot path
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::new("http://localhost:9000")
            .with_refresh_interval(Duration::from_secs(5))
            .with_request_timeout(Duration::from_secs(3))
            .with_token_path("/tmp/botpulse-token");

        assert_eq!(config.api_url, "http://localhost:9000");
        assert_eq!(config.refresh_interval, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.token_path, PathBuf::from("/tmp/botpulse-token"));
    }
}
