//! Client configuration

use std::time::Duration;

/// Default attempt budget when the write carried new images
pub const DEFAULT_ATTEMPTS_WITH_IMAGES: u32 = 6;
/// Default attempt budget for text-only writes
pub const DEFAULT_ATTEMPTS_WITHOUT_IMAGES: u32 = 2;
/// Default linear back-off step between re-fetches
pub const DEFAULT_BACKOFF_STEP: Duration = Duration::from_millis(2000);

/// Client configuration for talking to the directory backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL (e.g., "http://localhost:8080/api")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Re-fetch budget after a write that carried images
    pub attempts_with_images: u32,

    /// Re-fetch budget after a text-only write
    pub attempts_without_images: u32,

    /// Attempt `n` waits `(n - 1) * backoff_step` before firing
    pub backoff_step: Duration,
}

impl ClientConfig {
    /// Create a new client configuration with default budgets
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: 30,
            attempts_with_images: DEFAULT_ATTEMPTS_WITH_IMAGES,
            attempts_without_images: DEFAULT_ATTEMPTS_WITHOUT_IMAGES,
            backoff_step: DEFAULT_BACKOFF_STEP,
        }
    }

    /// Load configuration from the environment (and a `.env` file if present)
    ///
    /// - `VITRINA_API_URL`: base URL
    /// - `VITRINA_TIMEOUT_SECS`: request timeout
    /// - `VITRINA_BACKOFF_STEP_MS`: reconciliation back-off step
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let mut config = Self::new(
            std::env::var("VITRINA_API_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| Self::default().base_url),
        );
        if let Some(timeout) = std::env::var("VITRINA_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.timeout = timeout;
        }
        if let Some(step) = std::env::var("VITRINA_BACKOFF_STEP_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.backoff_step = Duration::from_millis(step);
        }
        config
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set both reconciliation budgets
    pub fn with_reconcile_attempts(mut self, with_images: u32, without_images: u32) -> Self {
        self.attempts_with_images = with_images.max(1);
        self.attempts_without_images = without_images.max(1);
        self
    }

    /// Set the back-off step
    pub fn with_backoff_step(mut self, step: Duration) -> Self {
        self.backoff_step = step;
        self
    }

    /// Attempt budget for a write
    pub fn attempt_budget(&self, images_written: bool) -> u32 {
        if images_written {
            self.attempts_with_images
        } else {
            self.attempts_without_images
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080/api")
    }
}
