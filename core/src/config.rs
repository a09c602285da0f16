//! Client configuration: base URL and per-request timeout.

use std::time::Duration;

use url::Url;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub const ENV_BASE_URL: &str = "COINGECKO_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "COINGECKO_TIMEOUT_SECS";

/// Immutable settings a `CoinGeckoClient` is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Defaults overlaid with `COINGECKO_API_URL` and `COINGECKO_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let mut config = Self::default();
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: f64 = raw
                .trim()
                .parse()
                .map_err(|_| ApiError::InvalidConfig(format!("{ENV_TIMEOUT_SECS}={raw:?} is not a number")))?;
            config.timeout = Duration::try_from_secs_f64(secs)
                .map_err(|e| ApiError::InvalidConfig(format!("{ENV_TIMEOUT_SECS}={raw:?}: {e}")))?;
        }
        Ok(config)
    }

    /// Check the settings and return them with the base URL normalized to end
    /// in `/`, so relative routes resolve beneath its path.
    pub(crate) fn validated(mut self) -> Result<Self, ApiError> {
        let parsed = Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidConfig(format!("base URL {:?}: {e}", self.base_url)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidConfig(format!(
                "base URL {:?} must use http or https",
                self.base_url
            )));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(ApiError::InvalidConfig(format!(
                "base URL {:?} must not carry a query or fragment",
                self.base_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(ApiError::InvalidConfig("timeout must be non-zero".to_string()));
        }
        if !self.base_url.ends_with('/') {
            self.base_url.push('/');
        }
        Ok(self)
    }
}
