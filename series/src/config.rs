use common::{Error, Result};
use connectors::currency_api::DEFAULT_URL_TEMPLATE;
use std::time::Duration;

/// Configuration for the daily rate fetcher
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Provider URL with `{qualifier}` and `{base}` placeholders
    pub url_template: String,
    /// Pause after each day, keeps the request rate polite for the free provider
    pub throttle: Duration,
    /// Per-request timeout for the HTTP client
    pub request_timeout: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            throttle: Duration::from_millis(50),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl FetcherConfig {
    /// Create a fetcher configuration from environment variables, falling back
    /// to the defaults for anything unset
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let url_template = lookup("RATES_URL_TEMPLATE").unwrap_or(defaults.url_template);

        let throttle = match lookup("RATES_THROTTLE_MS") {
            Some(ms) => Duration::from_millis(parse_number("RATES_THROTTLE_MS", &ms)?),
            None => defaults.throttle,
        };

        let request_timeout = match lookup("RATES_REQUEST_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(parse_number("RATES_REQUEST_TIMEOUT_SECS", &secs)?),
            None => defaults.request_timeout,
        };

        Ok(Self {
            url_template,
            throttle,
            request_timeout,
        })
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value.trim().parse().map_err(|_| {
        Error::ConfigError(format!("{} must be a whole number, got '{}'", key, value))
    })
}
