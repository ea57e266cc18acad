use crate::{RateProvider, RateSnapshot};
use async_trait::async_trait;
use common::{
    models::{CurrencyCode, SnapshotQualifier},
    Error, Result,
};
use tracing::debug;

/// jsDelivr-hosted daily snapshots of the free currency-api by fawazahmed0.
pub const DEFAULT_URL_TEMPLATE: &str =
    "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@{qualifier}/v1/currencies/{base}.json";

const QUALIFIER_PLACEHOLDER: &str = "{qualifier}";
const BASE_PLACEHOLDER: &str = "{base}";

/// Client for a currency-api style provider serving one JSON file per base
/// currency per daily snapshot.
pub struct CurrencyApiConnector {
    client: reqwest::Client,
    url_template: String,
}

impl CurrencyApiConnector {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
        }
    }

    /// Use a different provider root. The template must contain both the
    /// `{qualifier}` and `{base}` placeholders.
    pub fn with_template(template: impl Into<String>) -> Result<Self> {
        let url_template = template.into();
        for placeholder in [QUALIFIER_PLACEHOLDER, BASE_PLACEHOLDER] {
            if !url_template.contains(placeholder) {
                return Err(Error::ConfigError(format!(
                    "URL template '{}' is missing the {} placeholder",
                    url_template, placeholder
                )));
            }
        }

        Ok(Self {
            client: reqwest::Client::new(),
            url_template,
        })
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn snapshot_url(&self, qualifier: SnapshotQualifier, base: &CurrencyCode) -> String {
        self.url_template
            .replace(QUALIFIER_PLACEHOLDER, &qualifier.to_string())
            .replace(BASE_PLACEHOLDER, base.as_str())
    }
}

impl Default for CurrencyApiConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateProvider for CurrencyApiConnector {
    async fn get_snapshot(
        &self,
        qualifier: SnapshotQualifier,
        base: &CurrencyCode,
    ) -> Result<RateSnapshot> {
        let url = self.snapshot_url(qualifier, base);

        debug!("Fetching {} snapshot for {} from {}", qualifier, base, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Error::HttpError)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ProviderError {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            Error::ParseError(format!("Failed to parse currency-api response: {}", e))
        })?;

        Ok(RateSnapshot::from_json(base.clone(), body))
    }
}
