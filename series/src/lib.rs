mod config;
mod fetcher;

pub use config::FetcherConfig;
pub use fetcher::DailyRateFetcher;

use chrono::NaiveDate;
use common::{
    models::{CurrencyPair, DateRange, RateSeries},
    Error, Result,
};
use tracing::error;

/// Daily `quote`-per-`base` rates from `start` to `end` inclusive.
///
/// Days the provider cannot serve are left out. The only error ever returned
/// is [`Error::DataUnavailable`]; anything else that goes wrong is logged and
/// reported as that.
pub async fn fetch_series(
    base: &str,
    quote: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<RateSeries> {
    try_fetch_series(base, quote, DateRange::new(start, end))
        .await
        .map_err(unavailable)
}

async fn try_fetch_series(base: &str, quote: &str, range: DateRange) -> Result<RateSeries> {
    let pair = CurrencyPair::new(base, quote)?;
    let fetcher = DailyRateFetcher::from_config(&FetcherConfig::from_env()?)?;
    fetcher.fetch_series(&pair, range).await
}

/// [`fetch_series`] for the default TWD/JPY pair.
pub async fn fetch_default_pair_series(start: NaiveDate, end: NaiveDate) -> Result<RateSeries> {
    let pair = CurrencyPair::default();
    fetch_series(pair.base.as_str(), pair.quote.as_str(), start, end).await
}

/// Collapses any failure into the single user-facing error, keeping the cause in the log.
pub fn unavailable(err: Error) -> Error {
    if !err.is_data_unavailable() {
        error!("Rate series fetch failed: {}", err);
    }
    Error::DataUnavailable
}
