use crate::FetcherConfig;
use chrono::{Local, NaiveDate};
use common::{
    models::{CurrencyPair, DateRange, DayOutcome, GapReason, RatePoint, RateSeries, SnapshotQualifier},
    Error, Result,
};
use connectors::{currency_api::CurrencyApiConnector, RateProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Builds a rate series by asking the provider for one snapshot per calendar
/// day, strictly in date order.
pub struct DailyRateFetcher {
    provider: Arc<dyn RateProvider>,
    throttle: Duration,
}

impl DailyRateFetcher {
    pub fn new(provider: Arc<dyn RateProvider>) -> Self {
        Self {
            provider,
            throttle: FetcherConfig::default().throttle,
        }
    }

    /// Fetcher backed by the currency-api connector described by `config`
    pub fn from_config(config: &FetcherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let connector =
            CurrencyApiConnector::with_template(config.url_template.clone())?.with_client(client);

        Ok(Self::new(Arc::new(connector)).with_throttle(config.throttle))
    }

    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Rates for `pair` on every day of `range` that the provider has data for.
    ///
    /// "Today" is the local calendar date, read once before the first request.
    pub async fn fetch_series(&self, pair: &CurrencyPair, range: DateRange) -> Result<RateSeries> {
        let today = Local::now().date_naive();
        self.fetch_series_as_of(pair, range, today).await
    }

    /// Same as [`fetch_series`](Self::fetch_series) with an explicit "today".
    ///
    /// The day equal to `today` is read from the provider's `latest` snapshot,
    /// every other day from its frozen dated snapshot.
    pub async fn fetch_series_as_of(
        &self,
        pair: &CurrencyPair,
        range: DateRange,
        today: NaiveDate,
    ) -> Result<RateSeries> {
        debug!(
            "Fetching {} rates from {} to {} (today: {})",
            pair, range.start, range.end, today
        );

        let mut outcomes = Vec::new();
        for date in range.days() {
            let outcome = self.fetch_day(pair, date, today).await;
            if let DayOutcome::Gap { date, reason } = &outcome {
                warn!("No {} rate for {}: {}", pair, date, reason);
            }
            outcomes.push(outcome);

            if !self.throttle.is_zero() {
                tokio::time::sleep(self.throttle).await;
            }
        }

        let requested = outcomes.len();
        match RateSeries::from_outcomes(outcomes) {
            Ok(series) => {
                info!(
                    "Fetched {} of {} daily {} rates",
                    series.len(),
                    requested,
                    pair
                );
                Ok(series)
            }
            Err(err) => {
                warn!(
                    "None of the {} days from {} to {} had a {} rate",
                    requested, range.start, range.end, pair
                );
                Err(err)
            }
        }
    }

    /// Convenience for the default TWD/JPY pair
    pub async fn fetch_default_pair_series(&self, range: DateRange) -> Result<RateSeries> {
        self.fetch_series(&CurrencyPair::default(), range).await
    }

    async fn fetch_day(&self, pair: &CurrencyPair, date: NaiveDate, today: NaiveDate) -> DayOutcome {
        let qualifier = SnapshotQualifier::for_date(date, today);

        match self.provider.get_snapshot(qualifier, &pair.base).await {
            Ok(snapshot) => {
                if let Some(stamped) = snapshot.date {
                    debug!("{} snapshot for {} is stamped {}", qualifier, date, stamped);
                }
                match snapshot.rate(&pair.quote) {
                    Some(rate) => DayOutcome::Point(RatePoint::new(date, rate)),
                    None => DayOutcome::Gap {
                        date,
                        reason: GapReason::MissingQuote,
                    },
                }
            }
            Err(err) => DayOutcome::Gap {
                date,
                reason: gap_reason(err),
            },
        }
    }
}

fn gap_reason(err: Error) -> GapReason {
    match err {
        Error::ProviderError { status, .. } => GapReason::Status(status),
        Error::HttpError(e) => match e.status() {
            Some(status) => GapReason::Status(status.as_u16()),
            None => GapReason::Transport(e.to_string()),
        },
        Error::ParseError(msg) => GapReason::Malformed(msg),
        other => GapReason::Transport(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::models::CurrencyCode;
    use connectors::RateSnapshot;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;

    enum Reply {
        Body(Value),
        Status(u16),
        Garbage,
    }

    /// Serves canned replies keyed by qualifier and records every request.
    struct StubProvider {
        replies: HashMap<SnapshotQualifier, Reply>,
        requests: Mutex<Vec<(SnapshotQualifier, String)>>,
    }

    impl StubProvider {
        fn new(replies: Vec<(SnapshotQualifier, Reply)>) -> Arc<Self> {
            Arc::new(Self {
                replies: replies.into_iter().collect(),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<(SnapshotQualifier, String)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RateProvider for StubProvider {
        async fn get_snapshot(
            &self,
            qualifier: SnapshotQualifier,
            base: &CurrencyCode,
        ) -> Result<RateSnapshot> {
            self.requests
                .lock()
                .unwrap()
                .push((qualifier, base.as_str().to_string()));

            match self.replies.get(&qualifier) {
                Some(Reply::Body(body)) => Ok(RateSnapshot::from_json(base.clone(), body.clone())),
                Some(Reply::Status(status)) => Err(Error::ProviderError {
                    status: *status,
                    body: String::new(),
                }),
                Some(Reply::Garbage) => Err(Error::ParseError("expected value at line 1".into())),
                None => Err(Error::ProviderError {
                    status: 404,
                    body: "Not Found".into(),
                }),
            }
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn on(s: &str) -> SnapshotQualifier {
        SnapshotQualifier::Date(date(s))
    }

    fn fetcher(provider: Arc<StubProvider>) -> DailyRateFetcher {
        DailyRateFetcher::new(provider).with_throttle(Duration::ZERO)
    }

    fn twd_jpy() -> CurrencyPair {
        CurrencyPair::new("TWD", "JPY").unwrap()
    }

    #[tokio::test]
    async fn skips_failed_days_and_reads_today_from_latest() {
        let provider = StubProvider::new(vec![
            (on("2024-01-01"), Reply::Body(json!({ "twd": { "jpy": 4.5 } }))),
            (on("2024-01-02"), Reply::Status(500)),
            (SnapshotQualifier::Latest, Reply::Body(json!({ "twd": { "jpy": 4.6 } }))),
        ]);
        let range = DateRange::new(date("2024-01-01"), date("2024-01-03"));

        let series = fetcher(provider.clone())
            .fetch_series_as_of(&twd_jpy(), range, date("2024-01-03"))
            .await
            .unwrap();

        assert_eq!(
            series.points(),
            &[
                RatePoint { date: date("2024-01-01"), value: 4.5 },
                RatePoint { date: date("2024-01-03"), value: 4.6 },
            ]
        );
        assert_eq!(
            serde_json::to_value(&series).unwrap(),
            json!([
                { "date": "2024-01-01", "value": 4.5 },
                { "date": "2024-01-03", "value": 4.6 },
            ])
        );
        assert_eq!(
            provider.requests(),
            vec![
                (on("2024-01-01"), "twd".to_string()),
                (on("2024-01-02"), "twd".to_string()),
                (SnapshotQualifier::Latest, "twd".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn missing_quote_everywhere_is_unavailable() {
        let provider = StubProvider::new(vec![
            (on("2024-01-01"), Reply::Body(json!({ "twd": { "usd": 0.03 } }))),
            (on("2024-01-02"), Reply::Body(json!({ "twd": { "usd": 0.03 } }))),
        ]);
        let range = DateRange::new(date("2024-01-01"), date("2024-01-02"));

        let err = fetcher(provider.clone())
            .fetch_series_as_of(&twd_jpy(), range, date("2024-06-01"))
            .await
            .unwrap_err();

        assert!(err.is_data_unavailable());
        assert_eq!(err.to_string(), "no rate data available");
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn every_day_failing_is_unavailable() {
        let provider = StubProvider::new(vec![
            (on("2024-01-01"), Reply::Status(503)),
            (on("2024-01-02"), Reply::Garbage),
        ]);
        let range = DateRange::new(date("2024-01-01"), date("2024-01-03"));

        let err = fetcher(provider.clone())
            .fetch_series_as_of(&twd_jpy(), range, date("2024-06-01"))
            .await
            .unwrap_err();

        assert!(err.is_data_unavailable());
        // No retries: exactly one attempt per day.
        assert_eq!(provider.requests().len(), 3);
    }

    #[tokio::test]
    async fn points_are_rounded_sorted_and_within_range() {
        let provider = StubProvider::new(vec![
            (on("2024-02-28"), Reply::Body(json!({ "twd": { "jpy": 4.7123456789 } }))),
            (on("2024-02-29"), Reply::Body(json!({ "twd": { "jpy": 0 } }))),
            (on("2024-03-01"), Reply::Body(json!({ "twd": { "jpy": "4.69999951" } }))),
            (on("2024-03-02"), Reply::Body(json!({ "jpy": { "twd": 0.21 } }))),
            (on("2024-03-03"), Reply::Body(json!({ "twd": { "jpy": 4.0000004 } }))),
        ]);
        let range = DateRange::new(date("2024-02-28"), date("2024-03-03"));

        let series = fetcher(provider)
            .fetch_series_as_of(&twd_jpy(), range, date("2024-06-01"))
            .await
            .unwrap();

        let values: Vec<_> = series.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![4.712346, 4.7, 4.0]);

        let dates: Vec<_> = series.iter().map(|p| p.date).collect();
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
        assert!(dates.iter().all(|d| range.contains(*d)));
    }

    #[tokio::test]
    async fn today_outside_range_never_requests_latest() {
        let provider = StubProvider::new(vec![
            (on("2023-12-30"), Reply::Body(json!({ "twd": { "jpy": 4.55 } }))),
            (on("2023-12-31"), Reply::Body(json!({ "twd": { "jpy": 4.56 } }))),
        ]);
        let range = DateRange::new(date("2023-12-30"), date("2023-12-31"));

        fetcher(provider.clone())
            .fetch_series_as_of(&twd_jpy(), range, date("2024-01-03"))
            .await
            .unwrap();

        assert!(provider
            .requests()
            .iter()
            .all(|(qualifier, _)| *qualifier != SnapshotQualifier::Latest));
    }

    #[tokio::test]
    async fn inverted_range_makes_no_requests() {
        let provider = StubProvider::new(vec![]);
        let range = DateRange::new(date("2024-01-03"), date("2024-01-01"));

        let err = fetcher(provider.clone())
            .fetch_series_as_of(&twd_jpy(), range, date("2024-01-03"))
            .await
            .unwrap_err();

        assert!(err.is_data_unavailable());
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn default_pair_queries_twd_for_jpy() {
        let today = Local::now().date_naive();
        let provider = StubProvider::new(vec![(
            SnapshotQualifier::Latest,
            Reply::Body(json!({ "twd": { "jpy": 4.8, "usd": 0.031 } })),
        )]);

        let series = fetcher(provider.clone())
            .fetch_default_pair_series(DateRange::new(today, today))
            .await
            .unwrap();

        assert_eq!(series.points(), &[RatePoint { date: today, value: 4.8 }]);
        assert_eq!(
            provider.requests(),
            vec![(SnapshotQualifier::Latest, "twd".to_string())]
        );
    }

    #[tokio::test]
    async fn pauses_between_days() {
        let provider = StubProvider::new(vec![]);
        let range = DateRange::new(date("2024-01-01"), date("2024-01-03"));
        let fetcher = DailyRateFetcher::new(provider).with_throttle(Duration::from_millis(20));

        let started = tokio::time::Instant::now();
        let _ = fetcher
            .fetch_series_as_of(&twd_jpy(), range, date("2024-06-01"))
            .await;

        assert!(started.elapsed() >= Duration::from_millis(60));
    }

    #[test]
    fn gap_reasons_follow_error_kind() {
        assert_eq!(
            gap_reason(Error::ProviderError {
                status: 500,
                body: String::new()
            }),
            GapReason::Status(500)
        );
        assert!(matches!(
            gap_reason(Error::ParseError("eof".into())),
            GapReason::Malformed(_)
        ));
    }
}
