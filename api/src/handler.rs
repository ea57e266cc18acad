use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use common::{
    models::{CurrencyPair, DateRange, RateSeries},
    Error as CommonError,
};
use serde::{Deserialize, Serialize};
use series::DailyRateFetcher;
use std::sync::Arc;
use tracing::debug;

type SharedFetcher = Arc<DailyRateFetcher>;

// Wrapper so common::Error can be turned into an HTTP response
#[derive(Debug)]
pub struct ApiError(CommonError);

impl From<CommonError> for ApiError {
    fn from(err: CommonError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CommonError::DataUnavailable => StatusCode::NOT_FOUND,
            CommonError::InvalidInput(_) | CommonError::ParseError(_) => StatusCode::BAD_REQUEST,
            CommonError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CommonError::HttpError(_) | CommonError::ProviderError { .. } => StatusCode::BAD_GATEWAY,
        };

        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl RangeQuery {
    fn into_range(self) -> Result<DateRange, CommonError> {
        if self.start > self.end {
            return Err(CommonError::InvalidInput(format!(
                "start {} is after end {}",
                self.start, self.end
            )));
        }
        Ok(DateRange::new(self.start, self.end))
    }
}

pub async fn health() -> &'static str {
    "ok"
}

// Daily rates for an arbitrary pair
pub async fn get_pair_rates(
    State(fetcher): State<SharedFetcher>,
    Path((base, quote)): Path<(String, String)>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<RateSeries>, ApiError> {
    let range = query.into_range()?;
    let pair = CurrencyPair::new(&base, &quote)?;

    debug!("Rate series requested for {} from {} to {}", pair, range.start, range.end);

    let rates = fetcher
        .fetch_series(&pair, range)
        .await
        .map_err(series::unavailable)?;
    Ok(Json(rates))
}

// Daily rates for the default TWD/JPY pair
pub async fn get_default_pair_rates(
    State(fetcher): State<SharedFetcher>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<RateSeries>, ApiError> {
    let range = query.into_range()?;

    let rates = fetcher
        .fetch_default_pair_series(range)
        .await
        .map_err(series::unavailable)?;
    Ok(Json(rates))
}
