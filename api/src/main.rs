mod config;
mod handler;

use axum::{routing::get, Router};
use config::ApiConfig;
use series::{DailyRateFetcher, FetcherConfig};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting RateLizard API");

    // Load configuration from environment
    let api_config = ApiConfig::from_env();
    let fetcher_config = FetcherConfig::from_env()
        .map_err(|e| format!("Failed to load fetcher configuration: {}", e))?;

    let fetcher = DailyRateFetcher::from_config(&fetcher_config)
        .map_err(|e| format!("Failed to create rate fetcher: {}", e))?;

    let app = app(Arc::new(fetcher));

    let addr = api_config.bind_addr()?;
    info!("Listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

fn app(fetcher: Arc<DailyRateFetcher>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handler::health))
        .route("/api/v1/rates/default", get(handler::get_default_pair_rates))
        .route("/api/v1/rates/:base/:quote", get(handler::get_pair_rates))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(fetcher)
}
