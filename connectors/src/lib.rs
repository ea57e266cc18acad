pub mod currency_api;
pub mod snapshot;

use async_trait::async_trait;
use common::{
    models::{CurrencyCode, SnapshotQualifier},
    Result,
};

pub use snapshot::RateSnapshot;

/// Trait defining the interface for daily-snapshot rate providers
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Get every rate the provider publishes for `base` in the given snapshot.
    ///
    /// A transport fault or a non-success status is an error; a snapshot that
    /// simply lacks some currency is not.
    async fn get_snapshot(
        &self,
        qualifier: SnapshotQualifier,
        base: &CurrencyCode,
    ) -> Result<RateSnapshot>;
}
