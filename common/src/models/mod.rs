mod currency;
mod rate;

pub use currency::{CurrencyCode, CurrencyPair};
pub use rate::{
    round_rate, DateRange, DayOutcome, GapReason, RatePoint, RateSeries, SnapshotQualifier,
};
