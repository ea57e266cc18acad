use chrono::NaiveDate;
use common::models::CurrencyCode;
use serde_json::{Map, Value};

/// Rates published for one base currency in one provider snapshot.
///
/// The provider answers with a body shaped like
/// `{ "date": "2024-03-06", "twd": { "jpy": 4.71, "usd": 0.031, ... } }`.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSnapshot {
    /// Base currency the rates are quoted against
    pub base: CurrencyCode,
    /// Date the provider stamped on the snapshot, if any
    pub date: Option<NaiveDate>,
    rates: Map<String, Value>,
}

impl RateSnapshot {
    /// Extracts the rate table for `base` from a provider body.
    ///
    /// A body without a table for `base` yields an empty snapshot rather than an
    /// error: that is "no data", not a broken response.
    pub fn from_json(base: CurrencyCode, mut body: Value) -> Self {
        let date = body
            .get("date")
            .and_then(|d| d.as_str())
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());

        let rates = match body.get_mut(base.as_str()).map(Value::take) {
            Some(Value::Object(rates)) => rates,
            _ => Map::new(),
        };

        Self { base, date, rates }
    }

    /// The raw rate for `quote`, if the snapshot carries a usable one.
    ///
    /// Missing, null, zero, non-finite and non-numeric entries all count as
    /// absent. Numeric strings are accepted.
    pub fn rate(&self, quote: &CurrencyCode) -> Option<f64> {
        let value = match self.rates.get(quote.as_str())? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };

        if value == 0.0 || !value.is_finite() {
            return None;
        }
        Some(value)
    }

    /// Number of quote currencies in the snapshot
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
