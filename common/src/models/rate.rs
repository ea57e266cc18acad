use crate::Error;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const RATE_DECIMALS: i32 = 6;

/// Rounds a provider rate to 6 decimal places, ties away from zero.
pub fn round_rate(raw: f64) -> f64 {
    let scale = 10f64.powi(RATE_DECIMALS);
    (raw * scale).round() / scale
}

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Every date from `start` to `end`, ascending. Empty when `start > end`.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// Path segment selecting which provider snapshot to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotQualifier {
    /// The floating alias, the only place the current day is published
    Latest,
    /// A frozen historical snapshot
    Date(NaiveDate),
}

impl SnapshotQualifier {
    pub fn for_date(date: NaiveDate, today: NaiveDate) -> Self {
        if date == today {
            SnapshotQualifier::Latest
        } else {
            SnapshotQualifier::Date(date)
        }
    }
}

impl std::fmt::Display for SnapshotQualifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotQualifier::Latest => write!(f, "latest"),
            SnapshotQualifier::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

/// One quote-per-base conversion factor on a given day
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RatePoint {
    /// Serialized as "YYYY-MM-DD"
    pub date: NaiveDate,
    /// Rate rounded to 6 decimal places
    pub value: f64,
}

impl RatePoint {
    pub fn new(date: NaiveDate, raw_rate: f64) -> Self {
        Self {
            date,
            value: round_rate(raw_rate),
        }
    }
}

/// Why a day contributed nothing to a series
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GapReason {
    /// The request never produced a response
    Transport(String),
    /// The provider answered with a non-success status
    Status(u16),
    /// The body was not the expected JSON shape
    Malformed(String),
    /// The snapshot has no usable rate for the quote currency
    MissingQuote,
}

impl std::fmt::Display for GapReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GapReason::Transport(msg) => write!(f, "transport error: {}", msg),
            GapReason::Status(status) => write!(f, "HTTP {}", status),
            GapReason::Malformed(msg) => write!(f, "malformed response: {}", msg),
            GapReason::MissingQuote => write!(f, "quote currency missing from snapshot"),
        }
    }
}

/// Result of fetching a single day
#[derive(Debug, Clone, PartialEq)]
pub enum DayOutcome {
    Point(RatePoint),
    Gap { date: NaiveDate, reason: GapReason },
}

/// Date-ordered rate points, at most one per date, never empty.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(transparent)]
pub struct RateSeries(Vec<RatePoint>);

impl RateSeries {
    /// Folds per-day outcomes into a series, dropping gaps.
    ///
    /// Fails with [`Error::DataUnavailable`] when no day produced a point.
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = DayOutcome>) -> Result<Self, Error> {
        let points = outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                DayOutcome::Point(point) => Some(point),
                DayOutcome::Gap { .. } => None,
            })
            .collect();
        Self::from_points(points)
    }

    pub fn from_points(mut points: Vec<RatePoint>) -> Result<Self, Error> {
        if points.is_empty() {
            return Err(Error::DataUnavailable);
        }
        // Stable sort keeps the first point seen for a date.
        points.sort_by_key(|point| point.date);
        points.dedup_by_key(|point| point.date);
        Ok(Self(points))
    }

    pub fn points(&self) -> &[RatePoint] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RatePoint> {
        self.0.iter()
    }

    pub fn into_points(self) -> Vec<RatePoint> {
        self.0
    }
}

impl<'a> IntoIterator for &'a RateSeries {
    type Item = &'a RatePoint;
    type IntoIter = std::slice::Iter<'a, RatePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
