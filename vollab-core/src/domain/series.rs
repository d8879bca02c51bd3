//! Time series with first-class missing values.
//!
//! Prices, returns and rolling volatility all share one shape: an ordered run
//! of `(timestamp, Option<f64>)` observations. `None` marks a value that could
//! not be parsed or derived; it is never encoded as NaN.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Symbol;

/// One timestamped value. `value == None` means missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(timestamp: DateTime<Utc>, value: Option<f64>) -> Self {
        Self { timestamp, value }
    }
}

/// Ordered sequence of observations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSeries {
    points: Vec<Observation>,
}

/// Close prices, strictly ascending by timestamp.
pub type PriceSeries = TimeSeries;
/// Simple returns, one shorter than the price series they came from.
pub type ReturnSeries = TimeSeries;
/// Rolling sample standard deviation of returns, aligned with the return series.
pub type VolatilitySeries = TimeSeries;

impl TimeSeries {
    pub fn new(points: Vec<Observation>) -> Self {
        Self { points }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Observation] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.points.iter()
    }

    /// Raw values, `None` where missing.
    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    /// The final entry's value. `None` if the series is empty or the last entry is missing.
    pub fn last_value(&self) -> Option<f64> {
        self.points.last().and_then(|p| p.value)
    }

    /// Number of defined (non-missing) entries.
    pub fn defined_count(&self) -> usize {
        self.points.iter().filter(|p| p.value.is_some()).count()
    }

    /// True if timestamps strictly increase (which also rules out duplicates).
    pub fn is_strictly_ascending(&self) -> bool {
        self.points
            .windows(2)
            .all(|w| w[0].timestamp < w[1].timestamp)
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl FromIterator<Observation> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// Everything computed for one symbol in one batch pass.
///
/// Built once per successful fetch-and-compute and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolResult {
    pub symbol: Symbol,
    pub prices: PriceSeries,
    pub returns: ReturnSeries,
    pub volatility: VolatilitySeries,
}

impl SymbolResult {
    /// Most recent volatility value, if the last entry is defined.
    pub fn latest_volatility(&self) -> Option<f64> {
        self.volatility.last_value()
    }
}
