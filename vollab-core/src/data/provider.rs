//! Kline provider trait, raw candle records and structured fetch errors.
//!
//! The KlineProvider trait abstracts over price-data sources so the batch
//! pipeline can run against Bybit in production and an in-memory provider in
//! tests.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::domain::{MarketCategory, Resolution, Symbol};

/// One kline as delivered by the provider, before any parsing.
///
/// Wire form is a 7-element array
/// `[timestamp_ms, open, high, low, close, volume, quote_volume]`. Elements may
/// arrive as strings or JSON numbers; both are kept verbatim as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCandle {
    #[serde(deserialize_with = "de_text")]
    pub timestamp_ms: String,
    #[serde(deserialize_with = "de_text")]
    pub open: String,
    #[serde(deserialize_with = "de_text")]
    pub high: String,
    #[serde(deserialize_with = "de_text")]
    pub low: String,
    #[serde(deserialize_with = "de_text")]
    pub close: String,
    #[serde(deserialize_with = "de_text")]
    pub volume: String,
    #[serde(deserialize_with = "de_text")]
    pub quote_volume: String,
}

impl RawCandle {
    /// Candle with only timestamp and close populated; the other fields are empty.
    pub fn from_close(timestamp_ms: i64, close: impl Into<String>) -> Self {
        Self {
            timestamp_ms: timestamp_ms.to_string(),
            open: String::new(),
            high: String::new(),
            low: String::new(),
            close: close.into(),
            volume: String::new(),
            quote_volume: String::new(),
        }
    }
}

fn de_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Text::deserialize(deserializer)? {
        Text::Str(s) => s,
        Text::Int(i) => i.to_string(),
        Text::Float(f) => f.to_string(),
    })
}

/// Why a fetch for one symbol failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchCause {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("provider rejected request (code {code}): {message}")]
    ProviderRejected { code: i64, message: String },

    #[error("response format changed: {0}")]
    MalformedResponse(String),

    #[error("no data returned from provider")]
    EmptyData,
}

/// A failed fetch, tagged with the symbol it was for.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("error fetching data for {symbol}: {cause}")]
pub struct FetchError {
    pub symbol: Symbol,
    pub cause: FetchCause,
}

impl FetchError {
    pub fn new(symbol: Symbol, cause: FetchCause) -> Self {
        Self { symbol, cause }
    }
}

/// Absolute `[start, end]` lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Window covering the `hours_ago` hours before `end`.
    pub fn ending_at(end: DateTime<Utc>, hours_ago: u32) -> Self {
        Self {
            start: end - Duration::hours(i64::from(hours_ago)),
            end,
        }
    }

    pub fn start_ms(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_ms(&self) -> i64 {
        self.end.timestamp_millis()
    }
}

/// Parameters of a single kline request.
#[derive(Debug, Clone, PartialEq)]
pub struct KlineRequest {
    pub symbol: Symbol,
    pub category: MarketCategory,
    pub resolution: Resolution,
    pub window: TimeWindow,
}

impl KlineRequest {
    /// Upper bound on candles the window can hold at this resolution.
    pub fn expected_candles(&self) -> i64 {
        let minutes = (self.window.end - self.window.start).num_minutes();
        minutes / i64::from(self.resolution.minutes()) + 1
    }
}

/// Trait for kline sources.
///
/// One call is one read-only request. Implementations must not retry and must
/// bound the time they block.
pub trait KlineProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch raw candles for the request window. Order is provider-defined.
    fn fetch_window(&self, request: &KlineRequest) -> Result<Vec<RawCandle>, FetchCause>;
}
