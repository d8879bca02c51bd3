//! Series normalizer: raw candles to an ascending, deduplicated close series.
//!
//! Steps:
//! 1. Parse timestamp (integer ms) and close (`f64`) from each candle.
//!    Unparseable timestamps are dropped; unparseable or non-finite closes
//!    become missing values.
//! 2. Stable sort by timestamp ascending. Provider order is never trusted.
//! 3. Drop repeated timestamps, keeping the first occurrence.
//!
//! This stage never fails.

use chrono::{TimeZone, Utc};

use super::provider::RawCandle;
use crate::domain::{Observation, PriceSeries};

/// Convert raw candles into a [`PriceSeries`].
pub fn normalize(raw: &[RawCandle]) -> PriceSeries {
    let mut rows: Vec<(i64, Option<f64>)> = Vec::with_capacity(raw.len());
    let mut dropped = 0usize;

    for candle in raw {
        match candle.timestamp_ms.trim().parse::<i64>() {
            Ok(ts) => rows.push((ts, parse_close(&candle.close))),
            Err(_) => dropped += 1,
        }
    }

    rows.sort_by_key(|(ts, _)| *ts);
    rows.dedup_by_key(|(ts, _)| *ts);

    let series: PriceSeries = rows
        .into_iter()
        .filter_map(|(ts, close)| match Utc.timestamp_millis_opt(ts).single() {
            Some(timestamp) => Some(Observation::new(timestamp, close)),
            None => {
                dropped += 1;
                None
            }
        })
        .collect();

    if dropped > 0 {
        tracing::debug!(dropped, kept = series.len(), "dropped candles with unusable timestamps");
    }

    series
}

fn parse_close(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
