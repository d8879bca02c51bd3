//! Ranker: orders a batch by latest volatility and places each symbol on a
//! 0..1 scale between the batch minimum and maximum.

use serde::{Deserialize, Serialize};
use vollab_core::domain::Symbol;

use crate::aggregate::BatchResult;

/// Position reported for every entry when all values are equal.
pub const FLAT_POSITION: f64 = 0.5;

/// Display bucket derived from the normalized position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBand {
    Calm,
    Elevated,
    Hot,
}

impl ColorBand {
    pub fn from_position(position: f64) -> Self {
        if position < 1.0 / 3.0 {
            ColorBand::Calm
        } else if position < 2.0 / 3.0 {
            ColorBand::Elevated
        } else {
            ColorBand::Hot
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorBand::Calm => "calm",
            ColorBand::Elevated => "elevated",
            ColorBand::Hot => "hot",
        }
    }
}

/// One row of the ranking, 1-based rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub symbol: Symbol,
    pub value: f64,
    pub normalized_position: f64,
    pub band: ColorBand,
}

/// Rank every symbol in the batch. Ties keep batch (input) order.
pub fn rank(batch: &BatchResult) -> Vec<RankedEntry> {
    rank_values(&batch.latest_values())
}

/// Rank `(symbol, latest)` pairs, highest first.
///
/// The sort is stable, so equal values keep the order they were given in.
pub fn rank_values(values: &[(Symbol, f64)]) -> Vec<RankedEntry> {
    if values.is_empty() {
        return Vec::new();
    }

    let mut order: Vec<&(Symbol, f64)> = values.iter().collect();
    order.sort_by(|a, b| b.1.total_cmp(&a.1));

    let max = order.first().map(|(_, v)| *v).unwrap_or_default();
    let min = order.last().map(|(_, v)| *v).unwrap_or_default();
    let span = max - min;

    order
        .into_iter()
        .enumerate()
        .map(|(i, (symbol, value))| {
            let normalized_position = if span > 0.0 {
                (value - min) / span
            } else {
                FLAT_POSITION
            };
            RankedEntry {
                rank: i + 1,
                symbol: symbol.clone(),
                value: *value,
                normalized_position,
                band: ColorBand::from_position(normalized_position),
            }
        })
        .collect()
}
