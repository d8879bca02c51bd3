//! Simple (percentage-change) returns.
//!
//! `r[i] = p[i+1] / p[i] - 1`, stamped with the later price's timestamp.
//! Output length is `len(prices) - 1` (empty for fewer than two prices).
//! Missing if either price is missing or the ratio is not finite.

use crate::domain::{Observation, PriceSeries, ReturnSeries};

pub fn simple_returns(prices: &PriceSeries) -> ReturnSeries {
    prices
        .points()
        .windows(2)
        .map(|pair| {
            let value = match (pair[0].value, pair[1].value) {
                (Some(prev), Some(curr)) => Some(curr / prev - 1.0).filter(|r| r.is_finite()),
                _ => None,
            };
            Observation::new(pair[1].timestamp, value)
        })
        .collect()
}
