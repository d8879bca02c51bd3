//! Return and rolling-volatility computations.
//!
//! All inputs and outputs use `Option<f64>` for missing values. Missing data
//! propagates forward through every window that touches it; nothing here
//! returns an error.

pub mod returns;
pub mod rolling_std;
pub mod volatility;

pub use returns::simple_returns;
pub use rolling_std::{sample_std_dev, RollingStdDev};
pub use volatility::{compute, VolatilityComputer};

/// Price series from closes, one minute apart starting at the epoch.
#[cfg(test)]
pub fn price_series(closes: &[Option<f64>]) -> crate::domain::PriceSeries {
    use chrono::{Duration, TimeZone, Utc};
    let base = Utc.timestamp_millis_opt(0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            crate::domain::Observation::new(base + Duration::minutes(i as i64), close)
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
