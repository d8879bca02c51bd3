//! Rolling sample standard deviation.
//!
//! Trailing window of `period` values, Bessel-corrected (divide by n - 1).
//! Lookback: period - 1 (first defined value at index period - 1).
//! Any missing value inside the window makes that output missing.

use crate::domain::WindowSize;

#[derive(Debug, Clone)]
pub struct RollingStdDev {
    period: usize,
    name: String,
}

impl RollingStdDev {
    pub fn new(window: WindowSize) -> Self {
        let period = window.get();
        Self {
            period,
            name: format!("rolling_std_{period}"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn lookback(&self) -> usize {
        self.period - 1
    }

    /// Output has the same length as `values`.
    pub fn compute(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        let n = values.len();
        let mut result = vec![None; n];

        if n < self.period {
            return result;
        }

        let mut window = Vec::with_capacity(self.period);
        for i in self.lookback()..n {
            window.clear();
            window.extend(values[(i + 1 - self.period)..=i].iter().map_while(|v| *v));
            if window.len() == self.period {
                result[i] = sample_std_dev(&window);
            }
        }

        result
    }
}

/// Sample standard deviation. `None` for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / (n - 1) as f64;
    Some(variance.sqrt())
}
