//! Volatility computer: prices to returns to rolling std-dev.

use crate::domain::{
    Observation, PriceSeries, ReturnSeries, Symbol, SymbolResult, VolatilitySeries, WindowSize,
};

use super::returns::simple_returns;
use super::rolling_std::RollingStdDev;

/// Pure transform from a normalized price series to return and volatility series.
#[derive(Debug, Clone)]
pub struct VolatilityComputer {
    rolling: RollingStdDev,
}

impl VolatilityComputer {
    pub fn new(window: WindowSize) -> Self {
        Self {
            rolling: RollingStdDev::new(window),
        }
    }

    pub fn window(&self) -> usize {
        self.rolling.period()
    }

    /// Returns and their rolling sample std-dev, both `len(prices) - 1` long.
    pub fn compute(&self, prices: &PriceSeries) -> (ReturnSeries, VolatilitySeries) {
        let returns = simple_returns(prices);
        let std = self.rolling.compute(&returns.values());
        let volatility = returns
            .iter()
            .zip(std)
            .map(|(r, v)| Observation::new(r.timestamp, v))
            .collect();
        (returns, volatility)
    }

    /// Compute and bundle everything for one symbol.
    pub fn run(&self, symbol: Symbol, prices: PriceSeries) -> SymbolResult {
        let (returns, volatility) = self.compute(&prices);
        SymbolResult {
            symbol,
            prices,
            returns,
            volatility,
        }
    }
}

/// Shorthand for `VolatilityComputer::new(window).compute(prices)`.
pub fn compute(prices: &PriceSeries, window: WindowSize) -> (ReturnSeries, VolatilitySeries) {
    VolatilityComputer::new(window).compute(prices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, price_series, DEFAULT_EPSILON};

    fn closes_from_returns(start: f64, returns: &[f64]) -> Vec<Option<f64>> {
        let mut out = vec![Some(start)];
        let mut p = start;
        for r in returns {
            p *= 1.0 + r;
            out.push(Some(p));
        }
        out
    }

    #[test]
    fn lengths_follow_price_series() {
        let prices = price_series(&[Some(1.0), Some(1.1), Some(1.2), Some(1.3)]);
        let (r, v) = compute(&prices, WindowSize::new(2).unwrap());
        assert_eq!(r.len(), 3);
        assert_eq!(v.len(), 3);
        assert_eq!(r.timestamps(), v.timestamps());
    }

    #[test]
    fn empty_prices_give_empty_outputs() {
        let (r, v) = compute(&price_series(&[]), WindowSize::DEFAULT);
        assert!(r.is_empty());
        assert!(v.is_empty());
    }

    #[test]
    fn end_to_end_matches_reference_vector() {
        let returns = [0.01, -0.02, 0.015, 0.0, 0.005, -0.01, 0.02, 0.0];
        let prices = price_series(&closes_from_returns(100.0, &returns));
        let (r, v) = compute(&prices, WindowSize::DEFAULT);

        for (got, want) in r.values().iter().zip(returns) {
            assert_approx(got.unwrap(), want, 1e-12);
        }
        let expected = (0.0012_f64 / 7.0).sqrt();
        assert_approx(v.last_value().unwrap(), expected, 1e-9);
        assert_eq!(v.defined_count(), 1);
    }

    #[test]
    fn gap_in_prices_leaves_trailing_value_missing() {
        let mut closes = closes_from_returns(50.0, &[0.01; 10]);
        closes[9] = None;
        let (_, v) = compute(&price_series(&closes), WindowSize::new(3).unwrap());
        assert_eq!(v.last_value(), None);
    }

    #[test]
    fn run_bundles_inputs_and_outputs() {
        let prices = price_series(&[Some(10.0), Some(11.0), Some(12.1)]);
        let result = VolatilityComputer::new(WindowSize::new(2).unwrap())
            .run(Symbol::from("ETHUSDT"), prices.clone());
        assert_eq!(result.symbol, Symbol::from("ETHUSDT"));
        assert_eq!(result.prices, prices);
        // equal returns → zero dispersion
        assert_approx(result.latest_volatility().unwrap(), 0.0, DEFAULT_EPSILON);
    }
}
