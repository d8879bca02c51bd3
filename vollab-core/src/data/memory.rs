//! In-memory kline provider and synthetic candle generator.
//!
//! Used by tests, benchmarks and offline demos. Each symbol is mapped to a
//! canned reply; unknown symbols fail the way Bybit does for unsupported
//! tickers.

use std::collections::HashMap;

use super::provider::{FetchCause, KlineProvider, KlineRequest, RawCandle};

#[derive(Debug, Default)]
pub struct InMemoryProvider {
    replies: HashMap<String, Result<Vec<RawCandle>, FetchCause>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candles(mut self, symbol: &str, candles: Vec<RawCandle>) -> Self {
        self.replies.insert(symbol.to_string(), Ok(candles));
        self
    }

    pub fn with_failure(mut self, symbol: &str, cause: FetchCause) -> Self {
        self.replies.insert(symbol.to_string(), Err(cause));
        self
    }

    /// Candles built from close strings, one `step_ms` apart starting at `start_ms`.
    pub fn with_closes(self, symbol: &str, start_ms: i64, step_ms: i64, closes: &[&str]) -> Self {
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, close)| RawCandle::from_close(start_ms + step_ms * i as i64, *close))
            .collect();
        self.with_candles(symbol, candles)
    }
}

impl KlineProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn fetch_window(&self, request: &KlineRequest) -> Result<Vec<RawCandle>, FetchCause> {
        match self.replies.get(request.symbol.as_str()) {
            Some(reply) => reply.clone(),
            None => Err(FetchCause::ProviderRejected {
                code: 10001,
                message: "Not supported symbols".into(),
            }),
        }
    }
}

/// Deterministic candles in provider order (newest first), `count` buckets of
/// `step_ms` ending at `end_ms`. Prices follow a sine wave around `base`.
pub fn synthetic_candles(count: usize, end_ms: i64, step_ms: i64, base: f64) -> Vec<RawCandle> {
    (0..count)
        .map(|i| {
            let ts = end_ms - step_ms * i as i64;
            let close = base * (1.0 + 0.01 * ((count - i) as f64 * 0.7).sin());
            let open = close * 0.999;
            RawCandle {
                timestamp_ms: ts.to_string(),
                open: format!("{open:.6}"),
                high: format!("{:.6}", close * 1.002),
                low: format!("{:.6}", open * 0.998),
                close: format!("{close:.6}"),
                volume: "1000".into(),
                quote_volume: format!("{:.2}", close * 1000.0),
            }
        })
        .collect()
}
