//! Series fetcher: turns `(symbol, hours_ago, resolution)` into a provider call.

use chrono::{DateTime, Utc};

use super::provider::{FetchCause, FetchError, KlineProvider, KlineRequest, RawCandle, TimeWindow};
use crate::domain::{MarketCategory, Resolution, Symbol};

/// Fetches raw candles for one symbol over a recent lookback window.
///
/// "Now" is read from the wall clock on every call, so two symbols in the same
/// batch may see windows that differ by the time between their requests.
pub struct SeriesFetcher<'a> {
    provider: &'a dyn KlineProvider,
    category: MarketCategory,
}

impl<'a> SeriesFetcher<'a> {
    pub fn new(provider: &'a dyn KlineProvider, category: MarketCategory) -> Self {
        Self { provider, category }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Fetch the last `hours_ago` hours of candles ending now.
    pub fn fetch(
        &self,
        symbol: &Symbol,
        hours_ago: u32,
        resolution: Resolution,
    ) -> Result<Vec<RawCandle>, FetchError> {
        self.fetch_at(symbol, hours_ago, resolution, Utc::now())
    }

    /// Same as [`fetch`](Self::fetch) with an explicit end of window.
    pub fn fetch_at(
        &self,
        symbol: &Symbol,
        hours_ago: u32,
        resolution: Resolution,
        now: DateTime<Utc>,
    ) -> Result<Vec<RawCandle>, FetchError> {
        if symbol.is_empty() {
            return Err(FetchError::new(
                symbol.clone(),
                FetchCause::InvalidRequest("symbol is empty".into()),
            ));
        }
        if hours_ago == 0 {
            return Err(FetchError::new(
                symbol.clone(),
                FetchCause::InvalidRequest("hours_ago must be positive".into()),
            ));
        }

        let request = KlineRequest {
            symbol: symbol.clone(),
            category: self.category,
            resolution,
            window: TimeWindow::ending_at(now, hours_ago),
        };

        let candles = self
            .provider
            .fetch_window(&request)
            .map_err(|cause| FetchError::new(symbol.clone(), cause))?;

        // Providers are expected to report this themselves; guard anyway so an
        // empty list can never reach the normalizer as "zero volatility".
        if candles.is_empty() {
            return Err(FetchError::new(symbol.clone(), FetchCause::EmptyData));
        }

        tracing::debug!(
            %symbol,
            provider = self.provider.name(),
            candles = candles.len(),
            "fetched klines"
        );
        Ok(candles)
    }
}
