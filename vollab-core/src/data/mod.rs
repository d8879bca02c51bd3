//! Kline retrieval and normalization

pub mod bybit;
pub mod fetch;
pub mod memory;
pub mod normalize;
pub mod provider;

pub use bybit::{BybitConfig, BybitProvider};
pub use fetch::SeriesFetcher;
pub use memory::{synthetic_candles, InMemoryProvider};
pub use normalize::normalize;
pub use provider::{FetchCause, FetchError, KlineProvider, KlineRequest, RawCandle, TimeWindow};
