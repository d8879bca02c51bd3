//! VolLab Runner: batch orchestration on top of `vollab-core`.
//!
//! - TOML configuration and config fingerprinting
//! - Per-symbol fan-out on a bounded worker pool with failure isolation
//! - Reload guard that discards superseded batches
//! - Ranking with normalized positions
//! - CSV / JSON export and persisted watchlists

pub mod aggregate;
pub mod config;
pub mod export;
pub mod rank;
pub mod reload;
pub mod watchlist;

pub use aggregate::{
    aggregate, aggregate_with_progress, BatchEntry, BatchProgress, BatchResult, NoProgress,
    SymbolError, SymbolFailure, TracingProgress,
};
pub use config::{BatchConfig, ConfigError, VolConfig};
pub use export::{BatchReport, FailureRecord};
pub use rank::{rank, rank_values, ColorBand, RankedEntry};
pub use reload::{BatchOutcome, BatchRunner, ReloadHandle};
pub use watchlist::{AddOutcome, Watchlist, WatchlistError};
