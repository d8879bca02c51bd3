//! Batch aggregator: runs the per-symbol pipeline across a symbol list.
//!
//! Each symbol goes through fetch → normalize → compute on its own. A symbol
//! that fails (provider error, or no defined trailing volatility) is recorded
//! and left out; it never stops the rest of the batch.
//!
//! Pipelines run on a private rayon pool sized by `max_concurrency` (not the
//! global pool), and results are fanned in by input index so output order does
//! not depend on scheduling.

use rayon::prelude::*;
use thiserror::Error;
use vollab_core::data::{normalize, FetchError, KlineProvider, SeriesFetcher};
use vollab_core::domain::{Symbol, SymbolResult};
use vollab_core::indicators::VolatilityComputer;

use crate::config::BatchConfig;

/// Why a symbol was left out of a batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SymbolError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(
        "not enough history for {symbol}: latest rolling value undefined \
         ({defined} of {returns} windows defined, window {window})"
    )]
    InsufficientHistory {
        symbol: Symbol,
        returns: usize,
        defined: usize,
        window: usize,
    },
}

impl SymbolError {
    pub fn symbol(&self) -> &Symbol {
        match self {
            SymbolError::Fetch(e) => &e.symbol,
            SymbolError::InsufficientHistory { symbol, .. } => symbol,
        }
    }

    /// Short machine-friendly tag for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            SymbolError::Fetch(_) => "fetch",
            SymbolError::InsufficientHistory { .. } => "insufficient_history",
        }
    }
}

/// A symbol that made it into the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    /// Position of the symbol in the requested list.
    pub input_index: usize,
    /// Last value of the volatility series (always defined here).
    pub latest: f64,
    pub result: SymbolResult,
}

impl BatchEntry {
    pub fn symbol(&self) -> &Symbol {
        &self.result.symbol
    }
}

/// A symbol that was left out, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolFailure {
    pub input_index: usize,
    pub error: SymbolError,
}

/// Outcome of one batch. Entries and failures are both in input order.
///
/// An empty result is a valid outcome; callers decide what to show for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    entries: Vec<BatchEntry>,
    failures: Vec<SymbolFailure>,
}

impl BatchResult {
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn failures(&self) -> &[SymbolFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no symbol produced a usable value.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Latest volatility for a symbol (first occurrence if it was requested twice).
    pub fn latest(&self, symbol: &Symbol) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.symbol() == symbol)
            .map(|e| e.latest)
    }

    /// Full series bundle for a symbol (first occurrence).
    pub fn result_for(&self, symbol: &Symbol) -> Option<&SymbolResult> {
        self.entries
            .iter()
            .find(|e| e.symbol() == symbol)
            .map(|e| &e.result)
    }

    /// `(symbol, latest)` pairs in input order.
    pub fn latest_values(&self) -> Vec<(Symbol, f64)> {
        self.entries
            .iter()
            .map(|e| (e.symbol().clone(), e.latest))
            .collect()
    }
}

/// Progress callback for batch runs. Called from pool threads.
pub trait BatchProgress: Send + Sync {
    /// Called when a symbol's pipeline starts.
    fn on_start(&self, symbol: &Symbol, index: usize, total: usize);

    /// Called when a symbol's pipeline finishes.
    fn on_complete(
        &self,
        symbol: &Symbol,
        index: usize,
        total: usize,
        result: &Result<f64, SymbolError>,
    );

    /// Called once after every symbol has finished.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Progress sink that ignores everything.
pub struct NoProgress;

impl BatchProgress for NoProgress {
    fn on_start(&self, _symbol: &Symbol, _index: usize, _total: usize) {}

    fn on_complete(
        &self,
        _symbol: &Symbol,
        _index: usize,
        _total: usize,
        _result: &Result<f64, SymbolError>,
    ) {
    }

    fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _total: usize) {}
}

/// Progress reporter that emits `tracing` events.
pub struct TracingProgress;

impl BatchProgress for TracingProgress {
    fn on_start(&self, symbol: &Symbol, index: usize, total: usize) {
        tracing::debug!(%symbol, "[{}/{}] fetching", index + 1, total);
    }

    fn on_complete(
        &self,
        symbol: &Symbol,
        index: usize,
        total: usize,
        result: &Result<f64, SymbolError>,
    ) {
        match result {
            Ok(latest) => {
                tracing::info!(%symbol, latest, "[{}/{}] ok", index + 1, total)
            }
            Err(e) => {
                tracing::warn!(%symbol, kind = e.kind(), error = %e, "[{}/{}] excluded", index + 1, total)
            }
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        tracing::info!(succeeded, failed, total, "batch complete");
    }
}

/// Run the pipeline for every symbol and collect the results.
pub fn aggregate(
    provider: &dyn KlineProvider,
    symbols: &[Symbol],
    config: &BatchConfig,
) -> BatchResult {
    aggregate_with_progress(provider, symbols, config, &NoProgress)
}

/// [`aggregate`] with a progress observer.
pub fn aggregate_with_progress(
    provider: &dyn KlineProvider,
    symbols: &[Symbol],
    config: &BatchConfig,
    progress: &dyn BatchProgress,
) -> BatchResult {
    run_batch(provider, symbols, config, progress, &|| true).unwrap_or_default()
}

/// Shared batch driver. `keep_going` is polled before each symbol starts; once
/// it returns false no new pipelines launch and the batch yields `None`.
pub(crate) fn run_batch(
    provider: &dyn KlineProvider,
    symbols: &[Symbol],
    config: &BatchConfig,
    progress: &dyn BatchProgress,
    keep_going: &(dyn Fn() -> bool + Sync),
) -> Option<BatchResult> {
    let total = symbols.len();
    let fetcher = SeriesFetcher::new(provider, config.category);
    let computer = VolatilityComputer::new(config.window_size);

    tracing::info!(
        symbols = total,
        provider = fetcher.provider_name(),
        hours_ago = config.hours_ago,
        resolution = %config.resolution,
        window = config.window_size.get(),
        fingerprint = %config.fingerprint(),
        "starting volatility batch"
    );

    let run_one = |(index, symbol): (usize, &Symbol)| -> Option<Outcome> {
        if !keep_going() {
            return None;
        }
        progress.on_start(symbol, index, total);
        let outcome = process_symbol(&fetcher, &computer, config, symbol);
        let summary = outcome
            .as_ref()
            .map(|(latest, _)| *latest)
            .map_err(Clone::clone);
        progress.on_complete(symbol, index, total, &summary);
        Some(outcome)
    };

    let outcomes: Vec<Option<Outcome>> =
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.max_concurrency.max(1))
            .thread_name(|i| format!("vollab-batch-{i}"))
            .build()
        {
            Ok(pool) => pool.install(|| symbols.par_iter().enumerate().map(run_one).collect()),
            Err(e) => {
                tracing::warn!(error = %e, "could not build batch pool; running sequentially");
                symbols.iter().enumerate().map(run_one).collect()
            }
        };

    let mut result = BatchResult::default();
    for (input_index, outcome) in outcomes.into_iter().enumerate() {
        match outcome? {
            Ok((latest, symbol_result)) => result.entries.push(BatchEntry {
                input_index,
                latest,
                result: symbol_result,
            }),
            Err(error) => result.failures.push(SymbolFailure { input_index, error }),
        }
    }

    progress.on_batch_complete(result.entries.len(), result.failures.len(), total);
    Some(result)
}

/// Latest defined volatility plus the full bundle, or the reason there is none.
type Outcome = Result<(f64, SymbolResult), SymbolError>;

/// Fetch → normalize → compute for one symbol.
fn process_symbol(
    fetcher: &SeriesFetcher<'_>,
    computer: &VolatilityComputer,
    config: &BatchConfig,
    symbol: &Symbol,
) -> Outcome {
    let raw = fetcher.fetch(symbol, config.hours_ago, config.resolution)?;
    let prices = normalize(&raw);
    let result = computer.run(symbol.clone(), prices);

    match result.latest_volatility() {
        Some(latest) => Ok((latest, result)),
        None => Err(SymbolError::InsufficientHistory {
            symbol: symbol.clone(),
            returns: result.returns.len(),
            defined: result.volatility.defined_count(),
            window: computer.window(),
        }),
    }
}
