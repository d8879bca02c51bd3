//! Reload guard: only the newest batch request is allowed to deliver results.
//!
//! Every `run` takes a fresh generation number. When a newer run starts (or
//! `supersede` is called), an older run stops launching symbol pipelines and
//! its output is dropped instead of being merged with the new one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use vollab_core::data::KlineProvider;
use vollab_core::domain::Symbol;

use crate::aggregate::{run_batch, BatchProgress, BatchResult, NoProgress};
use crate::config::BatchConfig;

/// What a guarded run produced.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// The run finished and was still the newest when it did.
    Completed(BatchResult),
    /// A newer run started first; results were discarded.
    Superseded,
}

impl BatchOutcome {
    pub fn completed(self) -> Option<BatchResult> {
        match self {
            BatchOutcome::Completed(result) => Some(result),
            BatchOutcome::Superseded => None,
        }
    }
}

/// Cloneable handle that invalidates whatever run is in flight.
#[derive(Debug, Clone)]
pub struct ReloadHandle {
    generation: Arc<AtomicU64>,
}

impl ReloadHandle {
    pub fn supersede(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Stateless aggregator wrapped with a generation counter.
#[derive(Debug, Default)]
pub struct BatchRunner {
    generation: Arc<AtomicU64>,
}

impl BatchRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> ReloadHandle {
        ReloadHandle {
            generation: Arc::clone(&self.generation),
        }
    }

    pub fn run(
        &self,
        provider: &dyn KlineProvider,
        symbols: &[Symbol],
        config: &BatchConfig,
    ) -> BatchOutcome {
        self.run_with_progress(provider, symbols, config, &NoProgress)
    }

    pub fn run_with_progress(
        &self,
        provider: &dyn KlineProvider,
        symbols: &[Symbol],
        config: &BatchConfig,
        progress: &dyn BatchProgress,
    ) -> BatchOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let is_current = || self.generation.load(Ordering::SeqCst) == generation;

        match run_batch(provider, symbols, config, progress, &is_current) {
            Some(result) if is_current() => BatchOutcome::Completed(result),
            _ => {
                tracing::info!(generation, "batch superseded; discarding results");
                BatchOutcome::Superseded
            }
        }
    }
}
