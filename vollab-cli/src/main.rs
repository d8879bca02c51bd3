//! VolLab CLI: rank symbols by rolling volatility and manage the watchlist.
//!
//! Commands:
//! - `rank`: fetch, compute and rank a symbol list, optionally exporting CSV / JSON
//! - `watchlist show|add|remove`: edit the persisted symbol list

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vollab_core::data::BybitProvider;
use vollab_core::domain::{MarketCategory, Resolution, Symbol, WindowSize};
use vollab_runner::export::{save_ranking_csv, save_report_json};
use vollab_runner::{
    rank, AddOutcome, BatchOutcome, BatchReport, BatchResult, BatchRunner, RankedEntry,
    TracingProgress, VolConfig, Watchlist,
};

#[derive(Parser)]
#[command(
    name = "vollab",
    about = "VolLab CLI: rank crypto symbols by rolling volatility of returns"
)]
struct Cli {
    /// Log level used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch recent candles, compute rolling volatility and print the ranking.
    Rank {
        /// Symbols to rank. Defaults to the watchlist.
        symbols: Vec<String>,

        /// Watchlist file used when no symbols are given.
        #[arg(long, default_value = "watchlist.toml")]
        watchlist: PathBuf,

        /// Symbols to leave out of this run (repeatable, or comma-separated).
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,

        /// TOML config file with [batch] and [provider] tables.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Lookback in hours.
        #[arg(long)]
        hours: Option<u32>,

        /// Candle resolution (1, 3, 5, 15, 30, 60, 120, 240, 360, 720, D, W, M).
        #[arg(long)]
        resolution: Option<Resolution>,

        /// Returns per rolling window (>= 2).
        #[arg(long)]
        window: Option<usize>,

        /// Maximum symbols fetched at once.
        #[arg(long)]
        concurrency: Option<usize>,

        /// Market category: spot, linear or inverse.
        #[arg(long)]
        category: Option<MarketCategory>,

        /// Write the ranking as CSV.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write the full batch report as JSON.
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Watchlist management commands.
    Watchlist {
        #[command(subcommand)]
        action: WatchlistAction,

        /// Watchlist file.
        #[arg(long, global = true, default_value = "watchlist.toml")]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum WatchlistAction {
    /// Print the symbols in order.
    Show,
    /// Append a symbol.
    Add { symbol: String },
    /// Remove a symbol.
    Remove { symbol: String },
}

struct Overrides {
    hours: Option<u32>,
    resolution: Option<Resolution>,
    window: Option<usize>,
    concurrency: Option<usize>,
    category: Option<MarketCategory>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "vollab={},vollab_core={},vollab_runner={}",
                cli.log_level, cli.log_level, cli.log_level
            ))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Rank {
            symbols,
            watchlist,
            exclude,
            config,
            hours,
            resolution,
            window,
            concurrency,
            category,
            csv,
            json,
        } => run_rank(
            symbols,
            watchlist,
            exclude,
            config,
            Overrides {
                hours,
                resolution,
                window,
                concurrency,
                category,
            },
            csv,
            json,
        ),
        Commands::Watchlist { action, file } => run_watchlist(action, file),
    }
}

fn load_config(path: Option<PathBuf>, overrides: Overrides) -> Result<VolConfig> {
    let mut config = match path {
        Some(path) => VolConfig::from_file(&path)?,
        None => VolConfig::default(),
    };
    if let Some(hours) = overrides.hours {
        config.batch.hours_ago = hours;
    }
    if let Some(resolution) = overrides.resolution {
        config.batch.resolution = resolution;
    }
    if let Some(window) = overrides.window {
        config.batch.window_size = WindowSize::new(window)?;
    }
    if let Some(concurrency) = overrides.concurrency {
        config.batch.max_concurrency = concurrency;
    }
    if let Some(category) = overrides.category {
        config.batch.category = category;
    }
    config.validate()?;
    Ok(config)
}

fn run_rank(
    symbols: Vec<String>,
    watchlist_path: PathBuf,
    exclude: Vec<String>,
    config_path: Option<PathBuf>,
    overrides: Overrides,
    csv: Option<PathBuf>,
    json: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path, overrides)?;

    let excluded: Vec<Symbol> = exclude.iter().map(|s| Symbol::from(s.trim())).collect();
    let selected = if symbols.is_empty() {
        Watchlist::load_or_default(&watchlist_path)?.selected(&excluded)
    } else {
        Watchlist::new(symbols.iter().map(|s| Symbol::from(s.trim())).collect())
            .selected(&excluded)
    };

    let provider =
        BybitProvider::new(&config.provider).context("failed to build HTTP client")?;
    tracing::info!(
        symbols = selected.len(),
        fingerprint = %config.batch.fingerprint(),
        "starting batch"
    );

    let runner = BatchRunner::new();
    let batch = match runner.run_with_progress(&provider, &selected, &config.batch, &TracingProgress)
    {
        BatchOutcome::Completed(batch) => batch,
        BatchOutcome::Superseded => bail!("batch was superseded before it finished"),
    };

    for failure in batch.failures() {
        eprintln!("{}", failure.error);
    }

    let ranking = rank(&batch);
    print_ranking(&ranking);

    if let Some(path) = csv {
        save_ranking_csv(&ranking, &path)?;
        println!("Ranking saved to: {}", path.display());
    }
    if let Some(path) = json {
        save_report(&batch, &config, &path)?;
        println!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn save_report(batch: &BatchResult, config: &VolConfig, path: &Path) -> Result<()> {
    let report = BatchReport::new(batch, &config.batch, Utc::now());
    save_report_json(&report, path)
}

fn print_ranking(ranking: &[RankedEntry]) {
    if ranking.is_empty() {
        println!("No data available to display.");
        return;
    }

    println!(
        "{:>4}  {:<14} {:>12} {:>9}  {:<8}",
        "Rank", "Symbol", "Volatility", "Position", "Band"
    );
    println!("{}", "-".repeat(53));
    for entry in ranking {
        println!(
            "{:>4}  {:<14} {:>12.6} {:>9.3}  {:<8}",
            entry.rank,
            entry.symbol.as_str(),
            entry.value,
            entry.normalized_position,
            entry.band.as_str()
        );
    }
}

fn run_watchlist(action: WatchlistAction, file: PathBuf) -> Result<()> {
    let mut list = Watchlist::load_or_default(&file)?;

    match action {
        WatchlistAction::Show => {
            if list.is_empty() {
                println!("Watchlist is empty: {}", file.display());
            }
            for (i, symbol) in list.symbols().iter().enumerate() {
                println!("{:>3}. {symbol}", i + 1);
            }
            return Ok(());
        }
        WatchlistAction::Add { symbol } => match list.add(&symbol) {
            AddOutcome::Added => println!("Added {}", symbol.trim()),
            AddOutcome::AlreadyPresent => {
                println!("{} is already on the watchlist", symbol.trim());
                return Ok(());
            }
            AddOutcome::Empty => bail!("symbol must not be empty"),
        },
        WatchlistAction::Remove { symbol } => {
            if !list.remove(&symbol) {
                bail!("{} is not on the watchlist", symbol.trim());
            }
            println!("Removed {}", symbol.trim());
        }
    }

    list.save(&file)?;
    Ok(())
}
