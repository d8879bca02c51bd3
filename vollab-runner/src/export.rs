//! Export: ranking as CSV, whole batch as JSON.
//!
//! The JSON report carries a `schema_version` and the config fingerprint so a
//! saved batch can be matched back to the settings that produced it. Newer
//! schema versions are rejected on load.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vollab_core::domain::{Symbol, SymbolResult};

use crate::aggregate::BatchResult;
use crate::config::BatchConfig;
use crate::rank::{rank, RankedEntry};

pub const SCHEMA_VERSION: u32 = 1;

/// A symbol left out of the batch, flattened for reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub symbol: Symbol,
    pub kind: String,
    pub message: String,
}

/// Self-contained snapshot of one completed batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    pub config_fingerprint: String,
    pub config: BatchConfig,
    pub ranking: Vec<RankedEntry>,
    pub series: Vec<SymbolResult>,
    pub failures: Vec<FailureRecord>,
}

impl BatchReport {
    pub fn new(batch: &BatchResult, config: &BatchConfig, generated_at: DateTime<Utc>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            generated_at,
            config_fingerprint: config.fingerprint(),
            config: config.clone(),
            ranking: rank(batch),
            series: batch.entries().iter().map(|e| e.result.clone()).collect(),
            failures: batch
                .failures()
                .iter()
                .map(|f| FailureRecord {
                    symbol: f.error.symbol().clone(),
                    kind: f.error.kind().to_string(),
                    message: f.error.to_string(),
                })
                .collect(),
        }
    }
}

pub fn export_json(report: &BatchReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize batch report to JSON")
}

pub fn import_json(json: &str) -> Result<BatchReport> {
    let report: BatchReport =
        serde_json::from_str(json).context("failed to deserialize batch report from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

/// Ranking as CSV. Columns: rank, symbol, volatility, position, band.
pub fn export_ranking_csv(ranking: &[RankedEntry]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["rank", "symbol", "volatility", "position", "band"])?;
    for entry in ranking {
        wtr.write_record([
            entry.rank.to_string().as_str(),
            entry.symbol.as_str(),
            format!("{:.8}", entry.value).as_str(),
            format!("{:.4}", entry.normalized_position).as_str(),
            entry.band.as_str(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

pub fn save_ranking_csv(ranking: &[RankedEntry], path: &Path) -> Result<()> {
    let csv = export_ranking_csv(ranking)?;
    write_file(path, &csv)
}

pub fn save_report_json(report: &BatchReport, path: &Path) -> Result<()> {
    let json = export_json(report)?;
    write_file(path, &json)
}

pub fn load_report_json(path: &Path) -> Result<BatchReport> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "export written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use chrono::TimeZone;
    use vollab_core::data::{FetchCause, InMemoryProvider};
    use vollab_core::domain::WindowSize;

    fn sample_batch() -> (BatchResult, BatchConfig) {
        let provider = InMemoryProvider::new()
            .with_closes("AUSDT", 0, 60_000, &["1.0", "1.1", "1.0", "1.2"])
            .with_closes("BUSDT", 0, 60_000, &["1.0", "1.01", "1.02", "1.01"])
            .with_failure("CUSDT", FetchCause::EmptyData);
        let config = BatchConfig {
            window_size: WindowSize::new(2).unwrap(),
            ..BatchConfig::default()
        };
        let symbols: Vec<Symbol> = ["AUSDT", "BUSDT", "CUSDT"]
            .into_iter()
            .map(Symbol::from)
            .collect();
        (aggregate(&provider, &symbols, &config), config)
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn report_collects_ranking_series_and_failures() {
        let (batch, config) = sample_batch();
        let report = BatchReport::new(&batch, &config, fixed_time());
        assert_eq!(report.ranking.len(), 2);
        assert_eq!(report.series.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].symbol.as_str(), "CUSDT");
        assert_eq!(report.failures[0].kind, "fetch");
        assert_eq!(report.config_fingerprint, config.fingerprint());
    }

    #[test]
    fn json_survives_save_and_load() {
        let (batch, config) = sample_batch();
        let report = BatchReport::new(&batch, &config, fixed_time());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("batch.json");
        save_report_json(&report, &path).unwrap();
        let loaded = load_report_json(&path).unwrap();
        assert_eq!(loaded.ranking, report.ranking);
        assert_eq!(loaded.failures, report.failures);
        assert_eq!(loaded.generated_at, report.generated_at);
    }

    #[test]
    fn newer_schema_is_rejected() {
        let (batch, config) = sample_batch();
        let mut report = BatchReport::new(&batch, &config, fixed_time());
        report.schema_version = SCHEMA_VERSION + 1;
        let json = export_json(&report).unwrap();
        let err = import_json(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported schema version"));
    }

    #[test]
    fn ranking_csv_has_header_and_rows() {
        let (batch, _) = sample_batch();
        let csv = export_ranking_csv(&rank(&batch)).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "rank,symbol,volatility,position,band");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("1,AUSDT,"));
        assert!(lines[1].ends_with(",1.0000,hot"));
        assert!(lines[2].starts_with("2,BUSDT,"));
    }

    #[test]
    fn empty_ranking_csv_is_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rank.csv");
        save_ranking_csv(&[], &path).unwrap();
        let csv = std::fs::read_to_string(&path).unwrap();
        assert_eq!(csv.trim_end(), "rank,symbol,volatility,position,band");
    }
}
