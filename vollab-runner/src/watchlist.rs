//! Watchlist: the persisted list of symbols a batch runs over.
//!
//! Stored as TOML (`symbols = [...]`). Order is preserved; it becomes the
//! batch input order and so decides ranking ties.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vollab_core::domain::Symbol;

#[derive(Debug, Error)]
pub enum WatchlistError {
    #[error("failed to read watchlist {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write watchlist {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse watchlist TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize watchlist: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result of [`Watchlist::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
    /// Input was blank after trimming.
    Empty,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Watchlist {
    #[serde(default)]
    symbols: Vec<Symbol>,
}

const STARTER_SYMBOLS: &[&str] = &[
    "ETHUSDT", "MNTUSDT", "SOLUSDT", "GALAUSDT", "XRPUSDT", "APEXUSDT", "DOGEUSDT", "PEPEUSDT",
    "WLDUSDT", "FLOKIUSDT", "MATICUSDT", "AGIUSDT", "BNBUSDT", "AGIXUSDT", "FETUSDT", "NEARUSDT",
    "BONKUSDT", "PYTHUSDT", "MAVIAUSDT",
];

impl Watchlist {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }

    /// Starter list used when no watchlist file exists yet.
    pub fn default_starter() -> Self {
        Self {
            symbols: STARTER_SYMBOLS.iter().copied().map(Symbol::from).collect(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, WatchlistError> {
        let content = std::fs::read_to_string(path).map_err(|source| WatchlistError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Load `path`, or fall back to the starter list when the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Self, WatchlistError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no watchlist file; using starter list");
            Ok(Self::default_starter())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, WatchlistError> {
        let mut list: Watchlist = toml::from_str(content)?;
        list.symbols.retain(|s| !s.is_empty());
        Ok(list)
    }

    pub fn to_toml(&self) -> Result<String, WatchlistError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), WatchlistError> {
        let write_err = |source| WatchlistError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, self.to_toml()?).map_err(write_err)
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s.as_str() == symbol.trim())
    }

    /// Append a symbol at the end. Input is trimmed; case is kept as typed.
    pub fn add(&mut self, symbol: &str) -> AddOutcome {
        let trimmed = symbol.trim();
        if trimmed.is_empty() {
            return AddOutcome::Empty;
        }
        if self.contains(trimmed) {
            return AddOutcome::AlreadyPresent;
        }
        self.symbols.push(Symbol::from(trimmed));
        AddOutcome::Added
    }

    /// Remove a symbol. Returns false when it was not listed.
    pub fn remove(&mut self, symbol: &str) -> bool {
        let before = self.symbols.len();
        let trimmed = symbol.trim();
        self.symbols.retain(|s| s.as_str() != trimmed);
        self.symbols.len() != before
    }

    /// Symbols in list order, minus the excluded ones.
    pub fn selected(&self, excluded: &[Symbol]) -> Vec<Symbol> {
        let excluded: HashSet<&str> = excluded.iter().map(Symbol::as_str).collect();
        self.symbols
            .iter()
            .filter(|s| !excluded.contains(s.as_str()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_list_has_nineteen_symbols_in_order() {
        let list = Watchlist::default_starter();
        assert_eq!(list.len(), 19);
        assert_eq!(list.symbols()[0].as_str(), "ETHUSDT");
        assert_eq!(list.symbols()[18].as_str(), "MAVIAUSDT");
    }

    #[test]
    fn add_trims_and_rejects_duplicates() {
        let mut list = Watchlist::default();
        assert_eq!(list.add("  SOLUSDT "), AddOutcome::Added);
        assert_eq!(list.add("SOLUSDT"), AddOutcome::AlreadyPresent);
        assert_eq!(list.add("   "), AddOutcome::Empty);
        assert_eq!(list.symbols(), &[Symbol::from("SOLUSDT")]);
    }

    #[test]
    fn remove_reports_whether_anything_changed() {
        let mut list = Watchlist::default_starter();
        assert!(list.remove("DOGEUSDT"));
        assert!(!list.remove("DOGEUSDT"));
        assert_eq!(list.len(), 18);
        assert!(!list.contains("DOGEUSDT"));
    }

    #[test]
    fn selected_skips_excluded_and_keeps_order() {
        let list = Watchlist::new(vec!["A".into(), "B".into(), "C".into()]);
        let picked = list.selected(&[Symbol::from("B")]);
        assert_eq!(picked, vec![Symbol::from("A"), Symbol::from("C")]);
    }

    #[test]
    fn parses_toml_and_drops_blank_entries() {
        let list = Watchlist::from_toml("symbols = [\"ETHUSDT\", \"  \", \"SOLUSDT\"]\n").unwrap();
        assert_eq!(list.len(), 2);
        assert!(Watchlist::from_toml("symbols = 3").is_err());
    }

    #[test]
    fn save_then_load_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("watchlist.toml");
        let mut list = Watchlist::default();
        list.add("XRPUSDT");
        list.add("BNBUSDT");
        list.save(&path).unwrap();
        assert_eq!(Watchlist::from_file(&path).unwrap(), list);
    }

    #[test]
    fn missing_file_falls_back_to_starter() {
        let dir = tempfile::tempdir().unwrap();
        let list = Watchlist::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(list, Watchlist::default_starter());
        assert!(matches!(
            Watchlist::from_file(&dir.path().join("absent.toml")),
            Err(WatchlistError::Read { .. })
        ));
    }
}
