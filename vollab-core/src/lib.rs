//! VolLab Core: symbols, kline retrieval, series normalization, volatility.
//!
//! This crate contains the per-symbol pipeline:
//! - Domain types (symbols, parameters, time series with explicit missing values)
//! - Kline provider trait with a Bybit implementation and an in-memory one
//! - Series fetcher (lookback window → provider request)
//! - Normalizer (sort, dedupe, parse closes)
//! - Simple returns and rolling sample standard deviation

pub mod data;
pub mod domain;
pub mod indicators;
