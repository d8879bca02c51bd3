//! Pipeline parameters: candle resolution, market category, rolling window size.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("unknown resolution '{0}' (expected one of 1, 3, 5, 15, 30, 60, 120, 240, 360, 720, D, W, M)")]
    UnknownResolution(String),

    #[error("unknown market category '{0}' (expected spot, linear or inverse)")]
    UnknownCategory(String),

    #[error("window size must be >= 2, got {0}")]
    WindowTooSmall(usize),
}

/// Candle granularity, encoded the way the kline endpoint expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum Resolution {
    Min1,
    Min3,
    Min5,
    #[default]
    Min15,
    Min30,
    Hour1,
    Hour2,
    Hour4,
    Hour6,
    Hour12,
    Day,
    Week,
    Month,
}

impl Resolution {
    /// Interval code sent to the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Min1 => "1",
            Resolution::Min3 => "3",
            Resolution::Min5 => "5",
            Resolution::Min15 => "15",
            Resolution::Min30 => "30",
            Resolution::Hour1 => "60",
            Resolution::Hour2 => "120",
            Resolution::Hour4 => "240",
            Resolution::Hour6 => "360",
            Resolution::Hour12 => "720",
            Resolution::Day => "D",
            Resolution::Week => "W",
            Resolution::Month => "M",
        }
    }

    /// Nominal bucket length in minutes. Months are counted as 30 days.
    pub fn minutes(&self) -> u32 {
        match self {
            Resolution::Min1 => 1,
            Resolution::Min3 => 3,
            Resolution::Min5 => 5,
            Resolution::Min15 => 15,
            Resolution::Min30 => 30,
            Resolution::Hour1 => 60,
            Resolution::Hour2 => 120,
            Resolution::Hour4 => 240,
            Resolution::Hour6 => 360,
            Resolution::Hour12 => 720,
            Resolution::Day => 1_440,
            Resolution::Week => 10_080,
            Resolution::Month => 43_200,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let r = match s.trim() {
            "1" => Resolution::Min1,
            "3" => Resolution::Min3,
            "5" => Resolution::Min5,
            "15" => Resolution::Min15,
            "30" => Resolution::Min30,
            "60" => Resolution::Hour1,
            "120" => Resolution::Hour2,
            "240" => Resolution::Hour4,
            "360" => Resolution::Hour6,
            "720" => Resolution::Hour12,
            "D" | "d" => Resolution::Day,
            "W" | "w" => Resolution::Week,
            "M" => Resolution::Month,
            other => return Err(ParamError::UnknownResolution(other.to_string())),
        };
        Ok(r)
    }
}

impl TryFrom<String> for Resolution {
    type Error = ParamError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Resolution> for String {
    fn from(value: Resolution) -> Self {
        value.as_str().to_string()
    }
}

/// Market segment queried at the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MarketCategory {
    #[default]
    Spot,
    Linear,
    Inverse,
}

impl MarketCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketCategory::Spot => "spot",
            MarketCategory::Linear => "linear",
            MarketCategory::Inverse => "inverse",
        }
    }
}

impl fmt::Display for MarketCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketCategory {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spot" => Ok(MarketCategory::Spot),
            "linear" => Ok(MarketCategory::Linear),
            "inverse" => Ok(MarketCategory::Inverse),
            _ => Err(ParamError::UnknownCategory(s.to_string())),
        }
    }
}

/// Number of returns in each rolling standard deviation window. Always >= 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct WindowSize(usize);

impl WindowSize {
    pub const DEFAULT: WindowSize = WindowSize(8);

    pub fn new(size: usize) -> Result<Self, ParamError> {
        if size < 2 {
            return Err(ParamError::WindowTooSmall(size));
        }
        Ok(Self(size))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for WindowSize {
    type Error = ParamError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WindowSize> for usize {
    fn from(value: WindowSize) -> Self {
        value.0
    }
}

impl fmt::Display for WindowSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
