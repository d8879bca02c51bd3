//! Domain types for VolLab

pub mod params;
pub mod series;
pub mod symbol;

pub use params::{MarketCategory, ParamError, Resolution, WindowSize};
pub use series::{
    Observation, PriceSeries, ReturnSeries, SymbolResult, TimeSeries, VolatilitySeries,
};
pub use symbol::Symbol;
