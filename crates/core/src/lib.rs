//! Core types shared across the straddle workspace.
//!
//! Holds the per-index threshold configuration, the figment-based loader,
//! the loosely-typed [`Tick`] record, and the [`TickStore`] seam that the
//! live feed writes into and the straddle manager reads from.

pub mod config;
pub mod config_loader;
pub mod tick;
pub mod traits;

pub use config::{
    AppConfig, ConfigError, DteBucket, DteThresholds, EntryConfig, IndexConfig, MonitorConfig,
};
pub use config_loader::ConfigLoader;
pub use tick::Tick;
pub use traits::TickStore;
