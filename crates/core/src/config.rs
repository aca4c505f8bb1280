use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub entry: EntryConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
}

impl AppConfig {
    /// Checks every index entry and the monitor cadence.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, index) in &self.entry.indices {
            index.validate(name)?;
        }
        self.monitor.validate()
    }
}

/// Errors raised while validating loaded configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Strike step must be a positive integer.
    #[error("invalid strike step {step} for index {index}")]
    InvalidStep { index: String, step: i64 },

    /// Every index needs an underlying symbol to read its price from.
    #[error("missing underlying symbol for index {index}")]
    MissingUnderlying { index: String },

    /// Monitor interval must be non-zero.
    #[error("monitor interval must be greater than zero")]
    InvalidInterval,
}

/// Per-index entry configuration, keyed by index identifier (e.g. "NIFTY").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryConfig {
    #[serde(default)]
    pub indices: HashMap<String, IndexConfig>,
}

impl EntryConfig {
    #[must_use]
    pub fn index(&self, name: &str) -> Option<&IndexConfig> {
        self.indices.get(name)
    }

    #[must_use]
    pub fn with_index(mut self, name: impl Into<String>, config: IndexConfig) -> Self {
        self.indices.insert(name.into(), config);
        self
    }
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            indices: HashMap::new(),
        }
        .with_index(
            "NIFTY",
            IndexConfig::new("NSE:NIFTY50-INDEX", 50, Decimal::from(120), Decimal::from(180)),
        )
        .with_index(
            "SENSEX",
            IndexConfig::new("BSE:SENSEX-INDEX", 100, Decimal::from(600), Decimal::from(400)),
        )
    }
}

/// Threshold configuration for one index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Symbol of the underlying index in the tick store.
    pub underlying: String,
    /// Strike spacing used to round the underlying price.
    pub step: i64,
    /// Minimum straddle premium per DTE bucket.
    pub thresholds: DteThresholds,
}

impl IndexConfig {
    #[must_use]
    pub fn new(underlying: &str, step: i64, zero_dte: Decimal, one_dte: Decimal) -> Self {
        Self {
            underlying: underlying.to_string(),
            step,
            thresholds: DteThresholds {
                zero_dte: Some(zero_dte),
                one_dte: Some(one_dte),
            },
        }
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.step <= 0 {
            return Err(ConfigError::InvalidStep {
                index: name.to_string(),
                step: self.step,
            });
        }
        if self.underlying.trim().is_empty() {
            return Err(ConfigError::MissingUnderlying {
                index: name.to_string(),
            });
        }
        Ok(())
    }
}

/// Minimum straddle premium for each expiry bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DteThresholds {
    #[serde(rename = "0DTE", default, skip_serializing_if = "Option::is_none")]
    pub zero_dte: Option<Decimal>,
    #[serde(rename = "1DTE", default, skip_serializing_if = "Option::is_none")]
    pub one_dte: Option<Decimal>,
}

impl DteThresholds {
    #[must_use]
    pub const fn get(&self, bucket: DteBucket) -> Option<Decimal> {
        match bucket {
            DteBucket::ZeroDte => self.zero_dte,
            DteBucket::OneDte => self.one_dte,
        }
    }
}

/// Expiry buckets the entry engine classifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DteBucket {
    #[serde(rename = "0DTE")]
    ZeroDte,
    #[serde(rename = "1DTE")]
    OneDte,
}

impl DteBucket {
    /// Bucket for a days-to-expiry value; only 0 and 1 have one.
    #[must_use]
    pub const fn from_dte(dte: i64) -> Option<Self> {
        match dte {
            0 => Some(Self::ZeroDte),
            1 => Some(Self::OneDte),
            _ => None,
        }
    }
}

impl fmt::Display for DteBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDte => write!(f, "0DTE"),
            Self::OneDte => write!(f, "1DTE"),
        }
    }
}

/// Monitor loop cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between straddle recomputations.
    pub interval_secs: u64,
    /// Upper bound on waiting for the monitor task to finish after stop.
    pub join_timeout_secs: u64,
}

impl MonitorConfig {
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    #[must_use]
    pub const fn join_timeout(&self) -> Duration {
        Duration::from_secs(self.join_timeout_secs)
    }

    const fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            join_timeout_secs: 2,
        }
    }
}
