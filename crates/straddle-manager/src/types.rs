//! Types for straddle entry and monitoring.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

use straddle_core::{DteBucket, IndexConfig};

/// Entry posture chosen for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryDecision {
    /// Risk-seeking posture one day before expiry.
    HighRisk,
    /// Risk-seeking posture on expiry day (high reward-to-risk).
    HighRr,
    /// Conservative posture, either bucket.
    LowRisk,
}

impl EntryDecision {
    /// Risk-seeking label for a DTE bucket.
    #[must_use]
    pub const fn risk_seeking(bucket: DteBucket) -> Self {
        match bucket {
            DteBucket::OneDte => Self::HighRisk,
            DteBucket::ZeroDte => Self::HighRr,
        }
    }

    #[must_use]
    pub const fn is_risk_seeking(self) -> bool {
        matches!(self, Self::HighRisk | Self::HighRr)
    }
}

impl std::fmt::Display for EntryDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HighRisk => write!(f, "HIGH_RISK"),
            Self::HighRr => write!(f, "HIGH_RR"),
            Self::LowRisk => write!(f, "LOW_RISK"),
        }
    }
}

/// One straddle reading taken by the monitor loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorUpdate {
    pub timestamp: DateTime<Utc>,
    pub call_ltp: Decimal,
    pub put_ltp: Decimal,
    /// `call_ltp + put_ltp`.
    pub straddle: Decimal,
    pub underlying_ltp: Decimal,
}

impl MonitorUpdate {
    /// Returns `None` when the premiums overflow their sum.
    #[must_use]
    pub fn new(call_ltp: Decimal, put_ltp: Decimal, underlying_ltp: Decimal) -> Option<Self> {
        Some(Self {
            timestamp: Utc::now(),
            call_ltp,
            put_ltp,
            straddle: call_ltp.checked_add(put_ltp)?,
            underlying_ltp,
        })
    }
}

/// Latest-reading slot on a [`TradeContext`].
///
/// Clones share the slot. Only the monitor loop writes it; readers always
/// observe a whole [`MonitorUpdate`].
#[derive(Debug, Clone, Default)]
pub struct LastUpdate(Arc<RwLock<Option<MonitorUpdate>>>);

impl LastUpdate {
    #[must_use]
    pub fn get(&self) -> Option<MonitorUpdate> {
        self.0.read().clone()
    }

    pub(crate) fn set(&self, update: MonitorUpdate) {
        *self.0.write() = Some(update);
    }
}

impl Serialize for LastUpdate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.get().serialize(serializer)
    }
}

/// Decision record produced by the entry check and tracked by the monitor.
#[derive(Debug, Clone, Serialize)]
pub struct TradeContext {
    pub index: String,
    pub dte: i64,
    pub decision: EntryDecision,
    /// Justification naming the numbers the decision used.
    pub reason: String,
    pub atm_strike: i64,
    pub call_symbol: String,
    pub put_symbol: String,
    pub underlying_symbol: String,
    pub initial_straddle: Decimal,
    pub underlying_ltp: Option<Decimal>,
    /// Absolute percent change of the underlying at decision time.
    pub underlying_pct: Option<Decimal>,
    pub config: IndexConfig,
    pub decided_at: DateTime<Utc>,
    pub last_update: LastUpdate,
}

impl TradeContext {
    /// Most recent monitor reading, if any.
    #[must_use]
    pub fn latest(&self) -> Option<MonitorUpdate> {
        self.last_update.get()
    }
}
