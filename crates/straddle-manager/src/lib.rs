//! ATM straddle entry and monitoring.
//!
//! Runs once per trading session to:
//! - Index the expiry's option symbols by strike
//! - Pick the at-the-money strike from the underlying's live price
//! - Classify the entry posture from DTE, straddle premium and underlying quietness
//!
//! and then tracks the chosen straddle's premium on a fixed cadence,
//! handing each reading to a subscriber callback.
//!
//! Nothing here places orders; decisions are routed to a [`StrategyHandler`].

pub mod atm;
pub mod entry;
pub mod monitor;
pub mod session;
pub mod strategy;
pub mod strikes;
pub mod ticks;
pub mod types;

pub use atm::{resolve_atm, round_to_strike, AtmSelection};
pub use entry::{EntryEngine, QUIET_PCT_CEILING};
pub use monitor::StraddleMonitor;
pub use session::EntrySession;
pub use strategy::{dispatch_decision, LoggingStrategy, StrategyHandler};
pub use strikes::{StrikeIndex, StrikeLegs};
pub use types::{EntryDecision, LastUpdate, MonitorUpdate, TradeContext};
