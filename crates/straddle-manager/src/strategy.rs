//! Routing of entry decisions to strategy code.

use anyhow::Result;
use tracing::info;

use crate::types::{EntryDecision, TradeContext};

/// Receives the session's entry decision. Implementations place orders,
/// raise alerts, or anything else the posture calls for.
pub trait StrategyHandler: Send + Sync {
    /// Risk-seeking posture one day before expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the strategy could not act on the decision.
    fn on_high_risk(&self, context: &TradeContext) -> Result<()>;

    /// Risk-seeking posture on expiry day.
    ///
    /// # Errors
    ///
    /// Returns an error if the strategy could not act on the decision.
    fn on_high_rr(&self, context: &TradeContext) -> Result<()>;

    /// Conservative posture.
    ///
    /// # Errors
    ///
    /// Returns an error if the strategy could not act on the decision.
    fn on_low_risk(&self, context: &TradeContext) -> Result<()>;
}

/// Calls the handler method matching the context's decision.
///
/// # Errors
///
/// Propagates the handler's error.
pub fn dispatch_decision<H: StrategyHandler + ?Sized>(handler: &H, context: &TradeContext) -> Result<()> {
    match context.decision {
        EntryDecision::HighRisk => handler.on_high_risk(context),
        EntryDecision::HighRr => handler.on_high_rr(context),
        EntryDecision::LowRisk => handler.on_low_risk(context),
    }
}

/// Handler that only records the call.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingStrategy;

impl LoggingStrategy {
    fn log(entry: &str, context: &TradeContext) {
        info!(
            entry,
            index = %context.index,
            strike = context.atm_strike,
            call = %context.call_symbol,
            put = %context.put_symbol,
            straddle = %context.initial_straddle,
            "Strategy call"
        );
    }
}

impl StrategyHandler for LoggingStrategy {
    fn on_high_risk(&self, context: &TradeContext) -> Result<()> {
        Self::log("high_risk", context);
        Ok(())
    }

    fn on_high_rr(&self, context: &TradeContext) -> Result<()> {
        Self::log("high_rr", context);
        Ok(())
    }

    fn on_low_risk(&self, context: &TradeContext) -> Result<()> {
        Self::log("low_risk", context);
        Ok(())
    }
}
