//! Entry decision: classifies the session's posture from the ATM straddle.
//!
//! Only expiries one day out or on the day are classified:
//! - Straddle at or above the bucket threshold with a quiet underlying
//!   (percent change unknown or at most [`QUIET_PCT_CEILING`]) is risk-seeking
//! - Anything else is conservative

use anyhow::Result;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{error, info, warn};

use straddle_core::{DteBucket, IndexConfig, TickStore};

use crate::atm::resolve_atm;
use crate::strikes::StrikeIndex;
use crate::ticks;
use crate::types::{EntryDecision, LastUpdate, TradeContext};

/// Largest absolute underlying move (percent) still treated as quiet.
pub const QUIET_PCT_CEILING: Decimal = dec!(0.3);

/// Runs the once-per-session entry check for one index.
#[derive(Debug, Clone)]
pub struct EntryEngine {
    index: String,
}

impl EntryEngine {
    #[must_use]
    pub fn new(index: &str) -> Self {
        Self {
            index: index.to_string(),
        }
    }

    #[must_use]
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Classifies the entry posture and builds the trade context.
    ///
    /// Returns `Ok(None)` when DTE is outside {0, 1}, the ATM pair cannot be
    /// resolved, a premium is missing, or the DTE bucket has no threshold.
    ///
    /// # Errors
    ///
    /// Returns an error only if the tick store cannot be read.
    pub fn decide<S: TickStore + ?Sized>(
        &self,
        underlying_symbol: &str,
        strikes: &StrikeIndex,
        store: &S,
        dte: i64,
        config: &IndexConfig,
    ) -> Result<Option<TradeContext>> {
        if dte > 1 {
            info!(index = %self.index, dte, "Skipping entry, DTE beyond 1");
            return Ok(None);
        }
        let Some(bucket) = DteBucket::from_dte(dte) else {
            warn!(
                index = %self.index,
                dte,
                "No entry policy for expired contracts"
            );
            return Ok(None);
        };

        let Some(atm) = resolve_atm(underlying_symbol, strikes, store, config.step)? else {
            warn!(index = %self.index, underlying = underlying_symbol, "ATM strike not resolved");
            return Ok(None);
        };
        let Some((call_symbol, put_symbol)) = atm.pair() else {
            warn!(
                index = %self.index,
                strike = atm.strike,
                call = ?atm.call,
                put = ?atm.put,
                "ATM pair incomplete"
            );
            return Ok(None);
        };

        let call_ltp = ticks::price(store, call_symbol)?;
        let put_ltp = ticks::price(store, put_symbol)?;
        let (Some(call_ltp), Some(put_ltp)) = (call_ltp, put_ltp) else {
            warn!(
                call = call_symbol,
                put = put_symbol,
                call_ltp = ?call_ltp,
                put_ltp = ?put_ltp,
                "Missing ATM premiums"
            );
            return Ok(None);
        };
        let Some(straddle) = call_ltp.checked_add(put_ltp) else {
            warn!(call = call_symbol, put = put_symbol, "Straddle premium out of range");
            return Ok(None);
        };

        let underlying_tick = store.get(underlying_symbol)?;
        let underlying_ltp = underlying_tick.as_ref().and_then(ticks::tick_price);
        let underlying_pct = underlying_tick.as_ref().and_then(ticks::percent_change);

        let Some(threshold) = config.thresholds.get(bucket) else {
            error!(index = %self.index, %bucket, "No straddle threshold configured");
            return Ok(None);
        };

        let (decision, reason) = classify(bucket, straddle, threshold, underlying_pct);

        info!(
            index = %self.index,
            %decision,
            %reason,
            strike = atm.strike,
            call = call_symbol,
            put = put_symbol,
            straddle = %straddle,
            "Entry decision"
        );

        Ok(Some(TradeContext {
            index: self.index.clone(),
            dte,
            decision,
            reason,
            atm_strike: atm.strike,
            call_symbol: call_symbol.to_string(),
            put_symbol: put_symbol.to_string(),
            underlying_symbol: underlying_symbol.to_string(),
            initial_straddle: straddle,
            underlying_ltp,
            underlying_pct,
            config: config.clone(),
            decided_at: Utc::now(),
            last_update: LastUpdate::default(),
        }))
    }
}

fn classify(
    bucket: DteBucket,
    straddle: Decimal,
    threshold: Decimal,
    pct: Option<Decimal>,
) -> (EntryDecision, String) {
    let quiet = pct.map_or(true, |pct| pct <= QUIET_PCT_CEILING);
    let pct_label = pct.map_or_else(|| "unknown".to_string(), |pct| pct.to_string());

    if straddle >= threshold && quiet {
        (
            EntryDecision::risk_seeking(bucket),
            format!(
                "{bucket} and straddle {straddle} >= {threshold} and underlying quiet (pct={pct_label})"
            ),
        )
    } else {
        (
            EntryDecision::LowRisk,
            format!(
                "{bucket} but criteria not met (straddle={straddle}, threshold={threshold}, pct={pct_label})"
            ),
        )
    }
}
