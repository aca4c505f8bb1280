//! ATM strike resolution from the underlying's live price.

use anyhow::Result;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::{debug, warn};

use straddle_core::TickStore;

use crate::strikes::StrikeIndex;
use crate::ticks;

/// Strike chosen as at-the-money, with its listed legs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtmSelection {
    pub strike: i64,
    pub call: Option<String>,
    pub put: Option<String>,
    /// Underlying price the selection was made from.
    pub underlying_ltp: Decimal,
    /// Rounded target before snapping to a listed strike.
    pub target: i64,
}

impl AtmSelection {
    /// Call and put symbols when both legs are listed.
    #[must_use]
    pub fn pair(&self) -> Option<(&str, &str)> {
        Some((self.call.as_deref()?, self.put.as_deref()?))
    }
}

/// Rounds a price to the nearest multiple of `step`.
///
/// Exact half steps round to the even multiple (22025 → 22000 and
/// 22075 → 22100 for a step of 50). Returns `None` for a non-positive step.
#[must_use]
pub fn round_to_strike(price: Decimal, step: i64) -> Option<i64> {
    if step <= 0 {
        return None;
    }
    let step = Decimal::from(step);
    let multiples = price
        .checked_div(step)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    multiples.checked_mul(step)?.to_i64()
}

/// Listed strike closest to `target`; the smaller strike wins a tie.
fn nearest_listed(index: &StrikeIndex, target: i64) -> Option<i64> {
    index.strikes().min_by_key(|strike| strike.abs_diff(target))
}

/// Picks the ATM strike for `underlying_symbol` from the strike index.
///
/// Missing or unparseable underlying prices, an empty index, and a
/// non-positive step all yield `Ok(None)`.
///
/// # Errors
///
/// Returns an error only if the tick store cannot be read.
pub fn resolve_atm<S: TickStore + ?Sized>(
    underlying_symbol: &str,
    index: &StrikeIndex,
    store: &S,
    step: i64,
) -> Result<Option<AtmSelection>> {
    let Some(underlying_ltp) = ticks::price(store, underlying_symbol)? else {
        debug!(underlying = underlying_symbol, "Underlying tick missing");
        return Ok(None);
    };

    let Some(target) = round_to_strike(underlying_ltp, step) else {
        warn!(underlying = underlying_symbol, step, "Invalid strike step");
        return Ok(None);
    };

    if index.is_empty() {
        debug!("No strikes available in strike index");
        return Ok(None);
    }

    let strike = if index.contains(target) {
        target
    } else {
        match nearest_listed(index, target) {
            Some(strike) => strike,
            None => return Ok(None),
        }
    };

    let Some(legs) = index.get(strike) else {
        return Ok(None);
    };
    if legs.call.is_none() && legs.put.is_none() {
        debug!(strike, "ATM strike has no legs");
        return Ok(None);
    }

    debug!(
        underlying = underlying_symbol,
        ltp = %underlying_ltp,
        target,
        strike,
        "ATM strike resolved"
    );

    Ok(Some(AtmSelection {
        strike,
        call: legs.call.clone(),
        put: legs.put.clone(),
        underlying_ltp,
        target,
    }))
}
