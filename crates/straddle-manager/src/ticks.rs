//! Tick reader. The one place feed values are turned into numbers.
//!
//! Feed fields may be JSON numbers, numeric strings, empty strings, or
//! missing altogether. Everything here degrades to `None` rather than
//! failing; only a store that cannot be read surfaces as an error.

use std::str::FromStr;

use anyhow::Result;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use straddle_core::{Tick, TickStore};

/// Last-traded-price field.
pub const LTP: &str = "ltp";
/// Signed change versus previous close.
pub const CHANGE: &str = "ltpch";
/// Signed percent change versus previous close.
pub const CHANGE_PCT: &str = "ltpchp";

/// Parses a loosely-typed numeric field.
#[must_use]
pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                parse_str(&n.to_string())
            }
        }
        Value::String(s) => parse_str(s),
        _ => None,
    }
}

fn parse_str(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Last traded price of a tick, falling back to `raw.ltp`.
#[must_use]
pub fn tick_price(tick: &Tick) -> Option<Decimal> {
    tick.field(LTP)
        .and_then(parse_decimal)
        .or_else(|| tick.raw_field(LTP).and_then(parse_decimal))
}

/// Latest price for `symbol` in the store.
///
/// # Errors
///
/// Returns an error only if the store read fails.
pub fn price<S: TickStore + ?Sized>(store: &S, symbol: &str) -> Result<Option<Decimal>> {
    if symbol.is_empty() {
        return Ok(None);
    }
    let Some(tick) = store.get(symbol)? else {
        debug!(symbol, "No tick yet");
        return Ok(None);
    };

    let ltp = tick_price(&tick);
    if ltp.is_none() {
        debug!(symbol, "Tick has no usable ltp");
    }
    Ok(ltp)
}

/// Absolute percent change of a tick (`0.25` means 0.25%).
///
/// Reads from the nested `raw` payload when present, else from the top
/// level. Prefers the precomputed percent; otherwise derives it from the
/// signed change: `|change / (ltp - change)| * 100`.
#[must_use]
pub fn percent_change(tick: &Tick) -> Option<Decimal> {
    let field = |key: &str| match &tick.raw {
        Some(raw) => raw.get(key),
        None => tick.field(key),
    };

    if let Some(pct) = field(CHANGE_PCT).and_then(parse_decimal) {
        return Some(pct.abs());
    }

    let change = field(CHANGE).and_then(parse_decimal)?;
    let ltp = field(LTP).and_then(parse_decimal).or_else(|| tick_price(tick))?;
    let previous = ltp.checked_sub(change)?;
    if previous.is_zero() {
        return None;
    }

    change
        .checked_div(previous)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| pct.abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use straddle_feed::LiveDataStore;

    #[test]
    fn parses_numbers_and_numeric_strings() {
        assert_eq!(parse_decimal(&json!(24500)), Some(dec!(24500)));
        assert_eq!(parse_decimal(&json!(72.35)), Some(dec!(72.35)));
        assert_eq!(parse_decimal(&json!(" 101.5 ")), Some(dec!(101.5)));
        assert_eq!(parse_decimal(&json!("1.5e2")), Some(dec!(150)));
        assert_eq!(parse_decimal(&json!("")), None);
        assert_eq!(parse_decimal(&json!("n/a")), None);
        assert_eq!(parse_decimal(&json!(null)), None);
        assert_eq!(parse_decimal(&json!(true)), None);
        assert_eq!(parse_decimal(&json!({ "ltp": 1 })), None);
    }

    #[test]
    fn price_reads_top_level_ltp() {
        let store = LiveDataStore::new();
        store.update("NSE:NIFTY50-INDEX", Tick::with_ltp("24512.35"));

        assert_eq!(
            price(&store, "NSE:NIFTY50-INDEX").unwrap(),
            Some(dec!(24512.35))
        );
    }

    #[test]
    fn price_falls_back_to_raw_ltp() {
        let store = LiveDataStore::new();
        store.update(
            "NSE:NIFTY25OCT24500CE",
            Tick::with_ltp("").with_raw_field("ltp", 72.5),
        );

        assert_eq!(
            price(&store, "NSE:NIFTY25OCT24500CE").unwrap(),
            Some(dec!(72.5))
        );
    }

    #[test]
    fn price_is_none_for_missing_or_malformed() {
        let store = LiveDataStore::new();
        store.update("BAD", Tick::with_ltp("abc"));
        store.update("EMPTY", Tick::default());

        assert_eq!(price(&store, "").unwrap(), None);
        assert_eq!(price(&store, "ABSENT").unwrap(), None);
        assert_eq!(price(&store, "BAD").unwrap(), None);
        assert_eq!(price(&store, "EMPTY").unwrap(), None);
    }

    #[test]
    fn percent_prefers_explicit_field() {
        let tick = Tick::default().with_field("ltpchp", "0.42");
        assert_eq!(percent_change(&tick), Some(dec!(0.42)));

        let negative = Tick::with_ltp(100).with_raw_field("ltpchp", -0.42);
        assert_eq!(percent_change(&negative), Some(dec!(0.42)));
    }

    #[test]
    fn percent_derives_from_change_and_price() {
        let tick = Tick::with_ltp(110).with_raw_field("ltpch", 10).with_raw_field("ltp", 110);
        assert_eq!(percent_change(&tick), Some(dec!(10)));

        let flat = Tick::with_ltp(110).with_field("ltpch", "10");
        assert_eq!(percent_change(&flat), Some(dec!(10)));
    }

    #[test]
    fn percent_derivation_uses_absolute_value() {
        let tick = Tick::with_ltp(90).with_field("ltpch", -10);
        assert_eq!(percent_change(&tick), Some(dec!(10)));
    }

    #[test]
    fn percent_is_none_when_underivable() {
        // Previous price would be zero.
        let zero_prev = Tick::with_ltp(10).with_field("ltpch", 10);
        assert_eq!(percent_change(&zero_prev), None);

        // No change fields at all.
        assert_eq!(percent_change(&Tick::with_ltp(100)), None);

        // Non-numeric change.
        let junk = Tick::with_ltp(100).with_field("ltpch", "up");
        assert_eq!(percent_change(&junk), None);

        // Empty percent string falls through to derivation.
        let empty_pct = Tick::with_ltp(110)
            .with_field("ltpchp", "")
            .with_field("ltpch", 10);
        assert_eq!(percent_change(&empty_pct), Some(dec!(10)));
    }

    #[test]
    fn percent_is_none_when_previous_price_overflows() {
        let tick = Tick::with_ltp("79228162514264337593543950335")
            .with_field("ltpch", "-79228162514264337593543950335");
        assert_eq!(percent_change(&tick), None);
    }
}
