//! Option symbols grouped by strike.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use straddle_feed::OptionRight;

/// First run of 4-7 digits in a symbol is its strike.
const STRIKE_PATTERN: &str = "[0-9]{4,7}";

fn strike_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(STRIKE_PATTERN).expect("strike pattern is a valid regex"))
}

/// Extracts the strike embedded in an option symbol.
#[must_use]
pub fn parse_strike(symbol: &str) -> Option<i64> {
    strike_regex().find(symbol)?.as_str().parse().ok()
}

/// Call and put symbols listed at one strike.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StrikeLegs {
    pub call: Option<String>,
    pub put: Option<String>,
}

impl StrikeLegs {
    #[must_use]
    pub const fn leg(&self, right: OptionRight) -> Option<&String> {
        match right {
            OptionRight::Call => self.call.as_ref(),
            OptionRight::Put => self.put.as_ref(),
        }
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.call.is_some() && self.put.is_some()
    }

    const fn is_empty(&self) -> bool {
        self.call.is_none() && self.put.is_none()
    }
}

/// Strike → legs lookup for one expiry, strikes ascending.
///
/// Every strike present has at least one leg.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StrikeIndex {
    strikes: BTreeMap<i64, StrikeLegs>,
}

impl StrikeIndex {
    /// Builds the index from an expiry's symbol list.
    ///
    /// Symbols without a strike are skipped; symbols with a strike but no
    /// `CE`/`PE` suffix add nothing. A repeated (strike, leg) keeps the last symbol.
    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut strikes: BTreeMap<i64, StrikeLegs> = BTreeMap::new();
        let mut skipped = 0usize;

        for symbol in symbols {
            let symbol = symbol.as_ref();
            let Some(strike) = parse_strike(symbol) else {
                skipped += 1;
                continue;
            };
            let Some(right) = OptionRight::from_symbol(symbol) else {
                continue;
            };

            let legs = strikes.entry(strike).or_default();
            match right {
                OptionRight::Call => legs.call = Some(symbol.to_string()),
                OptionRight::Put => legs.put = Some(symbol.to_string()),
            }
        }

        debug_assert!(strikes.values().all(|legs| !legs.is_empty()));
        debug!(strikes = strikes.len(), skipped, "Strike index built");

        Self { strikes }
    }

    #[must_use]
    pub fn get(&self, strike: i64) -> Option<&StrikeLegs> {
        self.strikes.get(&strike)
    }

    #[must_use]
    pub fn contains(&self, strike: i64) -> bool {
        self.strikes.contains_key(&strike)
    }

    /// Strikes in ascending order.
    pub fn strikes(&self) -> impl Iterator<Item = i64> + '_ {
        self.strikes.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strikes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strikes.is_empty()
    }
}
