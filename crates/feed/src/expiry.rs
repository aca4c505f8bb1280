//! Nearest-expiry selection across index option chains.
//!
//! Chain acquisition (broker REST calls, credentials) lives outside this
//! workspace. Callers hand over the expiry date and symbol list of each
//! chain's nearest expiry; this module picks the index expiring first and
//! computes its days-to-expiry.

use std::fmt;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Date format used by chain responses (`"28-10-2025"`).
pub const CHAIN_EXPIRY_FORMAT: &str = "%d-%m-%Y";

/// Nearest expiry of one index's option chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSummary {
    /// Index identifier (e.g. "NIFTY").
    pub index: String,
    pub expiry: NaiveDate,
    /// Option symbols listed for that expiry.
    pub symbols: Vec<String>,
}

impl ChainSummary {
    #[must_use]
    pub fn new(index: &str, expiry: NaiveDate, symbols: Vec<String>) -> Self {
        Self {
            index: index.to_string(),
            expiry,
            symbols,
        }
    }

    /// Parses a chain expiry date in `dd-mm-yyyy` form.
    ///
    /// # Errors
    ///
    /// Returns an error if the date is not in the chain format.
    pub fn parse_expiry(raw: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(raw.trim(), CHAIN_EXPIRY_FORMAT)
            .with_context(|| format!("invalid chain expiry date: {raw}"))
    }
}

/// The index and expiry chosen for today's session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpirySelection {
    pub index: String,
    pub expiry: NaiveDate,
    /// Calendar days from `today` to expiry; negative once expired.
    pub dte: i64,
    pub symbols: Vec<String>,
}

impl ExpirySelection {
    #[must_use]
    pub const fn status(&self) -> DteStatus {
        DteStatus::from_dte(self.dte)
    }
}

/// Human label for a days-to-expiry value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DteStatus {
    Expired,
    Days(i64),
}

impl DteStatus {
    #[must_use]
    pub const fn from_dte(dte: i64) -> Self {
        if dte < 0 {
            Self::Expired
        } else {
            Self::Days(dte)
        }
    }
}

impl fmt::Display for DteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "Expired"),
            Self::Days(n) => write!(f, "{n}DTE"),
        }
    }
}

/// Picks the chain whose expiry comes first.
///
/// On equal expiries the later chain in `chains` wins. Returns `None` for an
/// empty slice.
#[must_use]
pub fn nearest_expiry(chains: &[ChainSummary], today: NaiveDate) -> Option<ExpirySelection> {
    let nearest = chains
        .iter()
        .reduce(|best, chain| if best.expiry < chain.expiry { best } else { chain })?;

    let dte = (nearest.expiry - today).num_days();
    let selection = ExpirySelection {
        index: nearest.index.clone(),
        expiry: nearest.expiry,
        dte,
        symbols: nearest.symbols.clone(),
    };

    info!(
        index = %selection.index,
        expiry = %selection.expiry,
        dte,
        status = %selection.status(),
        symbols = selection.symbols.len(),
        "Nearest expiry selected"
    );

    Some(selection)
}

/// Source of the session's index, DTE and candidate option symbols.
#[async_trait]
pub trait ExpiryResolver: Send + Sync {
    /// Resolves the nearest expiry, or `None` when no chain is available.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream chain source fails.
    async fn resolve(&self) -> Result<Option<ExpirySelection>>;
}

/// Resolver over chains that were fetched ahead of time.
#[derive(Debug, Clone)]
pub struct StaticExpiryResolver {
    chains: Vec<ChainSummary>,
    today: NaiveDate,
}

impl StaticExpiryResolver {
    #[must_use]
    pub const fn new(chains: Vec<ChainSummary>, today: NaiveDate) -> Self {
        Self { chains, today }
    }
}

#[async_trait]
impl ExpiryResolver for StaticExpiryResolver {
    async fn resolve(&self) -> Result<Option<ExpirySelection>> {
        Ok(nearest_expiry(&self.chains, self.today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn chains() -> Vec<ChainSummary> {
        vec![
            ChainSummary::new(
                "NIFTY",
                date(2025, 10, 28),
                vec!["NSE:NIFTY25O2824500CE".to_string()],
            ),
            ChainSummary::new(
                "SENSEX",
                date(2025, 10, 30),
                vec!["BSE:SENSEX25O3081500PE".to_string()],
            ),
        ]
    }

    #[test]
    fn earlier_expiry_wins() {
        let selection = nearest_expiry(&chains(), date(2025, 10, 27)).unwrap();

        assert_eq!(selection.index, "NIFTY");
        assert_eq!(selection.dte, 1);
        assert_eq!(selection.status().to_string(), "1DTE");
        assert_eq!(selection.symbols.len(), 1);
    }

    #[test]
    fn equal_expiries_pick_later_chain() {
        let mut chains = chains();
        chains[1].expiry = chains[0].expiry;

        let selection = nearest_expiry(&chains, date(2025, 10, 28)).unwrap();
        assert_eq!(selection.index, "SENSEX");
        assert_eq!(selection.status().to_string(), "0DTE");
    }

    #[test]
    fn past_expiry_is_expired() {
        let selection = nearest_expiry(&chains(), date(2025, 10, 29)).unwrap();
        assert_eq!(selection.dte, -1);
        assert_eq!(selection.status(), DteStatus::Expired);
    }

    #[test]
    fn empty_chains_yield_none() {
        assert!(nearest_expiry(&[], date(2025, 10, 27)).is_none());
    }

    #[test]
    fn parses_chain_date_format() {
        assert_eq!(
            ChainSummary::parse_expiry("28-10-2025").unwrap(),
            date(2025, 10, 28)
        );
        assert!(ChainSummary::parse_expiry("2025-10-28").is_err());
    }

    #[tokio::test]
    async fn static_resolver_returns_nearest() {
        let resolver = StaticExpiryResolver::new(chains(), date(2025, 10, 24));
        let selection = resolver.resolve().await.unwrap().unwrap();

        assert_eq!(selection.index, "NIFTY");
        assert_eq!(selection.dte, 4);
    }
}
