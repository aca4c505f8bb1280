//! Option leg conventions for exchange symbols.

use serde::{Deserialize, Serialize};

/// Options contract right (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionRight {
    Call,
    Put,
}

impl OptionRight {
    /// Two-character suffix that closes an option symbol (e.g. `NSE:NIFTY25OCT24500CE`).
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Call => "CE",
            Self::Put => "PE",
        }
    }

    /// Leg of a symbol from its suffix; `None` for futures, indices, or anything else.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        if symbol.ends_with(Self::Call.suffix()) {
            Some(Self::Call)
        } else if symbol.ends_with(Self::Put.suffix()) {
            Some(Self::Put)
        } else {
            None
        }
    }
}

impl std::fmt::Display for OptionRight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.suffix())
    }
}
