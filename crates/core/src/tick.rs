//! Latest-tick record as delivered by the live feed.
//!
//! Fields stay loosely typed: feeds send numbers as JSON numbers or as
//! strings, and exchange-specific extras vary by segment. Numeric
//! interpretation belongs to the straddle manager's tick reader.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One instrument's most recent tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Last traded price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ltp: Option<Value>,
    /// Nested exchange payload (`ltpch`, `ltpchp`, sometimes its own `ltp`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Map<String, Value>>,
    /// Any other top-level fields of a flat feed message.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Tick {
    #[must_use]
    pub fn with_ltp(ltp: impl Into<Value>) -> Self {
        Self {
            ltp: Some(ltp.into()),
            ..Self::default()
        }
    }

    /// Adds a field to the nested `raw` payload, creating it if needed.
    #[must_use]
    pub fn with_raw_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.raw
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    /// Adds a top-level field.
    #[must_use]
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        if key == "ltp" {
            self.ltp = Some(value.into());
        } else {
            self.extra.insert(key.to_string(), value.into());
        }
        self
    }

    /// Top-level field lookup, `ltp` included.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        if key == "ltp" {
            return self.ltp.as_ref();
        }
        self.extra.get(key)
    }

    /// Field lookup in the nested `raw` payload.
    #[must_use]
    pub fn raw_field(&self, key: &str) -> Option<&Value> {
        self.raw.as_ref().and_then(|raw| raw.get(key))
    }
}
