//! In-memory latest-tick store.
//!
//! The feed transport calls [`LiveDataStore::update`] (or
//! [`LiveDataStore::apply_message`] with the raw feed payload) from its own
//! task; readers go through the [`TickStore`] trait. Each symbol holds only
//! its latest tick.

use std::collections::HashMap;

use anyhow::Result;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use straddle_core::{Tick, TickStore};

/// Thread-safe map from instrument symbol to its latest tick.
#[derive(Debug, Default)]
pub struct LiveDataStore {
    ticks: RwLock<HashMap<String, Tick>>,
}

impl LiveDataStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-populated from a symbol → tick snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: HashMap<String, Tick>) -> Self {
        Self {
            ticks: RwLock::new(snapshot),
        }
    }

    /// Overwrites the latest tick for `symbol`.
    pub fn update(&self, symbol: impl Into<String>, tick: Tick) {
        self.ticks.write().insert(symbol.into(), tick);
    }

    /// Drops a symbol, returning its last tick.
    pub fn remove(&self, symbol: &str) -> Option<Tick> {
        self.ticks.write().remove(symbol)
    }

    /// Ingests one flat feed message keyed by its `symbol` field.
    ///
    /// Returns the symbol that was updated. Messages without a symbol, or
    /// whose shape is not a tick, are ignored.
    pub fn apply_message(&self, message: &Value) -> Option<String> {
        let Some(symbol) = message.get("symbol").and_then(Value::as_str) else {
            debug!("Feed message without symbol ignored");
            return None;
        };
        let symbol = symbol.to_string();

        match serde_json::from_value::<Tick>(message.clone()) {
            Ok(tick) => {
                self.update(symbol.clone(), tick);
                Some(symbol)
            }
            Err(e) => {
                debug!(symbol = %symbol, error = %e, "Malformed feed message ignored");
                None
            }
        }
    }

    /// Copy of every symbol's latest tick.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, Tick> {
        self.ticks.read().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ticks.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ticks.read().is_empty()
    }
}

impl TickStore for LiveDataStore {
    fn get(&self, symbol: &str) -> Result<Option<Tick>> {
        Ok(self.ticks.read().get(symbol).cloned())
    }
}
