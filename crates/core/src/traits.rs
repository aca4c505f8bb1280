use std::sync::Arc;

use anyhow::Result;

use crate::tick::Tick;

/// Read side of the live tick feed.
///
/// Implementations are written to by an independent producer and must answer
/// reads without blocking on I/O.
pub trait TickStore: Send + Sync {
    /// Latest tick for `symbol`, or `None` if nothing has arrived yet.
    ///
    /// # Errors
    ///
    /// Returns an error only when the store itself cannot be read.
    fn get(&self, symbol: &str) -> Result<Option<Tick>>;
}

impl<T: TickStore + ?Sized> TickStore for Arc<T> {
    fn get(&self, symbol: &str) -> Result<Option<Tick>> {
        (**self).get(symbol)
    }
}

impl<T: TickStore + ?Sized> TickStore for &T {
    fn get(&self, symbol: &str) -> Result<Option<Tick>> {
        (**self).get(symbol)
    }
}
