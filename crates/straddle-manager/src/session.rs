//! Entry session: one trading day's entry check and hand-off to monitoring.
//!
//! The session owns the day's strike index and locks itself once the entry
//! question has a final answer: a decision was made, the expiry is outside
//! the classified range, or the index has no configuration or no threshold
//! for the session's DTE bucket. Data gaps leave it open so the caller can
//! poll again.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, error, info, warn};

use straddle_core::{DteBucket, EntryConfig, TickStore};

use crate::entry::EntryEngine;
use crate::monitor::StraddleMonitor;
use crate::strategy::{dispatch_decision, StrategyHandler};
use crate::strikes::StrikeIndex;
use crate::types::{MonitorUpdate, TradeContext};

pub struct EntrySession {
    engine: EntryEngine,
    dte: i64,
    strikes: StrikeIndex,
    config: EntryConfig,
    store: Arc<dyn TickStore>,
    entry_done: bool,
}

impl EntrySession {
    pub fn new<I, S>(
        index: &str,
        dte: i64,
        option_symbols: I,
        config: EntryConfig,
        store: Arc<dyn TickStore>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let strikes = StrikeIndex::from_symbols(option_symbols);
        info!(index, dte, strikes = strikes.len(), "Entry session created");

        Self {
            engine: EntryEngine::new(index),
            dte,
            strikes,
            config,
            store,
            entry_done: false,
        }
    }

    #[must_use]
    pub fn index(&self) -> &str {
        self.engine.index()
    }

    #[must_use]
    pub const fn dte(&self) -> i64 {
        self.dte
    }

    #[must_use]
    pub const fn strikes(&self) -> &StrikeIndex {
        &self.strikes
    }

    /// Whether the entry question is settled for the day.
    #[must_use]
    pub const fn is_entry_done(&self) -> bool {
        self.entry_done
    }

    /// Runs the entry check once.
    ///
    /// Returns the trade context on a decision. After the session locks,
    /// further calls return `Ok(None)` without reading the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the tick store cannot be read.
    pub fn run_entry_check(&mut self) -> Result<Option<TradeContext>> {
        if self.entry_done {
            debug!(index = self.index(), "Entry already locked for the day");
            return Ok(None);
        }

        let Some(index_config) = self.config.index(self.index()) else {
            error!(index = self.index(), "No config for index");
            self.lock();
            return Ok(None);
        };

        if let Some(bucket) = DteBucket::from_dte(self.dte) {
            if index_config.thresholds.get(bucket).is_none() {
                error!(index = self.index(), %bucket, "No straddle threshold configured");
                self.lock();
                return Ok(None);
            }
        }

        let outcome = self.engine.decide(
            &index_config.underlying,
            &self.strikes,
            self.store.as_ref(),
            self.dte,
            index_config,
        )?;

        if outcome.is_some() || DteBucket::from_dte(self.dte).is_none() {
            self.lock();
        }

        Ok(outcome)
    }

    /// Polls the entry check until it decides, the session locks, or
    /// `max_attempts` checks have run (`None` polls indefinitely).
    ///
    /// Store failures are logged and retried.
    ///
    /// # Errors
    ///
    /// Currently infallible; the `Result` mirrors [`Self::run_entry_check`].
    pub async fn wait_for_entry(
        &mut self,
        poll_interval: Duration,
        max_attempts: Option<u32>,
    ) -> Result<Option<TradeContext>> {
        let mut attempts = 0u32;

        loop {
            match self.run_entry_check() {
                Ok(Some(context)) => return Ok(Some(context)),
                Ok(None) if self.entry_done => return Ok(None),
                Ok(None) => {}
                Err(e) => warn!(index = self.index(), error = %e, "Entry check failed"),
            }

            attempts += 1;
            if max_attempts.is_some_and(|max| attempts >= max) {
                warn!(index = self.index(), attempts, "No entry decision within attempt budget");
                return Ok(None);
            }

            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Routes a decision to the strategy handler.
    ///
    /// # Errors
    ///
    /// Propagates the handler's error.
    pub fn dispatch<H: StrategyHandler + ?Sized>(
        &self,
        context: &TradeContext,
        handler: &H,
    ) -> Result<()> {
        dispatch_decision(handler, context)
    }

    /// Starts monitoring the decided straddle against this session's store.
    pub fn start_monitor<F>(
        &self,
        context: TradeContext,
        interval: Duration,
        on_update: F,
    ) -> StraddleMonitor
    where
        F: FnMut(&TradeContext, &MonitorUpdate) -> Result<()> + Send + 'static,
    {
        let mut monitor = StraddleMonitor::new(Arc::clone(&self.store), context);
        monitor.start(interval, on_update);
        monitor
    }

    fn lock(&mut self) {
        self.entry_done = true;
        info!(index = self.index(), dte = self.dte, "Entry locked for the day");
    }
}
