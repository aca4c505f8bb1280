//! Straddle monitor. Recomputes the ATM straddle premium on a fixed cadence.
//!
//! One background task per monitor. Each iteration re-reads the call, put
//! and underlying prices for the symbols fixed in the [`TradeContext`],
//! stores the reading as the context's latest update and hands it to the
//! subscriber callback.
//!
//! # Error Handling
//!
//! Data gaps skip the iteration silently. Store failures and subscriber
//! errors or panics are logged and the loop carries on; only [`StraddleMonitor::stop`]
//! ends it.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use straddle_core::TickStore;

use crate::ticks;
use crate::types::{MonitorUpdate, TradeContext};

/// Periodic tracker for one trade context.
pub struct StraddleMonitor {
    store: Arc<dyn TickStore>,
    context: TradeContext,
    should_stop: Arc<AtomicBool>,
    wake: Arc<Notify>,
    handle: Option<JoinHandle<()>>,
}

impl StraddleMonitor {
    #[must_use]
    pub fn new(store: Arc<dyn TickStore>, context: TradeContext) -> Self {
        Self {
            store,
            context,
            should_stop: Arc::new(AtomicBool::new(false)),
            wake: Arc::new(Notify::new()),
            handle: None,
        }
    }

    /// The tracked context; clones share its latest-update slot.
    #[must_use]
    pub const fn context(&self) -> &TradeContext {
        &self.context
    }

    /// Flag observed by the loop between iterations.
    #[must_use]
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.should_stop)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Spawns the monitor loop on the current Tokio runtime.
    ///
    /// Calling `start` while the loop is running only logs a warning.
    pub fn start<F>(&mut self, interval: Duration, on_update: F)
    where
        F: FnMut(&TradeContext, &MonitorUpdate) -> Result<()> + Send + 'static,
    {
        if self.is_running() {
            warn!(strike = self.context.atm_strike, "Monitor already running");
            return;
        }

        self.should_stop.store(false, Ordering::SeqCst);
        self.wake = Arc::new(Notify::new());
        let worker = Worker {
            store: Arc::clone(&self.store),
            context: self.context.clone(),
            should_stop: Arc::clone(&self.should_stop),
            wake: Arc::clone(&self.wake),
            interval,
        };
        self.handle = Some(tokio::spawn(worker.run(on_update)));
    }

    /// Signals the loop to stop and waits at most `join_timeout` for it.
    ///
    /// If the loop has not finished by then it is aborted. Either way no
    /// callback starts after this returns.
    pub async fn stop(&mut self, join_timeout: Duration) {
        self.should_stop.store(true, Ordering::SeqCst);
        self.wake.notify_one();

        let Some(handle) = self.handle.take() else {
            return;
        };
        let abort = handle.abort_handle();

        match tokio::time::timeout(join_timeout, handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Monitor task ended abnormally"),
            Err(_) => {
                warn!(
                    timeout_ms = join_timeout.as_millis() as u64,
                    "Monitor did not stop in time, aborting"
                );
                abort.abort();
            }
        }
    }

    /// Takes one reading without storing it or notifying anyone.
    ///
    /// # Errors
    ///
    /// Returns an error only if the tick store cannot be read.
    pub fn compute_once(&self) -> Result<Option<MonitorUpdate>> {
        compute_update(self.store.as_ref(), &self.context)
    }
}

impl Drop for StraddleMonitor {
    fn drop(&mut self) {
        self.should_stop.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }
}

struct Worker {
    store: Arc<dyn TickStore>,
    context: TradeContext,
    should_stop: Arc<AtomicBool>,
    wake: Arc<Notify>,
    interval: Duration,
}

impl Worker {
    async fn run<F>(self, mut on_update: F)
    where
        F: FnMut(&TradeContext, &MonitorUpdate) -> Result<()>,
    {
        info!(
            index = %self.context.index,
            strike = self.context.atm_strike,
            interval_ms = self.interval.as_millis() as u64,
            "Monitor loop started"
        );

        while !self.should_stop.load(Ordering::SeqCst) {
            self.iterate(&mut on_update);

            tokio::select! {
                () = tokio::time::sleep(self.interval) => {}
                () = self.wake.notified() => {}
            }
        }

        info!(strike = self.context.atm_strike, "Monitor loop stopped");
    }

    fn iterate<F>(&self, on_update: &mut F)
    where
        F: FnMut(&TradeContext, &MonitorUpdate) -> Result<()>,
    {
        let computed = catch_unwind(AssertUnwindSafe(|| {
            compute_update(self.store.as_ref(), &self.context)
        }));

        let update = match computed {
            Ok(Ok(Some(update))) => update,
            Ok(Ok(None)) => return,
            Ok(Err(e)) => {
                error!(error = %e, "Monitor iteration failed");
                return;
            }
            Err(_) => {
                error!("Monitor iteration panicked");
                return;
            }
        };

        self.context.last_update.set(update.clone());

        match catch_unwind(AssertUnwindSafe(|| on_update(&self.context, &update))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(error = %e, "on_update callback failed"),
            Err(_) => error!("on_update callback panicked"),
        }
    }
}

fn compute_update(store: &dyn TickStore, context: &TradeContext) -> Result<Option<MonitorUpdate>> {
    let call_ltp = ticks::price(store, &context.call_symbol)?;
    let put_ltp = ticks::price(store, &context.put_symbol)?;
    let underlying_ltp = ticks::price(store, &context.underlying_symbol)?;

    match (call_ltp, put_ltp, underlying_ltp) {
        (Some(call), Some(put), Some(underlying)) => {
            let update = MonitorUpdate::new(call, put, underlying);
            if update.is_none() {
                warn!(call = %call, put = %put, "Monitor: straddle premium out of range");
            }
            Ok(update)
        }
        _ => {
            debug!(
                call = ?call_ltp,
                put = ?put_ltp,
                underlying = ?underlying_ltp,
                "Monitor: missing data"
            );
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntryDecision, LastUpdate};
    use chrono::Utc;
    use parking_lot::Mutex;
    use rust_decimal_macros::dec;
    use straddle_core::{IndexConfig, Tick};
    use straddle_feed::LiveDataStore;

    const UNDERLYING: &str = "NSE:NIFTY50-INDEX";
    const CALL: &str = "NSE:NIFTY25OCT24500CE";
    const PUT: &str = "NSE:NIFTY25OCT24500PE";
    const TICK: Duration = Duration::from_millis(10);

    fn context() -> TradeContext {
        TradeContext {
            index: "NIFTY".to_string(),
            dte: 0,
            decision: EntryDecision::HighRr,
            reason: "test".to_string(),
            atm_strike: 24500,
            call_symbol: CALL.to_string(),
            put_symbol: PUT.to_string(),
            underlying_symbol: UNDERLYING.to_string(),
            initial_straddle: dec!(130),
            underlying_ltp: Some(dec!(24510)),
            underlying_pct: None,
            config: IndexConfig::new(UNDERLYING, 50, dec!(120), dec!(180)),
            decided_at: Utc::now(),
            last_update: LastUpdate::default(),
        }
    }

    fn full_store() -> Arc<LiveDataStore> {
        let store = Arc::new(LiveDataStore::new());
        store.update(UNDERLYING, Tick::with_ltp(24520));
        store.update(CALL, Tick::with_ltp("75.5"));
        store.update(PUT, Tick::with_ltp(58));
        store
    }

    struct FailingStore;

    impl TickStore for FailingStore {
        fn get(&self, _symbol: &str) -> Result<Option<Tick>> {
            anyhow::bail!("store unavailable")
        }
    }

    #[test]
    fn compute_once_sums_current_premiums() {
        let monitor = StraddleMonitor::new(full_store(), context());
        let update = monitor.compute_once().unwrap().unwrap();

        assert_eq!(update.call_ltp, dec!(75.5));
        assert_eq!(update.put_ltp, dec!(58));
        assert_eq!(update.straddle, dec!(133.5));
        assert_eq!(update.underlying_ltp, dec!(24520));
        assert!(monitor.context().latest().is_none());
    }

    #[test]
    fn compute_once_skips_overflowing_premiums() {
        let store = full_store();
        store.update(CALL, Tick::with_ltp("79228162514264337593543950335"));
        store.update(PUT, Tick::with_ltp("79228162514264337593543950335"));
        let monitor = StraddleMonitor::new(store, context());

        assert!(monitor.compute_once().unwrap().is_none());
    }

    #[test]
    fn compute_once_skips_on_gap() {
        let store = full_store();
        store.remove(PUT);
        let monitor = StraddleMonitor::new(store, context());

        assert!(monitor.compute_once().unwrap().is_none());
    }

    #[tokio::test]
    async fn delivers_updates_and_stores_latest() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut monitor = StraddleMonitor::new(full_store(), context());
        monitor.start(TICK, move |_ctx, update| {
            sink.lock().push(update.clone());
            Ok(())
        });
        assert!(monitor.is_running());

        tokio::time::sleep(TICK * 8).await;
        monitor.stop(Duration::from_secs(1)).await;
        assert!(!monitor.is_running());

        let seen = seen.lock();
        assert!(seen.len() >= 2);
        assert!(seen.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert_eq!(monitor.context().latest().as_ref(), seen.last());
    }

    #[tokio::test]
    async fn failing_and_panicking_callbacks_do_not_stop_loop() {
        let calls = Arc::new(Mutex::new(0u32));
        let counter = Arc::clone(&calls);

        let mut monitor = StraddleMonitor::new(full_store(), context());
        monitor.start(TICK, move |_ctx, _update| {
            let mut n = counter.lock();
            *n += 1;
            match *n {
                1 => anyhow::bail!("subscriber error"),
                2 => panic!("subscriber bug"),
                _ => Ok(()),
            }
        });

        tokio::time::sleep(TICK * 10).await;
        assert!(monitor.is_running());
        monitor.stop(Duration::from_secs(1)).await;

        assert!(*calls.lock() >= 3);
    }

    #[tokio::test]
    async fn store_failure_is_survived() {
        let calls = Arc::new(Mutex::new(0u32));
        let counter = Arc::clone(&calls);

        let mut monitor = StraddleMonitor::new(Arc::new(FailingStore), context());
        monitor.start(TICK, move |_ctx, _update| {
            *counter.lock() += 1;
            Ok(())
        });

        tokio::time::sleep(TICK * 5).await;
        assert!(monitor.is_running());
        monitor.stop(Duration::from_secs(1)).await;

        assert_eq!(*calls.lock(), 0);
    }

    #[tokio::test]
    async fn second_start_is_ignored() {
        let calls = Arc::new(Mutex::new(0u32));
        let first = Arc::clone(&calls);

        let mut monitor = StraddleMonitor::new(full_store(), context());
        monitor.start(Duration::from_secs(60), move |_ctx, _update| {
            *first.lock() += 1;
            Ok(())
        });
        monitor.start(Duration::from_secs(60), |_ctx, _update| {
            panic!("replacement callback must never run")
        });

        tokio::time::sleep(TICK * 3).await;
        monitor.stop(Duration::from_secs(1)).await;

        assert_eq!(*calls.lock(), 1);
    }

    #[tokio::test]
    async fn stop_wakes_a_long_sleep() {
        let mut monitor = StraddleMonitor::new(full_store(), context());
        monitor.start(Duration::from_secs(3600), |_ctx, _update| Ok(()));
        tokio::time::sleep(TICK).await;

        let started = std::time::Instant::now();
        monitor.stop(Duration::from_secs(5)).await;

        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!monitor.is_running());
    }

    #[tokio::test]
    async fn can_restart_after_stop() {
        let calls = Arc::new(Mutex::new(0u32));

        let mut monitor = StraddleMonitor::new(full_store(), context());
        for _ in 0..2 {
            let counter = Arc::clone(&calls);
            monitor.start(Duration::from_secs(60), move |_ctx, _update| {
                *counter.lock() += 1;
                Ok(())
            });
            tokio::time::sleep(TICK * 3).await;
            monitor.stop(Duration::from_secs(1)).await;
        }

        assert_eq!(*calls.lock(), 2);
    }
}
