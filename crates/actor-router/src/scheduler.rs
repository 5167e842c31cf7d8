//! # Scheduler & Shutdown
//!
//! [`Scheduler`] is the handle onto the dispatcher's worker pool. The dispatcher uses it to run
//! its polling loops, and hands a clone to every actor unit at init so actors can schedule work of
//! their own (timers, periodic jobs, blocking work).
//!
//! Every task started through a `Scheduler` observes the same [`ShutdownSignal`]: once it fires,
//! recurring tasks stop before their next run and delayed tasks that have not started yet are
//! skipped. A run that has already started always finishes; awaiting the returned
//! [`JoinHandle`] is how callers wait for that.

use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// One-shot, broadcast shutdown flag.
#[derive(Debug)]
pub struct ShutdownSignal {
    tx: watch::Sender<bool>,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Fires the signal. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Resolves once shutdown has been triggered, or once the signal itself is gone.
async fn stopped(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

/// Handle onto the worker pool, bound to a shutdown signal.
#[derive(Debug, Clone)]
pub struct Scheduler {
    runtime: Handle,
    shutdown: watch::Receiver<bool>,
}

impl Scheduler {
    pub fn new(runtime: Handle, signal: &ShutdownSignal) -> Self {
        Self {
            runtime,
            shutdown: signal.subscribe(),
        }
    }

    /// Scheduler on the runtime of the calling task.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn current(signal: &ShutdownSignal) -> Self {
        Self::new(Handle::current(), signal)
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Runs a blocking closure on the pool. Skipped if shutdown has already been triggered.
    pub fn execute<F>(&self, f: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let shutdown = self.shutdown.clone();
        self.runtime.spawn_blocking(move || {
            if !*shutdown.borrow() {
                f();
            }
        })
    }

    /// Runs `f` once after `delay`, unless shutdown fires first.
    pub fn schedule<F>(&self, delay: Duration, f: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut shutdown = self.shutdown.clone();
        self.runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = stopped(&mut shutdown) => {}
                _ = time::sleep(delay) => f(),
            }
        })
    }

    /// Runs `f` every `period`, measured from run start to run start. Late runs are skipped
    /// rather than bursted.
    pub fn schedule_at_fixed_rate<F>(&self, initial_delay: Duration, period: Duration, f: F) -> JoinHandle<()>
    where
        F: FnMut() + Send + 'static,
    {
        self.recurring(initial_delay, period, MissedTickBehavior::Skip, f)
    }

    /// Runs `f` repeatedly, waiting `delay` between the end of one run and the start of the next.
    pub fn schedule_with_fixed_delay<F>(&self, initial_delay: Duration, delay: Duration, f: F) -> JoinHandle<()>
    where
        F: FnMut() + Send + 'static,
    {
        self.recurring(initial_delay, delay, MissedTickBehavior::Delay, f)
    }

    fn recurring<F>(
        &self,
        initial_delay: Duration,
        period: Duration,
        missed: MissedTickBehavior,
        mut f: F,
    ) -> JoinHandle<()>
    where
        F: FnMut() + Send + 'static,
    {
        let mut shutdown = self.shutdown.clone();
        // tokio intervals reject a zero period
        let period = period.max(Duration::from_millis(1));
        self.runtime.spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + initial_delay, period);
            ticker.set_missed_tick_behavior(missed);
            loop {
                tokio::select! {
                    biased;
                    _ = stopped(&mut shutdown) => break,
                    _ = ticker.tick() => f(),
                }
            }
        })
    }
}
