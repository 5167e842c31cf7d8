//! # Dispatcher
//!
//! The dispatcher assembles the system and runs the polling loops that drain mailboxes.
//!
//! ## Startup (`init`)
//!
//! 1. Validate the configuration.
//! 2. Discover units, skipping an instance discovered twice under different names.
//! 3. Initialize each unit with a [`Scheduler`] bound to the dispatcher's shutdown signal.
//!    An ownership mismatch aborts startup.
//! 4. Freeze the [`Router`].
//! 5. Schedule `workers - idle_workers` polling loops with staggered timing
//!    (see [`DispatcherConfig::poll_timing`]).
//!
//! ## Polling
//!
//! Every tick of every loop runs [`poll_once`]: each unit with pending messages gets exactly one
//! `drain_one()`. Loops do not partition units; correctness relies on the mailbox lock and on the
//! unit's own turn lock.
//!
//! ## Shutdown (`destroy`)
//!
//! The shutdown signal stops new ticks, then every loop's task is awaited so that in-flight ticks
//! finish. Only then are the units destroyed, each in its own task so that a panicking teardown
//! hook cannot prevent the others from running. Once `destroy` returns no handler runs again.

use crate::config::DispatcherConfig;
use crate::discovery::ActorDiscovery;
use crate::error::RouterError;
use crate::router::{Router, RouterBuilder};
use crate::scheduler::{Scheduler, ShutdownSignal};
use crate::unit::ActorCell;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    Running,
    Destroyed,
}

/// Drains at most one message from every unit with pending work. Returns the number of messages
/// consumed.
pub fn poll_once(router: &Router) -> usize {
    router
        .units()
        .iter()
        .filter(|unit| unit.has_pending())
        .filter(|unit| unit.drain_one())
        .count()
}

/// Owns the worker pool, the routing table and the polling loops.
pub struct Dispatcher {
    config: DispatcherConfig,
    discovery: Box<dyn ActorDiscovery>,
    units: Vec<Arc<dyn ActorCell>>,
    router: Option<Router>,
    shutdown: ShutdownSignal,
    pollers: Vec<JoinHandle<()>>,
    phase: Phase,
}

impl Dispatcher {
    pub fn new(config: DispatcherConfig, discovery: impl ActorDiscovery + 'static) -> Self {
        let units = Vec::with_capacity(config.unit_capacity);
        Self {
            config,
            discovery: Box::new(discovery),
            units,
            router: None,
            shutdown: ShutdownSignal::new(),
            pollers: Vec::new(),
            phase: Phase::Created,
        }
    }

    /// Wires and initializes every discovered unit, builds the router and starts polling.
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(skip(self), fields(workers = self.config.workers))]
    pub async fn init(&mut self) -> Result<Router, RouterError> {
        match self.phase {
            Phase::Created => {}
            Phase::Running => return Err(RouterError::AlreadyInitialized),
            Phase::Destroyed => return Err(RouterError::Destroyed),
        }
        self.config.validate()?;

        let scheduler = self.scheduler();
        for (name, unit) in self.discovery.discover() {
            if self.units.iter().any(|known| Arc::ptr_eq(known, &unit)) {
                debug!(name = %name, actor = unit.name(), "Actor discovered twice");
                continue;
            }
            unit.init(scheduler.clone()).await?;
            self.units.push(unit);
        }

        let mut builder = RouterBuilder::with_capacity(self.config.router_capacity);
        for unit in &self.units {
            builder.register_unit(Arc::clone(unit));
        }
        let router = builder.build();

        for index in 0..self.config.active_pollers() {
            let (initial, interval) = self.config.poll_timing(index);
            let table = router.clone();
            let handle = scheduler.schedule_with_fixed_delay(initial, interval, move || {
                let drained = poll_once(&table);
                if drained > 0 {
                    trace!(poller = index, drained, "Tick");
                }
            });
            self.pollers.push(handle);
        }

        info!(
            actors = self.units.len(),
            opcodes = router.len(),
            pollers = self.pollers.len(),
            "Dispatcher started"
        );
        self.router = Some(router.clone());
        self.phase = Phase::Running;
        Ok(router)
    }

    /// Stops polling, waits for in-flight ticks, then destroys every unit. Best-effort.
    #[instrument(skip(self))]
    pub async fn destroy(&mut self) {
        if self.phase == Phase::Destroyed {
            return;
        }
        self.shutdown.trigger();

        for (index, handle) in self.pollers.drain(..).enumerate() {
            if let Err(e) = handle.await {
                error!(poller = index, error = %e, "Polling loop failed");
            }
        }

        for unit in &self.units {
            let name = unit.name().to_owned();
            let unit = Arc::clone(unit);
            if let Err(e) = tokio::spawn(async move { unit.destroy().await }).await {
                error!(actor = %name, error = %e, "Teardown panicked");
            }
        }

        self.phase = Phase::Destroyed;
        info!(actors = self.units.len(), "Dispatcher stopped");
    }

    /// Scheduler bound to this dispatcher's shutdown signal.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn scheduler(&self) -> Scheduler {
        Scheduler::new(Handle::current(), &self.shutdown)
    }

    /// Routing table, once `init` has succeeded.
    pub fn router(&self) -> Option<&Router> {
        self.router.as_ref()
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Task running polling loop `index`.
    pub fn poller(&self, index: usize) -> Option<&JoinHandle<()>> {
        self.pollers.get(index)
    }

    pub fn active_pollers(&self) -> usize {
        self.pollers.len()
    }

    pub fn units(&self) -> &[Arc<dyn ActorCell>] {
        &self.units
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_triggered()
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        if self.phase == Phase::Running {
            self.shutdown.trigger();
        }
    }
}
