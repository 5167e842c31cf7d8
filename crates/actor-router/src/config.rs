//! # Dispatcher Configuration
//!
//! Integer tuning parameters for the dispatcher, loaded with the `config` crate.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. built-in defaults,
//! 2. an optional file (format picked from its extension, e.g. `router.toml`),
//! 3. environment variables prefixed with `ACTOR_ROUTER_`, e.g. `ACTOR_ROUTER_WORKERS=8`.
//!
//! ```toml
//! workers = 4
//! idle_workers = 0
//! router_capacity = 16
//! unit_capacity = 16
//! poll_interval_ms = 1000
//! poll_stagger_ms = 1
//! ```

use crate::error::RouterError;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Prefix of the environment variables read by [`DispatcherConfig::load`].
pub const ENV_PREFIX: &str = "ACTOR_ROUTER";

/// Tuning parameters for the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Size of the worker pool.
    pub workers: usize,
    /// Workers left without a polling loop.
    pub idle_workers: usize,
    /// Initial capacity of the routing table.
    pub router_capacity: usize,
    /// Initial capacity of the discovered unit list.
    pub unit_capacity: usize,
    /// Base delay between two ticks of a polling loop.
    pub poll_interval_ms: u64,
    /// Per-loop offset applied to both the initial delay and the interval.
    pub poll_stagger_ms: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            idle_workers: 0,
            router_capacity: 16,
            unit_capacity: 16,
            poll_interval_ms: 1000,
            poll_stagger_ms: 1,
        }
    }
}

impl DispatcherConfig {
    /// Loads defaults, then `path` if given, then `ACTOR_ROUTER_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, RouterError> {
        Self::load_layered(path, Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX).try_parsing(true)
    }

    fn load_layered(path: Option<&Path>, environment: Environment) -> Result<Self, RouterError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(environment);

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RouterError> {
        if self.workers == 0 {
            return Err(RouterError::InvalidConfig("workers must be at least 1".into()));
        }
        if self.idle_workers >= self.workers {
            return Err(RouterError::InvalidConfig(format!(
                "idle_workers ({}) must be lower than workers ({})",
                self.idle_workers, self.workers
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(RouterError::InvalidConfig(
                "poll_interval_ms must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Number of polling loops actually scheduled.
    pub fn active_pollers(&self) -> usize {
        self.workers.saturating_sub(self.idle_workers)
    }

    /// Initial delay and repeat interval of polling loop `index`.
    ///
    /// Loops start `index * stagger` apart and repeat every `interval + (index + 1) * stagger`,
    /// so no two loops wake in lockstep.
    pub fn poll_timing(&self, index: usize) -> (Duration, Duration) {
        let index = index as u64;
        let initial = Duration::from_millis(index.saturating_mul(self.poll_stagger_ms));
        let interval = Duration::from_millis(
            index
                .saturating_add(1)
                .saturating_mul(self.poll_stagger_ms)
                .saturating_add(self.poll_interval_ms),
        );
        (initial, interval)
    }
}
