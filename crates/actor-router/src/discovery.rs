//! # Actor Discovery
//!
//! The dispatcher does not know where actor units come from. At init it asks an
//! [`ActorDiscovery`] for a name → unit mapping. [`ActorRegistry`] is the explicit registry used
//! when the host wires units by hand.

use crate::actor::Actor;
use crate::unit::{ActorCell, ActorUnit};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Source of the actor units to route to.
pub trait ActorDiscovery: Send + Sync {
    /// Every unit, keyed by name. The iteration order is the registration order used to resolve
    /// opcode conflicts.
    fn discover(&self) -> Vec<(String, Arc<dyn ActorCell>)>;
}

/// Explicit, name-ordered registry of actor units.
#[derive(Default, Clone)]
pub struct ActorRegistry {
    units: BTreeMap<String, Arc<dyn ActorCell>>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps `actor` in a unit named `name` and registers it. Returns the typed unit so the
    /// caller can keep a handle on the actor.
    pub fn register<A: Actor>(&mut self, name: impl Into<String>, actor: A) -> Arc<ActorUnit<A>> {
        let name = name.into();
        let unit = ActorUnit::new(name.clone(), actor);
        self.units.insert(name, unit.clone());
        unit
    }

    /// Registers an existing unit under `name`, replacing any unit already there.
    pub fn insert(&mut self, name: impl Into<String>, unit: Arc<dyn ActorCell>) {
        self.units.insert(name.into(), unit);
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl ActorDiscovery for ActorRegistry {
    fn discover(&self) -> Vec<(String, Arc<dyn ActorCell>)> {
        self.units
            .iter()
            .map(|(name, unit)| (name.clone(), Arc::clone(unit)))
            .collect()
    }
}

impl<F> ActorDiscovery for F
where
    F: Fn() -> Vec<(String, Arc<dyn ActorCell>)> + Send + Sync,
{
    fn discover(&self) -> Vec<(String, Arc<dyn ActorCell>)> {
        self()
    }
}
