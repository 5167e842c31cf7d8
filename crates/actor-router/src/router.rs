//! # Router
//!
//! The global opcode → actor unit table.
//!
//! The table is written by a single [`RouterBuilder`] during startup and then frozen into a
//! [`Router`], which is cheap to clone and read-only, so it needs no lock. When two units declare
//! the same opcode, the unit registered last wins; this is logged, not rejected.

use crate::message::{Args, Opcode, State};
use crate::unit::ActorCell;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

struct RouteTable {
    routes: HashMap<Opcode, Arc<dyn ActorCell>>,
    units: Vec<Arc<dyn ActorCell>>,
}

/// Single-writer builder for the routing table.
pub struct RouterBuilder {
    table: RouteTable,
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: RouteTable {
                routes: HashMap::with_capacity(capacity),
                units: Vec::new(),
            },
        }
    }

    /// Routes every opcode the unit currently declares to it.
    pub fn register_unit(&mut self, unit: Arc<dyn ActorCell>) -> &mut Self {
        for opcode in unit.opcodes() {
            if let Some(previous) = self.table.routes.insert(opcode, Arc::clone(&unit)) {
                if !Arc::ptr_eq(&previous, &unit) {
                    debug!(
                        opcode,
                        replaced = previous.name(),
                        actor = unit.name(),
                        "Opcode claimed by a later actor"
                    );
                }
            }
        }
        if !self.table.units.iter().any(|known| Arc::ptr_eq(known, &unit)) {
            self.table.units.push(unit);
        }
        self
    }

    pub fn build(self) -> Router {
        Router {
            table: Arc::new(self.table),
        }
    }
}

/// Read-only routing table shared by callers and polling loops.
#[derive(Clone)]
pub struct Router {
    table: Arc<RouteTable>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    fn resolve(&self, opcode: Opcode) -> Option<&Arc<dyn ActorCell>> {
        let unit = self.table.routes.get(&opcode);
        if unit.is_none() {
            trace!(opcode, "No actor owns opcode");
        }
        unit
    }

    /// Calls the owning actor's handler synchronously. Unknown opcodes are ignored.
    pub fn route(&self, opcode: Opcode, args: &[Value]) {
        if let Some(unit) = self.resolve(opcode) {
            unit.execute_direct(opcode, args);
        }
    }

    /// Like [`route`](Self::route), but only if the handler accepts `state`.
    pub fn route_gated(&self, opcode: Opcode, state: State, args: &[Value]) {
        if let Some(unit) = self.resolve(opcode) {
            unit.execute_direct_gated(opcode, state, args);
        }
    }

    /// Queues a message on the owning actor. Returns whether it was accepted.
    pub fn enqueue(&self, opcode: Opcode, state: State, args: Args) -> bool {
        self.resolve(opcode)
            .is_some_and(|unit| unit.enqueue(opcode, state, args))
    }

    /// Name of the actor owning `opcode`.
    pub fn owner_of(&self, opcode: Opcode) -> Option<&str> {
        self.table.routes.get(&opcode).map(|unit| unit.name())
    }

    pub fn contains(&self, opcode: Opcode) -> bool {
        self.table.routes.contains_key(&opcode)
    }

    /// Routed opcodes, ascending.
    pub fn opcodes(&self) -> Vec<Opcode> {
        let mut opcodes: Vec<_> = self.table.routes.keys().copied().collect();
        opcodes.sort_unstable();
        opcodes
    }

    /// Every registered unit, in registration order.
    pub fn units(&self) -> &[Arc<dyn ActorCell>] {
        &self.table.units
    }

    /// Total number of queued messages across all units.
    pub fn pending(&self) -> usize {
        self.table.units.iter().map(|unit| unit.pending()).sum()
    }

    pub fn len(&self) -> usize {
        self.table.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.routes.is_empty()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("opcodes", &self.opcodes())
            .field("units", &self.table.units.len())
            .finish()
    }
}
