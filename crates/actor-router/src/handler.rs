//! # Handlers
//!
//! A handler is an `(opcode, permitted states, callable)` triple. Actors declare theirs through a
//! [`Handlers`] builder; the unit turns the declarations into a [`HandlerTable`] during init.
//!
//! Declarations are explicit builder calls, so nothing is discovered at runtime:
//!
//! ```rust
//! use actor_router::{Handlers, HandlerError};
//!
//! struct Counter;
//!
//! let mut handlers = Handlers::<Counter>::new();
//! handlers
//!     .on(1, [], |_: &Counter, (n,): (i64,)| {
//!         if n < 0 {
//!             return Err(HandlerError::msg("negative"));
//!         }
//!         Ok(())
//!     })
//!     .on(2, [0, 1], |_: &Counter, ()| Ok(()));
//! assert_eq!(handlers.len(), 2);
//! ```

use crate::error::HandlerError;
use crate::message::{Opcode, State};
use crate::value::{FromArgs, Value};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

/// Opcode value meaning "unset"; declarations carrying it are never registered.
pub const UNSET_OPCODE: Opcode = -1;

/// Type-erased handler callable.
pub type HandlerFn<A> = Arc<dyn Fn(&A, &[Value]) -> Result<(), HandlerError> + Send + Sync>;

/// The set of states a handler accepts. Empty means any state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateGate(BTreeSet<State>);

impl StateGate {
    /// Gate accepting every state.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn only(states: impl IntoIterator<Item = State>) -> Self {
        Self(states.into_iter().collect())
    }

    pub fn permits(&self, state: State) -> bool {
        self.0.is_empty() || self.0.contains(&state)
    }

    pub fn is_wildcard(&self) -> bool {
        self.0.is_empty()
    }

    pub fn states(&self) -> impl Iterator<Item = State> + '_ {
        self.0.iter().copied()
    }
}

/// A registered handler: opcode, state gate and target callable.
pub struct HandlerDescriptor<A> {
    opcode: Opcode,
    gate: StateGate,
    target: HandlerFn<A>,
}

impl<A> HandlerDescriptor<A> {
    pub fn new(
        opcode: Opcode,
        states: impl IntoIterator<Item = State>,
        target: impl Fn(&A, &[Value]) -> Result<(), HandlerError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            opcode,
            gate: StateGate::only(states),
            target: Arc::new(target),
        }
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn gate(&self) -> &StateGate {
        &self.gate
    }

    pub fn permits(&self, state: State) -> bool {
        self.gate.permits(state)
    }

    pub fn invoke(&self, actor: &A, args: &[Value]) -> Result<(), HandlerError> {
        (self.target)(actor, args)
    }
}

impl<A> Clone for HandlerDescriptor<A> {
    fn clone(&self) -> Self {
        Self {
            opcode: self.opcode,
            gate: self.gate.clone(),
            target: Arc::clone(&self.target),
        }
    }
}

impl<A> fmt::Debug for HandlerDescriptor<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("opcode", &self.opcode)
            .field("states", &self.gate.0)
            .finish_non_exhaustive()
    }
}

/// Builder collecting an actor's handler declarations.
pub struct Handlers<A> {
    declared: Vec<HandlerDescriptor<A>>,
}

impl<A> Default for Handlers<A> {
    fn default() -> Self {
        Self {
            declared: Vec::new(),
        }
    }
}

impl<A: 'static> Handlers<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            declared: Vec::with_capacity(capacity),
        }
    }

    /// Declares a handler with a typed payload decoded from the message arguments.
    pub fn on<P, F>(&mut self, opcode: Opcode, states: impl IntoIterator<Item = State>, f: F) -> &mut Self
    where
        P: FromArgs,
        F: Fn(&A, P) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.on_raw(opcode, states, move |actor, args| f(actor, P::from_args(args)?))
    }

    /// Declares a handler receiving the raw argument list.
    pub fn on_raw<F>(&mut self, opcode: Opcode, states: impl IntoIterator<Item = State>, f: F) -> &mut Self
    where
        F: Fn(&A, &[Value]) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.declared.push(HandlerDescriptor::new(opcode, states, f));
        self
    }

    pub fn len(&self) -> usize {
        self.declared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }

    pub(crate) fn into_declarations(self) -> Vec<HandlerDescriptor<A>> {
        self.declared
    }
}

/// Per-actor mapping from opcode to handler.
pub struct HandlerTable<A> {
    entries: HashMap<Opcode, HandlerDescriptor<A>>,
}

impl<A> Default for HandlerTable<A> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<A> HandlerTable<A> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Stores the descriptor, returning the one it replaced.
    pub fn register(&mut self, descriptor: HandlerDescriptor<A>) -> Option<HandlerDescriptor<A>> {
        self.entries.insert(descriptor.opcode, descriptor)
    }

    pub fn lookup(&self, opcode: Opcode) -> Option<&HandlerDescriptor<A>> {
        self.entries.get(&opcode)
    }

    pub fn remove(&mut self, opcode: Opcode) -> Option<HandlerDescriptor<A>> {
        self.entries.remove(&opcode)
    }

    /// Registered opcodes in ascending order.
    pub fn opcodes(&self) -> Vec<Opcode> {
        let mut opcodes: Vec<_> = self.entries.keys().copied().collect();
        opcodes.sort_unstable();
        opcodes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<A> fmt::Debug for HandlerTable<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerTable")
            .field("opcodes", &self.opcodes())
            .finish()
    }
}
