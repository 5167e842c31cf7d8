//! # Mock Actor & Testing Guide
//!
//! [`MockActor`] is a scriptable [`Actor`] that records every invocation it receives. It lets
//! tests assert on routing, gating, ordering and failure isolation without writing a dedicated
//! actor type each time.
//!
//! ## Testing Strategies
//!
//! | Pattern | Drives | Clock |
//! |---------|--------|-------|
//! | Unit level | `ActorUnit::enqueue` + `drain_one` by hand | none |
//! | Router level | `Router::{route, enqueue}` + [`poll_once`](crate::dispatcher::poll_once) | none |
//! | Dispatcher level | `Dispatcher::init`, sleep, `Dispatcher::destroy` | `#[tokio::test(start_paused = true)]` |
//!
//! Driving `poll_once` by hand keeps tests deterministic; the dispatcher-level pattern covers
//! the real polling loops and shutdown.
//!
//! ```rust
//! use actor_router::mock::MockActor;
//! use actor_router::{args, ActorRegistry, Dispatcher, DispatcherConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut registry = ActorRegistry::new();
//!     let chat = registry.register("chat", MockActor::new().handle(10, [1]).fail_on(11));
//!
//!     let mut dispatcher = Dispatcher::new(DispatcherConfig::default(), registry);
//!     let router = dispatcher.init().await.unwrap();
//!
//!     router.route(10, &args!["hi"]);
//!     router.route(99, &args!["nobody home"]);
//!     assert_eq!(chat.actor().calls_for(10), vec![args!["hi"]]);
//!
//!     dispatcher.destroy().await;
//!     assert_eq!(chat.actor().destroy_count(), 1);
//! }
//! ```

use crate::actor::{Actor, ActorDeclaration, Owner};
use crate::error::{BoxError, HandlerError};
use crate::handler::Handlers;
use crate::message::{Args, Opcode, State};
use crate::scheduler::Scheduler;
use crate::value::Value;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One recorded handler call.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub opcode: Opcode,
    pub args: Args,
}

/// Scriptable actor recording every invocation.
#[derive(Debug)]
pub struct MockActor {
    owner: Option<Owner>,
    capacity: usize,
    routes: Vec<(Opcode, Vec<State>)>,
    failing: HashSet<Opcode>,
    panicking: HashSet<Opcode>,
    fail_init: bool,
    fail_destroy: bool,
    calls: Mutex<Vec<Invocation>>,
    inits: AtomicUsize,
    destroys: AtomicUsize,
}

impl Default for MockActor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockActor {
    pub fn new() -> Self {
        Self {
            owner: None,
            capacity: ActorDeclaration::DEFAULT_CAPACITY,
            routes: Vec::new(),
            failing: HashSet::new(),
            panicking: HashSet::new(),
            fail_init: false,
            fail_destroy: false,
            calls: Mutex::new(Vec::new()),
            inits: AtomicUsize::new(0),
            destroys: AtomicUsize::new(0),
        }
    }

    /// Declares a recording handler for `opcode`. An empty `states` accepts every state.
    pub fn handle(mut self, opcode: Opcode, states: impl IntoIterator<Item = State>) -> Self {
        self.routes.push((opcode, states.into_iter().collect()));
        self
    }

    /// Makes the handler for `opcode` return an error after recording the call.
    pub fn fail_on(mut self, opcode: Opcode) -> Self {
        self.failing.insert(opcode);
        if !self.routes.iter().any(|(op, _)| *op == opcode) {
            self.routes.push((opcode, Vec::new()));
        }
        self
    }

    /// Makes the handler for `opcode` panic after recording the call.
    pub fn panic_on(mut self, opcode: Opcode) -> Self {
        self.panicking.insert(opcode);
        if !self.routes.iter().any(|(op, _)| *op == opcode) {
            self.routes.push((opcode, Vec::new()));
        }
        self
    }

    /// Declares `T` as owner instead of `MockActor`, which init must reject.
    pub fn owned_by<T: 'static>(mut self) -> Self {
        self.owner = Some(Owner::of::<T>());
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn fail_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn fail_destroy(mut self) -> Self {
        self.fail_destroy = true;
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().clone()
    }

    /// Arguments of every call to `opcode`, in call order.
    pub fn calls_for(&self, opcode: Opcode) -> Vec<Args> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.opcode == opcode)
            .map(|call| call.args.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn init_count(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }

    pub fn destroy_count(&self) -> usize {
        self.destroys.load(Ordering::SeqCst)
    }

    fn record(&self, opcode: Opcode, args: &[Value]) -> Result<(), HandlerError> {
        self.calls.lock().push(Invocation {
            opcode,
            args: args.to_vec(),
        });
        if self.panicking.contains(&opcode) {
            panic!("mock handler {opcode} panicked");
        }
        if self.failing.contains(&opcode) {
            return Err(HandlerError::msg(format!("mock handler {opcode} failed")));
        }
        Ok(())
    }
}

#[async_trait]
impl Actor for MockActor {
    fn declaration(&self) -> ActorDeclaration {
        ActorDeclaration::new(self.owner.unwrap_or_else(Owner::of::<Self>), self.capacity)
    }

    fn handlers(&self, handlers: &mut Handlers<Self>) {
        for (opcode, states) in &self.routes {
            let opcode = *opcode;
            handlers.on_raw(opcode, states.iter().copied(), move |mock: &Self, args| {
                mock.record(opcode, args)
            });
        }
    }

    async fn on_init(&self, _scheduler: &Scheduler) -> Result<(), BoxError> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        if self.fail_init {
            return Err("mock init failed".into());
        }
        Ok(())
    }

    async fn on_destroy(&self) -> Result<(), BoxError> {
        self.destroys.fetch_add(1, Ordering::SeqCst);
        if self.fail_destroy {
            return Err("mock destroy failed".into());
        }
        Ok(())
    }
}
