//! # Actor Units
//!
//! An [`ActorUnit`] is the runtime shell around one [`Actor`]: it owns the actor, its
//! [`Mailbox`] and its [`HandlerTable`], and exposes the invocation entry points the router and
//! the dispatcher use.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized --init()--> Ready --destroy()--> Destroyed
//! ```
//!
//! Only a `Ready` unit runs handlers or accepts messages. `destroy()` moves to `Destroyed`
//! before running the teardown hook, so nothing is invoked once teardown has begun.
//!
//! ## Entry points
//!
//! | Entry point | Path | Gate check | Notes |
//! |-------------|------|------------|-------|
//! | `execute_direct` | caller's thread | no | bypasses the mailbox |
//! | `execute_direct_gated` | caller's thread | yes | bypasses the mailbox |
//! | `enqueue` | mailbox | yes, under the mailbox lock | fire-and-forget |
//! | `drain_one` | polling loop | re-checked | applies [`Actor::filter`] |
//!
//! Handler failures and panics are caught at every entry point and logged; they never reach the
//! caller or the polling loop.

use crate::actor::{Actor, Owner};
use crate::error::{HandlerError, RouterError};
use crate::handler::{HandlerDescriptor, HandlerTable, Handlers, UNSET_OPCODE};
use crate::mailbox::Mailbox;
use crate::message::{Args, Message, Opcode, State};
use crate::scheduler::Scheduler;
use crate::value::Value;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, info, trace, warn};

/// Lifecycle state of an actor unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Ready,
    Destroyed,
}

/// Object-safe view of an actor unit, as seen by the router and the dispatcher.
#[async_trait]
pub trait ActorCell: Send + Sync {
    fn name(&self) -> &str;

    fn lifecycle(&self) -> Lifecycle;

    /// Opcodes currently registered, ascending.
    fn opcodes(&self) -> Vec<Opcode>;

    /// Wires the scheduler, checks the declaration, builds the handler table and runs the
    /// init hook.
    async fn init(&self, scheduler: Scheduler) -> Result<(), RouterError>;

    /// Runs the teardown hook. Never fails.
    async fn destroy(&self);

    fn execute_direct(&self, opcode: Opcode, args: &[Value]);

    fn execute_direct_gated(&self, opcode: Opcode, state: State, args: &[Value]);

    /// Queues a message if a handler for `opcode` accepts `state`.
    fn enqueue(&self, opcode: Opcode, state: State, args: Args) -> bool;

    /// Processes at most one queued message. Returns whether a message was consumed.
    fn drain_one(&self) -> bool;

    fn has_pending(&self) -> bool;

    fn pending(&self) -> usize;

    fn remove(&self, opcode: Opcode) -> bool;
}

/// Runtime shell composing an actor, its mailbox and its handler table.
pub struct ActorUnit<A: Actor> {
    name: String,
    actor: A,
    mailbox: Mailbox,
    handlers: RwLock<HandlerTable<A>>,
    lifecycle: RwLock<Lifecycle>,
    // Held while a queued message is processed so that one unit is drained by one worker at a
    // time, keeping invocation order equal to mailbox order.
    turn: Mutex<()>,
    scheduler: OnceLock<Scheduler>,
}

impl<A: Actor> ActorUnit<A> {
    pub fn new(name: impl Into<String>, actor: A) -> Arc<Self> {
        let capacity = actor.declaration().capacity();
        Arc::new(Self {
            name: name.into(),
            actor,
            mailbox: Mailbox::with_capacity(capacity),
            handlers: RwLock::new(HandlerTable::default()),
            lifecycle: RwLock::new(Lifecycle::Uninitialized),
            turn: Mutex::new(()),
            scheduler: OnceLock::new(),
        })
    }

    pub fn actor(&self) -> &A {
        &self.actor
    }

    pub fn scheduler(&self) -> Option<&Scheduler> {
        self.scheduler.get()
    }

    /// Handler registered for `opcode`, if any.
    pub fn lookup(&self, opcode: Opcode) -> Option<HandlerDescriptor<A>> {
        self.handlers.read().lookup(opcode).cloned()
    }

    fn is_ready(&self) -> bool {
        *self.lifecycle.read() == Lifecycle::Ready
    }

    fn check_owner(&self) -> Result<usize, RouterError> {
        let declaration = self.actor.declaration();
        let expected = Owner::of::<A>();
        if declaration.owner() != expected {
            error!(
                actor = %self.name,
                declared = declaration.owner().name(),
                "Actor does not declare itself as owner"
            );
            return Err(RouterError::OwnershipMismatch {
                actor: expected.name(),
                declared: declaration.owner().name(),
            });
        }
        Ok(declaration.capacity())
    }

    fn build_table(&self, capacity: usize) -> HandlerTable<A> {
        let mut declared = Handlers::with_capacity(capacity);
        self.actor.handlers(&mut declared);

        let mut table = HandlerTable::with_capacity(capacity);
        for descriptor in declared.into_declarations() {
            if descriptor.opcode() == UNSET_OPCODE {
                debug!(actor = %self.name, "Skipping handler without opcode");
                continue;
            }
            info!(actor = %self.name, ?descriptor, "Load handler");
            if table.register(descriptor).is_some() {
                debug!(actor = %self.name, "Handler declared twice, keeping the last one");
            }
        }
        table
    }

    /// Runs `call` with failures and panics contained, including those of user hooks it wraps.
    fn invoke(
        &self,
        opcode: Opcode,
        path: &'static str,
        call: impl FnOnce() -> Result<(), HandlerError>,
    ) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(call))
            .unwrap_or_else(|payload| Err(HandlerError::Panicked(panic_message(payload.as_ref()))));

        match outcome {
            Ok(()) => trace!(actor = %self.name, opcode, path, "Handler ok"),
            Err(e) => error!(actor = %self.name, opcode, path, error = %e, "Handler failed"),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[async_trait]
impl<A: Actor> ActorCell for ActorUnit<A> {
    fn name(&self) -> &str {
        &self.name
    }

    fn lifecycle(&self) -> Lifecycle {
        *self.lifecycle.read()
    }

    fn opcodes(&self) -> Vec<Opcode> {
        self.handlers.read().opcodes()
    }

    async fn init(&self, scheduler: Scheduler) -> Result<(), RouterError> {
        if self.lifecycle() != Lifecycle::Uninitialized {
            warn!(actor = %self.name, lifecycle = ?self.lifecycle(), "Init called twice");
            return Ok(());
        }

        let capacity = self.check_owner()?;
        *self.handlers.write() = self.build_table(capacity);
        let _ = self.scheduler.set(scheduler.clone());

        if let Err(e) = self.actor.on_init(&scheduler).await {
            warn!(actor = %self.name, error = %e, "Init hook failed");
        }

        *self.lifecycle.write() = Lifecycle::Ready;
        info!(actor = %self.name, handlers = self.handlers.read().len(), "Actor ready");
        Ok(())
    }

    async fn destroy(&self) {
        {
            let mut lifecycle = self.lifecycle.write();
            if *lifecycle == Lifecycle::Destroyed {
                return;
            }
            *lifecycle = Lifecycle::Destroyed;
        }

        // Wait for a drain that is already running on another worker. The turn is only ever
        // held inside the synchronous `drain_one`, never across an await point, so this blocks
        // for at most one handler invocation.
        drop(self.turn.lock());

        let dropped = self.mailbox.clear();
        if dropped > 0 {
            warn!(actor = %self.name, dropped, "Discarding queued messages");
        }

        match self.actor.on_destroy().await {
            Ok(()) => info!(actor = %self.name, "Actor destroyed"),
            Err(e) => error!(actor = %self.name, error = %e, "Teardown hook failed"),
        }
    }

    fn execute_direct(&self, opcode: Opcode, args: &[Value]) {
        if !self.is_ready() {
            debug!(actor = %self.name, opcode, "Direct call on inactive actor");
            return;
        }
        if let Some(descriptor) = self.lookup(opcode) {
            self.invoke(opcode, "direct", || descriptor.invoke(&self.actor, args));
        }
    }

    fn execute_direct_gated(&self, opcode: Opcode, state: State, args: &[Value]) {
        if !self.is_ready() {
            debug!(actor = %self.name, opcode, "Direct call on inactive actor");
            return;
        }
        match self.lookup(opcode) {
            Some(descriptor) if descriptor.permits(state) => {
                self.invoke(opcode, "direct", || descriptor.invoke(&self.actor, args))
            }
            Some(_) => debug!(actor = %self.name, opcode, state, "State not permitted"),
            None => {}
        }
    }

    fn enqueue(&self, opcode: Opcode, state: State, args: Args) -> bool {
        if !self.is_ready() {
            debug!(actor = %self.name, opcode, "Enqueue on inactive actor");
            return false;
        }
        let handlers = self.handlers.read();
        let accepted = self.mailbox.push_if(Message::new(opcode, state, args), |message| {
            handlers
                .lookup(message.opcode())
                .is_some_and(|d| d.permits(message.state()))
        });
        if !accepted {
            debug!(actor = %self.name, opcode, state, "Enqueue rejected");
        }
        accepted
    }

    fn drain_one(&self) -> bool {
        let Some(_turn) = self.turn.try_lock() else {
            return false;
        };
        if !self.is_ready() {
            return false;
        }
        let Some(message) = self.mailbox.drain() else {
            return false;
        };

        let opcode = message.opcode();
        let state = message.state();
        let Some(descriptor) = self.lookup(opcode) else {
            debug!(actor = %self.name, opcode, "Handler removed, dropping message");
            return true;
        };
        if !descriptor.permits(state) {
            debug!(actor = %self.name, opcode, state, "State not permitted, dropping message");
            return true;
        }

        self.invoke(opcode, "queued", || {
            let args = self.actor.filter(message.into_args());
            descriptor.invoke(&self.actor, &args)
        });
        true
    }

    fn has_pending(&self) -> bool {
        !self.mailbox.is_empty()
    }

    fn pending(&self) -> usize {
        self.mailbox.len()
    }

    fn remove(&self, opcode: Opcode) -> bool {
        let removed = self.handlers.write().remove(opcode).is_some();
        if removed {
            info!(actor = %self.name, opcode, "Handler removed");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorDeclaration;
    use crate::scheduler::ShutdownSignal;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Echo {
        seen: parking_lot::Mutex<Vec<Args>>,
        destroyed: AtomicUsize,
    }

    #[async_trait]
    impl Actor for Echo {
        fn declaration(&self) -> ActorDeclaration {
            ActorDeclaration::owned_by::<Self>()
        }

        fn handlers(&self, handlers: &mut Handlers<Self>) {
            handlers
                .on_raw(1, [], |echo: &Self, args| {
                    echo.seen.lock().push(args.to_vec());
                    Ok(())
                })
                .on_raw(UNSET_OPCODE, [], |_: &Self, _| Ok(()))
                .on_raw(2, [5], |_: &Self, _| panic!("boom"))
                .on_raw(3, [], |echo: &Self, args| {
                    std::thread::sleep(std::time::Duration::from_millis(50));
                    echo.seen.lock().push(args.to_vec());
                    Ok(())
                });
        }

        async fn on_destroy(&self) -> Result<(), crate::error::BoxError> {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
            Err("teardown failed".into())
        }

        fn filter(&self, mut args: Args) -> Args {
            args.push(Value::from("filtered"));
            args
        }
    }

    async fn ready_unit() -> (Arc<ActorUnit<Echo>>, ShutdownSignal) {
        let signal = ShutdownSignal::new();
        let unit = ActorUnit::new("echo", Echo::default());
        unit.init(Scheduler::current(&signal)).await.unwrap();
        (unit, signal)
    }

    #[tokio::test]
    async fn test_init_skips_unset_opcode() {
        let (unit, _signal) = ready_unit().await;
        assert_eq!(unit.lifecycle(), Lifecycle::Ready);
        assert_eq!(unit.opcodes(), vec![1, 2, 3]);
        assert!(unit.scheduler().is_some());
    }

    #[tokio::test]
    async fn test_uninitialized_unit_ignores_calls() {
        let unit = ActorUnit::new("echo", Echo::default());
        unit.execute_direct(1, &crate::args!["x"]);
        assert!(!unit.enqueue(1, 0, crate::args!["x"]));
        assert!(unit.actor().seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_queued_path_applies_filter() {
        let (unit, _signal) = ready_unit().await;
        assert!(unit.enqueue(1, 9, crate::args!["x"]));
        assert!(unit.has_pending());
        assert!(unit.drain_one());
        assert!(!unit.drain_one());
        assert_eq!(
            unit.actor().seen.lock().clone(),
            vec![crate::args!["x", "filtered"]]
        );
    }

    #[tokio::test]
    async fn test_panicking_handler_is_contained() {
        let (unit, _signal) = ready_unit().await;
        assert!(unit.enqueue(2, 5, crate::args![]));
        assert!(unit.enqueue(1, 0, crate::args!["after"]));
        assert!(unit.drain_one());
        assert!(unit.drain_one());
        assert_eq!(unit.actor().seen.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_removed_handler_drops_queued_message() {
        let (unit, _signal) = ready_unit().await;
        assert!(unit.enqueue(1, 0, crate::args!["x"]));
        assert!(unit.remove(1));
        assert!(!unit.remove(1));
        assert!(unit.drain_one());
        assert!(unit.actor().seen.lock().is_empty());
        assert!(!unit.enqueue(1, 0, crate::args!["y"]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_destroy_waits_for_running_drain() {
        let (unit, _signal) = ready_unit().await;
        assert!(unit.enqueue(3, 0, crate::args!["slow"]));

        let drainer = {
            let unit = Arc::clone(&unit);
            std::thread::spawn(move || unit.drain_one())
        };
        // the turn is taken before the message leaves the mailbox
        while unit.has_pending() {
            tokio::task::yield_now().await;
        }
        unit.destroy().await;

        assert_eq!(
            unit.actor().seen.lock().clone(),
            vec![crate::args!["slow", "filtered"]]
        );
        assert!(drainer.join().unwrap());
    }

    #[tokio::test]
    async fn test_destroy_runs_hook_once_and_discards_queue() {
        let (unit, _signal) = ready_unit().await;
        assert!(unit.enqueue(1, 0, crate::args!["x"]));
        unit.destroy().await;
        unit.destroy().await;
        assert_eq!(unit.lifecycle(), Lifecycle::Destroyed);
        assert_eq!(unit.actor().destroyed.load(Ordering::SeqCst), 1);
        assert_eq!(unit.pending(), 0);
        assert!(!unit.drain_one());
        unit.execute_direct(1, &crate::args!["late"]);
        assert!(unit.actor().seen.lock().is_empty());
    }
}
