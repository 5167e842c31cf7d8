//! # Actor Router
//!
//! An in-process, opcode-addressed actor router. Callers submit opcode-tagged messages; each
//! registered actor owns a private mailbox and a table of opcode/state-gated handlers; a pool of
//! polling workers drains the mailboxes and runs the handlers.
//!
//! ## Architecture Overview
//!
//! The crate is layered leaves first:
//!
//! 1. **[`Mailbox`]** - FIFO queue behind a reader/writer lock, one per actor.
//! 2. **[`HandlerTable`]** - opcode → [`HandlerDescriptor`] (state gate + callable), one per actor.
//! 3. **[`ActorUnit`]** - composes an [`Actor`], its mailbox and its handler table; exposes the
//!    direct and queued entry points and the init/destroy lifecycle.
//! 4. **[`Router`]** - the global opcode → unit table, frozen after startup.
//! 5. **[`Dispatcher`]** - discovers units, builds the router and runs the polling loops.
//!
//! ```text
//! caller ──route()──────────────▶ ActorUnit::execute_direct ──▶ handler
//!        └─enqueue()──▶ Mailbox ◀──drain_one()── polling loop (×K) ──▶ handler
//! ```
//!
//! ## Declaring an Actor
//!
//! Actors are plain types implementing [`Actor`]. Handlers are declared explicitly, with the
//! opcode, the permitted states (empty = any) and either a typed payload or the raw
//! [`Value`] list:
//!
//! ```rust
//! use actor_router::{args, Actor, ActorDeclaration, ActorRegistry, Dispatcher, DispatcherConfig, Handlers};
//! use parking_lot::Mutex;
//!
//! #[derive(Default)]
//! struct Greeter {
//!     greeted: Mutex<Vec<String>>,
//! }
//!
//! impl Actor for Greeter {
//!     fn declaration(&self) -> ActorDeclaration {
//!         ActorDeclaration::owned_by::<Self>()
//!     }
//!
//!     fn handlers(&self, handlers: &mut Handlers<Self>) {
//!         // opcode 10, only for messages in state 1
//!         handlers.on(10, [1], |greeter: &Self, (name,): (String,)| {
//!             greeter.greeted.lock().push(name);
//!             Ok(())
//!         });
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut registry = ActorRegistry::new();
//!     let greeter = registry.register("greeter", Greeter::default());
//!
//!     let config = DispatcherConfig { poll_interval_ms: 5, ..Default::default() };
//!     let mut dispatcher = Dispatcher::new(config, registry);
//!     let router = dispatcher.init().await.unwrap();
//!
//!     assert!(router.enqueue(10, 1, args!["alice"]));
//!     assert!(!router.enqueue(10, 2, args!["bob"])); // state 2 is not permitted
//!
//!     tokio::time::sleep(std::time::Duration::from_millis(50)).await;
//!     dispatcher.destroy().await;
//!     assert_eq!(*greeter.actor().greeted.lock(), vec!["alice".to_string()]);
//! }
//! ```
//!
//! ## Concurrency Model
//!
//! - Within one actor, messages are processed strictly in enqueue order, one at a time.
//! - Across actors there is no ordering guarantee.
//! - Delivery is at-most-once: a handler failure drops the message, and messages still queued at
//!   shutdown are discarded.
//! - Handlers run to completion on the worker that drained their message; they must not block
//!   indefinitely.
//!
//! ## Error Handling
//!
//! Only startup can fail ([`RouterError`]). Handler failures ([`HandlerError`]) and panics are
//! caught where the handler was invoked, logged, and never cross an actor boundary.
//!
//! ## Testing
//!
//! The [`mock`] module provides [`MockActor`](mock::MockActor), a scriptable actor that records
//! invocations and can be told to fail.

pub mod actor;
pub mod config;
pub mod discovery;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod mailbox;
pub mod message;
pub mod mock;
pub mod router;
pub mod scheduler;
pub mod tracing;
pub mod unit;
pub mod value;

// Re-export core types for convenience
pub use actor::{Actor, ActorDeclaration, Owner};
pub use config::DispatcherConfig;
pub use discovery::{ActorDiscovery, ActorRegistry};
pub use dispatcher::{poll_once, Dispatcher};
pub use error::{BoxError, HandlerError, RouterError};
pub use handler::{HandlerDescriptor, HandlerTable, Handlers, StateGate, UNSET_OPCODE};
pub use mailbox::Mailbox;
pub use message::{Args, Message, Opcode, State};
pub use router::{Router, RouterBuilder};
pub use scheduler::{Scheduler, ShutdownSignal};
pub use unit::{ActorCell, ActorUnit, Lifecycle};
pub use value::{FromArgs, FromValue, Value};
