//! # Actor Trait
//!
//! The [`Actor`] trait is the contract every routed component implements. It is the only piece
//! of user code the router needs: a declaration (who owns the unit, how large its tables should
//! start), the list of handlers, and optional lifecycle hooks.
//!
//! The runtime side ([`ActorUnit`](crate::unit::ActorUnit)) wraps an `Actor` with a mailbox and a
//! handler table. Handlers receive `&Self`, so any state they mutate lives behind interior
//! mutability; several pollers may run handlers of the same actor type on different units, and
//! direct calls are not serialized with queued ones.
//!
//! ```rust
//! use actor_router::{Actor, ActorDeclaration, Handlers};
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! #[derive(Default)]
//! struct Scoreboard {
//!     total: AtomicU64,
//! }
//!
//! impl Actor for Scoreboard {
//!     fn declaration(&self) -> ActorDeclaration {
//!         ActorDeclaration::owned_by::<Self>().with_capacity(4)
//!     }
//!
//!     fn handlers(&self, handlers: &mut Handlers<Self>) {
//!         handlers.on(300, [], |board: &Self, (points,): (i64,)| {
//!             board.total.fetch_add(points as u64, Ordering::Relaxed);
//!             Ok(())
//!         });
//!     }
//! }
//! ```

use crate::error::BoxError;
use crate::handler::Handlers;
use crate::message::Args;
use crate::scheduler::Scheduler;
use async_trait::async_trait;
use std::any::TypeId;

/// Type identity used for the self-ownership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner {
    type_id: TypeId,
    name: &'static str,
}

impl Owner {
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// What an actor declares about itself: its owner type and a capacity hint.
///
/// The owner must be the actor's own type; anything else is a configuration error that halts
/// startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorDeclaration {
    owner: Owner,
    capacity: usize,
}

impl ActorDeclaration {
    pub const DEFAULT_CAPACITY: usize = 16;

    pub fn new(owner: Owner, capacity: usize) -> Self {
        Self { owner, capacity }
    }

    pub fn owned_by<T: 'static>() -> Self {
        Self {
            owner: Owner::of::<T>(),
            capacity: Self::DEFAULT_CAPACITY,
        }
    }

    /// Initial sizing hint for the handler table and mailbox.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn owner(&self) -> Owner {
        self.owner
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// A component that can be routed to by opcode.
#[async_trait]
pub trait Actor: Send + Sync + Sized + 'static {
    /// Ownership marker and capacity hint.
    fn declaration(&self) -> ActorDeclaration;

    /// Declares the handlers this actor exposes.
    fn handlers(&self, handlers: &mut Handlers<Self>);

    /// Called once the handler table is built. A failure is logged and startup continues.
    async fn on_init(&self, _scheduler: &Scheduler) -> Result<(), BoxError> {
        Ok(())
    }

    /// Called at teardown. A failure is logged and does not stop other units' teardown.
    async fn on_destroy(&self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Preprocesses the arguments of a queued message before its handler runs.
    fn filter(&self, args: Args) -> Args {
        args
    }
}
