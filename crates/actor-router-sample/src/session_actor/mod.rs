//! # Session Actor
//!
//! Tracks which players are logged in.
//!
//! ## Opcodes
//!
//! | Opcode | Permitted states | Arguments | Effect |
//! |--------|------------------|-----------|--------|
//! | [`LOGIN`] | [`GUEST`] | `(user,)` | opens a session |
//! | [`LOGOUT`] | [`ONLINE`] | `(user,)` | closes the session |
//! | [`HEARTBEAT`] | any | `(user,)` | counts a keep-alive |
//!
//! The state attached to a message is the sender's session state at the time it was sent, so a
//! login is rejected at enqueue time for a player already known to be online.
//!
//! ## Background sweep
//!
//! On init the actor schedules a fixed-rate sweep on the dispatcher's [`Scheduler`] that logs
//! the number of open sessions. It stops with the dispatcher.

pub mod error;

pub use error::*;

use actor_router::{Actor, ActorDeclaration, BoxError, Handlers, Opcode, Scheduler, State};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const LOGIN: Opcode = 100;
pub const LOGOUT: Opcode = 101;
pub const HEARTBEAT: Opcode = 102;

/// Player without a session.
pub const GUEST: State = 0;
/// Player with an open session.
pub const ONLINE: State = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: String,
    pub heartbeats: u64,
}

#[derive(Debug)]
pub struct SessionActor {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    sweep_every: Duration,
}

impl Default for SessionActor {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionActor {
    pub fn new() -> Self {
        Self::with_sweep(Duration::from_secs(30))
    }

    pub fn with_sweep(sweep_every: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            sweep_every,
        }
    }

    /// Current state of `user`: [`ONLINE`] or [`GUEST`].
    pub fn state_of(&self, user: &str) -> State {
        if self.sessions.read().contains_key(user) {
            ONLINE
        } else {
            GUEST
        }
    }

    pub fn session(&self, user: &str) -> Option<Session> {
        self.sessions.read().get(user).cloned()
    }

    /// Logged-in users, sorted.
    pub fn online(&self) -> Vec<String> {
        let mut users: Vec<_> = self.sessions.read().keys().cloned().collect();
        users.sort();
        users
    }

    fn login(&self, user: String) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write();
        if sessions.contains_key(&user) {
            return Err(SessionError::AlreadyLoggedIn(user));
        }
        info!(user = %user, "Login");
        sessions.insert(
            user.clone(),
            Session {
                user,
                heartbeats: 0,
            },
        );
        Ok(())
    }

    fn logout(&self, user: String) -> Result<(), SessionError> {
        match self.sessions.write().remove(&user) {
            Some(session) => {
                info!(user = %user, heartbeats = session.heartbeats, "Logout");
                Ok(())
            }
            None => Err(SessionError::NotLoggedIn(user)),
        }
    }

    fn heartbeat(&self, user: String) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write();
        let session = sessions
            .get_mut(&user)
            .ok_or(SessionError::NotLoggedIn(user))?;
        session.heartbeats += 1;
        Ok(())
    }
}

#[async_trait]
impl Actor for SessionActor {
    fn declaration(&self) -> ActorDeclaration {
        ActorDeclaration::owned_by::<Self>().with_capacity(4)
    }

    fn handlers(&self, handlers: &mut Handlers<Self>) {
        handlers
            .on(LOGIN, [GUEST], |actor: &Self, (user,): (String,)| {
                Ok(actor.login(user)?)
            })
            .on(LOGOUT, [ONLINE], |actor: &Self, (user,): (String,)| {
                Ok(actor.logout(user)?)
            })
            .on(HEARTBEAT, [], |actor: &Self, (user,): (String,)| {
                Ok(actor.heartbeat(user)?)
            });
    }

    async fn on_init(&self, scheduler: &Scheduler) -> Result<(), BoxError> {
        let sessions = Arc::clone(&self.sessions);
        scheduler.schedule_at_fixed_rate(self.sweep_every, self.sweep_every, move || {
            debug!(online = sessions.read().len(), "Session sweep");
        });
        Ok(())
    }

    async fn on_destroy(&self) -> Result<(), BoxError> {
        let dropped = self.sessions.write().drain().count();
        if dropped > 0 {
            info!(dropped, "Closing open sessions");
        }
        Ok(())
    }
}
