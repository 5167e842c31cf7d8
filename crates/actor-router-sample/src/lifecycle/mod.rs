//! # Game Server Lifecycle
//!
//! [`GameServer`] is the orchestrator of the sample: it registers the actors, starts the
//! [`Dispatcher`], and translates player intents into opcode messages.
//!
//! ## Startup
//!
//! ```rust,ignore
//! let mut registry = ActorRegistry::new();
//! let sessions = registry.register("sessions", SessionActor::new());
//! let chat = registry.register("chat", ChatActor::new(64));
//!
//! let mut dispatcher = Dispatcher::new(config, registry);
//! let router = dispatcher.init().await?;
//! ```
//!
//! The typed unit handles returned by `register` stay with the server so it can read actor
//! state (who is online, the chat history) without going through the router.
//!
//! ## Message State
//!
//! Every message carries the sender's session state, looked up when the message is sent.
//! Handler gates then decide acceptance: a guest cannot chat, an online player cannot log in
//! twice. Because the lookup happens at send time, two logins sent back to back are both
//! accepted and the second one fails inside the handler.
//!
//! ## Shutdown
//!
//! [`GameServer::shutdown`] destroys the dispatcher: polling stops, messages still queued are
//! discarded, and each actor's teardown hook runs once.

use crate::chat_actor::{ChatActor, ChatLine, SAY};
use crate::session_actor::{SessionActor, HEARTBEAT, LOGIN, LOGOUT};
use actor_router::{
    args, ActorRegistry, ActorUnit, Args, Dispatcher, DispatcherConfig, Opcode, Router,
    RouterError,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Lines of chat history the server keeps.
pub const CHAT_HISTORY: usize = 64;

pub struct GameServer {
    pub sessions: Arc<ActorUnit<SessionActor>>,
    pub chat: Arc<ActorUnit<ChatActor>>,
    router: Router,
    dispatcher: Dispatcher,
}

impl GameServer {
    pub async fn start(config: DispatcherConfig) -> Result<Self, RouterError> {
        let mut registry = ActorRegistry::new();
        let sessions = registry.register("sessions", SessionActor::new());
        let chat = registry.register("chat", ChatActor::new(CHAT_HISTORY));

        let mut dispatcher = Dispatcher::new(config, registry);
        let router = dispatcher.init().await?;
        info!(opcodes = ?router.opcodes(), "Game server started");

        Ok(Self {
            sessions,
            chat,
            router,
            dispatcher,
        })
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn login(&self, user: &str) -> bool {
        self.send(LOGIN, user, args![user])
    }

    pub fn logout(&self, user: &str) -> bool {
        self.send(LOGOUT, user, args![user])
    }

    pub fn heartbeat(&self, user: &str) -> bool {
        self.send(HEARTBEAT, user, args![user])
    }

    pub fn say(&self, user: &str, text: &str) -> bool {
        self.send(SAY, user, args![user, text])
    }

    pub fn online(&self) -> Vec<String> {
        self.sessions.actor().online()
    }

    pub fn history(&self) -> Vec<ChatLine> {
        self.chat.actor().history()
    }

    /// Waits until every queued message has been picked up by a polling loop.
    pub async fn settle(&self) {
        while self.router.pending() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tokio::task::yield_now().await;
    }

    pub async fn shutdown(mut self) {
        self.dispatcher.destroy().await;
        info!("Game server stopped");
    }

    fn send(&self, opcode: Opcode, user: &str, args: Args) -> bool {
        let state = self.sessions.actor().state_of(user);
        let accepted = self.router.enqueue(opcode, state, args);
        if !accepted {
            info!(user, opcode, state, "Request refused");
        }
        accepted
    }
}
