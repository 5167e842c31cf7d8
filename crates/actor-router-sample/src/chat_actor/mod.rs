//! # Chat Actor
//!
//! Keeps a bounded history of chat lines. Only players in the [`ONLINE`] state may speak:
//! a [`SAY`] carrying any other state is refused at enqueue time.
//!
//! Queued text goes through [`Actor::filter`] first, which trims surrounding whitespace, so
//! `"  hi  "` is stored as `"hi"` and a blank line is rejected as empty.

pub mod error;

pub use error::*;

use crate::session_actor::ONLINE;
use actor_router::{Actor, ActorDeclaration, Args, Handlers, Opcode, Value};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::info;

pub const SAY: Opcode = 200;

/// Longest accepted line, in characters.
pub const MAX_LINE: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub user: String,
    pub text: String,
}

#[derive(Debug)]
pub struct ChatActor {
    history: Mutex<VecDeque<ChatLine>>,
    keep: usize,
}

impl ChatActor {
    /// Chat room remembering the last `keep` lines.
    pub fn new(keep: usize) -> Self {
        Self {
            history: Mutex::new(VecDeque::with_capacity(keep)),
            keep,
        }
    }

    /// Remembered lines, oldest first.
    pub fn history(&self) -> Vec<ChatLine> {
        self.history.lock().iter().cloned().collect()
    }

    fn say(&self, user: String, text: String) -> Result<(), ChatError> {
        if text.is_empty() {
            return Err(ChatError::Empty(user));
        }
        let len = text.chars().count();
        if len > MAX_LINE {
            return Err(ChatError::TooLong { len, max: MAX_LINE });
        }

        info!(user = %user, "Chat line");
        let mut history = self.history.lock();
        if history.len() == self.keep {
            history.pop_front();
        }
        if self.keep > 0 {
            history.push_back(ChatLine { user, text });
        }
        Ok(())
    }
}

impl Actor for ChatActor {
    fn declaration(&self) -> ActorDeclaration {
        ActorDeclaration::owned_by::<Self>().with_capacity(2)
    }

    fn handlers(&self, handlers: &mut Handlers<Self>) {
        handlers.on(SAY, [ONLINE], |actor: &Self, (user, text): (String, String)| {
            Ok(actor.say(user, text)?)
        });
    }

    fn filter(&self, args: Args) -> Args {
        args.into_iter()
            .map(|value| match value {
                Value::Str(text) => Value::Str(text.trim().to_owned()),
                other => other,
            })
            .collect()
    }
}
