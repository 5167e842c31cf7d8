//! # Queued Messages
//!
//! A [`Message`] is what sits in a mailbox between `enqueue` and the polling loop that drains it.

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Identifies a logical operation. Unique within one actor's handler table.
pub type Opcode = i32;

/// Sub-classifier gating whether a handler accepts a message.
pub type State = i32;

/// Argument list carried by a message.
pub type Args = Vec<Value>;

/// An opcode-tagged message waiting in a mailbox.
///
/// Messages are immutable once built and are consumed by exactly one invocation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    opcode: Opcode,
    state: State,
    args: Args,
}

impl Message {
    pub fn new(opcode: Opcode, state: State, args: Args) -> Self {
        Self {
            opcode,
            state,
            args,
        }
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn into_args(self) -> Args {
        self.args
    }
}
