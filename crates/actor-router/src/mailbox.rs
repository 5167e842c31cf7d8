//! # Mailbox
//!
//! The FIFO queue private to one actor unit.
//!
//! Every mutating operation (`push`, `push_if`, `drain`, `clear`) takes the **exclusive** side of
//! the lock; only the emptiness/length probes take the shared side. Draining is a
//! check-then-pop, so running it under a shared lock would let two pollers race on the same head.

use crate::message::Message;
use parking_lot::RwLock;
use std::collections::VecDeque;

/// FIFO message queue guarded by a reader/writer lock.
#[derive(Debug, Default)]
pub struct Mailbox {
    queue: RwLock<VecDeque<Message>>,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Appends a message to the tail.
    pub fn push(&self, message: Message) {
        self.queue.write().push_back(message);
    }

    /// Appends a message only if `accept` approves it.
    ///
    /// `accept` runs while the exclusive lock is held, so the check and the push are atomic
    /// with respect to every other mailbox operation.
    pub fn push_if(&self, message: Message, accept: impl FnOnce(&Message) -> bool) -> bool {
        let mut queue = self.queue.write();
        if !accept(&message) {
            return false;
        }
        queue.push_back(message);
        true
    }

    /// Pops the head of the queue.
    pub fn drain(&self) -> Option<Message> {
        self.queue.write().pop_front()
    }

    /// Drops every pending message, returning how many were discarded.
    pub fn clear(&self) -> usize {
        let mut queue = self.queue.write();
        let dropped = queue.len();
        queue.clear();
        dropped
    }

    pub fn is_empty(&self) -> bool {
        self.queue.read().is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.read().len()
    }
}
