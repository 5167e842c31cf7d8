//! # Router Errors
//!
//! This module defines the error types used throughout the router.
//!
//! There are only two families:
//!
//! - [`RouterError`] is returned while the system is being assembled (configuration loading,
//!   actor declaration checks, dispatcher lifecycle misuse). Every variant is fatal for startup.
//! - [`HandlerError`] is produced by a handler while it runs. It never travels back to the
//!   caller: the entry point that invoked the handler logs it and drops the message.
//!
//! Lookup misses (unknown opcode, state not permitted) are not errors at all.

/// Error type accepted from user lifecycle hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while configuring or starting the router. All of them halt startup.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("actor `{actor}` does not declare itself as owner (declared owner: `{declared}`)")]
    OwnershipMismatch {
        actor: &'static str,
        declared: &'static str,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to load configuration: {0}")]
    ConfigSource(#[from] config::ConfigError),
    #[error("dispatcher already initialized")]
    AlreadyInitialized,
    #[error("dispatcher has been destroyed")]
    Destroyed,
}

/// Failure reported by a handler invocation.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("expected {expected} argument(s), found {found}")]
    Arity { expected: usize, found: usize },
    #[error("argument {index}: expected {expected}, found {found}")]
    ArgumentType {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },
    #[error("handler panicked: {0}")]
    Panicked(String),
    #[error("{0}")]
    Failed(String),
    #[error("{0}")]
    Other(BoxError),
}

impl HandlerError {
    /// Plain failure with a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Wraps any error type raised by handler code.
    pub fn other(error: impl Into<BoxError>) -> Self {
        Self::Other(error.into())
    }
}
