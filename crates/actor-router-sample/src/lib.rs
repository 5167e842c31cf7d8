//! # Actor Router Sample
//!
//! A small game-server host wired on `actor-router`. This library exposes the actors and the
//! lifecycle orchestrator for integration testing.

pub mod chat_actor;
pub mod lifecycle;
pub mod session_actor;
