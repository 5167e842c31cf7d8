//! # Observability & Tracing
//!
//! The router logs through the `tracing` crate with structured fields (`actor`, `opcode`,
//! `state`, `path`). [`setup_tracing`] installs a compact subscriber filtered by `RUST_LOG`.
//!
//! ## What Gets Traced
//!
//! - **info**: handler loaded, actor ready/destroyed, dispatcher started/stopped
//! - **debug**: rejected enqueues, gate misses, opcode conflicts between actors
//! - **trace**: every successful invocation, every productive polling tick
//! - **warn**: init hook failures, messages discarded at teardown
//! - **error**: handler failures and panics, teardown failures, ownership mismatches
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run -p actor-router-sample
//! RUST_LOG=actor_router=trace cargo run -p actor-router-sample
//! ```

/// Installs a compact, `RUST_LOG`-filtered subscriber.
///
/// Call once from the binary's `main`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
