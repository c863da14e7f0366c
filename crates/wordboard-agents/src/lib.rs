//! The three blackboard agents and the HTTP clients they share.
//!
//! Each agent is written against the [`wordboard_core::store::BlackboardStore`]
//! and [`wordboard_core::oracle::WordOracle`] contracts so the tick logic
//! runs identically against the in-memory store in tests and the remote
//! daemon in production.

pub mod client;
pub mod consumer;
pub mod scheduler;
pub mod watcher;
