//! Shared types and algorithms for the wordboard system: the prefix
//! dictionary, the subsequence enumerator, the task/workitem state machine
//! and the store/oracle contracts the agents are written against.

pub mod error;
pub mod memory;
pub mod model;
pub mod oracle;
pub mod store;
pub mod subsequence;
pub mod time;
pub mod trie;

pub use error::Error;
pub use time::{now_ms, EpochMs};
