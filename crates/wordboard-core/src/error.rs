use thiserror::Error;

/// Failure taxonomy shared by the store boundary, the oracle clients and
/// the agents.
///
/// `Validation` and `StateConflict` are detected at the store boundary and
/// surfaced immediately; they are never retried. A `Transport` failure
/// aborts the remainder of the current tick and the agent waits for the
/// next one.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or oversized input.
    #[error("validation failure: {0}")]
    Validation(String),

    /// Referenced task or workitem does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation attempted against an entity in the wrong status.
    #[error("state conflict: {0}")]
    StateConflict(String),

    /// Store or oracle unreachable, or a non-success response.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Unexpected store error.
    #[error("internal failure: {0}")]
    Internal(String),
}
