//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`RelayHubError`] at port boundaries.

/// Top-level error crossing port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum RelayHubError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// An integration adapter failed (device unreachable, bad response, …).
    #[error("integration error")]
    Integration(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A domain invariant was violated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("entity id must not be empty")]
    EmptyEntityId,

    #[error("invalid identifier {0:?}")]
    InvalidId(String),

    #[error("invalid relay index {0:?}, expected a positive integer")]
    InvalidRelayIndex(String),

    #[error("unsupported service {0:?}")]
    UnsupportedService(String),
}

/// A lookup did not match anything.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// Kind of thing that was looked up (e.g. `"Entity"`).
    pub entity: &'static str,
    /// The identifier that did not match.
    pub id: String,
}
