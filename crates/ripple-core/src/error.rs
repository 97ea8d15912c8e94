//! Error types for ripple-core

use thiserror::Error;

/// Result type alias using ripple-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ripple-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Post or pending intent not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Identity provider has not signalled readiness yet
    #[error("Identity not ready: authored intents require a local identity")]
    IdentityNotReady,

    /// Intent denied by the persistence collaborator
    #[error("Remote rejected intent: {0}")]
    RemoteRejected(String),

    /// Persistence collaborator channel is closed
    #[error("Persistence channel disconnected")]
    Disconnected,
}
