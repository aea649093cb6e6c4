//! Error types for dialekt

use thiserror::Error;

/// Core error type for dialekt operations
///
/// The variants mirror how metadata retrieval degrades across drivers:
/// only `DialectUnresolved` and `ConnectionClosed` abort an operation,
/// everything else is expected to be caught close to the call site and
/// replaced with a documented default.
#[derive(Error, Debug)]
pub enum DialektError {
    /// The driver does not implement the requested metadata call.
    /// Recorded once per connection and never retried.
    #[error("Not supported: {0}")]
    Unsupported(String),

    /// A single metadata probe failed for a reason other than "unsupported".
    /// Callers log this and substitute an empty or default result.
    #[error("Metadata probe failed: {0}")]
    Probe(String),

    /// A required DDL template or setting is missing for the requested
    /// operation. Callers may skip the sub-feature without aborting.
    #[error("No configuration available: {0}")]
    NoConfiguration(String),

    /// The database product could not be identified at all.
    #[error("Cannot establish dialect: {0}")]
    DialectUnresolved(String),

    /// The connection went away mid-call.
    #[error("Connection closed")]
    ConnectionClosed,

    /// The underlying statement was interrupted by the execution context.
    #[error("Cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl DialektError {
    /// True for the failure classes that abort the in-progress operation.
    /// Everything else degrades to a logged default.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DialektError::DialectUnresolved(_) | DialektError::ConnectionClosed
        )
    }
}

/// Result type alias for dialekt operations
pub type Result<T> = std::result::Result<T, DialektError>;
