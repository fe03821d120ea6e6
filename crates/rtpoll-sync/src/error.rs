//! Error types for the synchronisation primitives.

use std::io;

/// Errors raised while creating or signalling a primitive.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The underlying socket pair could not be created or configured.
    #[error("Failed to create signalling descriptor: {0}")]
    Create(#[source] io::Error),

    /// Writing the wake-up byte failed for a reason other than a full buffer.
    #[error("Failed to post signal: {0}")]
    Post(#[source] io::Error),
}

/// Result alias for synchronisation operations.
pub type SyncResult<T = ()> = Result<T, SyncError>;
