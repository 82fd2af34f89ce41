//! Error types for loading the user directory.
//!
//! Loading is the only fallible path in the viewer: filtering, sorting and
//! highlighting are total over well-typed state.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a record load. The whole load fails on any of them.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The resource could not be read.
    #[error("Failed to load user data from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The payload is not a JSON array of user records.
    #[error("Malformed user data in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Two records share the same id.
    #[error("Duplicate user id '{id}' in user data")]
    DuplicateId { id: String },

    /// The loader thread went away without reporting a result.
    #[error("Failed to load users: loader stopped unexpectedly")]
    Disconnected,
}

pub type Result<T> = std::result::Result<T, LoadError>;
