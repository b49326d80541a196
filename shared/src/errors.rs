//! Shared error types for the swarm coordination system

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("link closed: {context}")]
    LinkClosed { context: String },

    #[error("malformed roster: {reason}")]
    MalformedRoster { reason: String },

    #[error("serialization failed: {message}")]
    SerializationError { message: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
