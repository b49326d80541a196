//! Allocator-specific error types

use shared::SharedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AllocatorError {
    #[error("malformed roster: {reason}")]
    MalformedRoster { reason: String },

    #[error("controller hung up the {channel} channel")]
    ChannelClosed { channel: &'static str },

    #[error("shared component error")]
    SharedError(#[from] SharedError),
}

pub type AllocatorResult<T> = Result<T, AllocatorError>;
