//! Controller-specific error types

use shared::SharedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("allocator worker hung up mid-mission")]
    AllocatorGone,

    #[error("path synthesis failed: {reason}")]
    PathSynthesis { reason: String },

    #[error("invalid scenario: {reason}")]
    Scenario { reason: String },

    #[error("shared component error")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type ControllerResult<T> = Result<T, ControllerError>;
