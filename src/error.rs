// src/error.rs - Error taxonomy shared by segments, stash and profile
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProfileError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Operation failed: {0}")]
    OperationFailed(String),
    #[error("Conflicting parameters: {0}")]
    Conflict(String),
    #[error("Overlapping segment: {0}")]
    Overlap(String),
    #[error("There is nothing to undo")]
    NothingToUndo,
    #[error("There is nothing to redo")]
    NothingToRedo,
    #[error("Domain error: {0}")]
    Domain(String),
}

pub type Result<T> = std::result::Result<T, ProfileError>;
