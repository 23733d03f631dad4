//! Error types for the virtual filesystem.

use thiserror::Error;

use crate::fs::{FileMode, NodeKind};

/// Errors that can occur while walking or mutating the tree.
#[derive(Error, Debug)]
pub enum VfsError {
    #[error("Not found: '{segment}' in '{path}'")]
    NotFound { segment: String, path: String },

    #[error("Value for '{path}' is not of type '{expected}'")]
    TypeMismatch { path: String, expected: NodeKind },

    #[error("{0}")]
    InvalidState(String),

    #[error("Cannot write binary data to {mode} file '{name}'")]
    ModeMismatch { name: String, mode: FileMode },

    #[error("Invalid node name '{name}': names must be non-empty and free of '/' and '\\'")]
    InvalidName { name: String },

    #[error("Cannot append '{name}' into itself or one of its descendants")]
    Cycle { name: String },

    #[error("Drive not mounted: {0}")]
    DriveNotMounted(String),

    #[error("Drive already mounted: {0}")]
    DriveExists(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VfsError {
    /// Error raised by any guarded operation on a closed file.
    pub(crate) fn closed_file() -> Self {
        VfsError::InvalidState("I/O operation on closed file".to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, VfsError::NotFound { .. })
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, VfsError::TypeMismatch { .. })
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, VfsError::InvalidState(_))
    }
}

/// Result type for filesystem operations.
pub type VfsResult<T> = Result<T, VfsError>;
