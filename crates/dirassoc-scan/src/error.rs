//! Error types for directory imports.

use std::path::PathBuf;

use dirassoc_core::TreeError;
use thiserror::Error;

/// Errors that can occur while importing a directory.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Import root does not exist.
    #[error("Directory not found: {path}")]
    NotFound { path: PathBuf },

    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Import root is not a directory.
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Path cannot be expressed relative to the tree's base directory.
    #[error("{path} is outside the base directory {base:?}")]
    OutsideBase { path: PathBuf, base: String },

    /// Ignore pattern failed to compile.
    #[error("Invalid ignore pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Tree rejected an insertion.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

impl ImportError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}
