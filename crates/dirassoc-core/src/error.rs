//! Error types for tree operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building, exporting or loading a tree.
#[derive(Debug, Error)]
pub enum TreeError {
    /// Path or file name was empty.
    #[error("Path cannot be empty")]
    EmptyPath,

    /// A seeded tree needs at least one directory level in its first path.
    #[error("Path needs at least one directory level: {path}")]
    MissingDirectory { path: String },

    /// Directory segment is empty or contains invalid characters.
    #[error("Invalid directory name: {name:?}")]
    InvalidName { name: String },

    /// File name contains invalid characters.
    #[error("Invalid characters in file name: {name}")]
    InvalidFileName { name: String },

    /// File already present and overwriting was not allowed.
    #[error("File already exists in tree: {path}")]
    DuplicateEntry { path: String },

    /// Insertion was routed to a node whose name differs from the path.
    #[error("Node name {node:?} does not match the directory of {path}")]
    NameMismatch { node: String, path: String },

    /// Node handle does not belong to this tree.
    #[error("Node {id} does not exist")]
    NodeNotFound { id: usize },

    /// Loaded tree breaks a structural invariant.
    #[error("Corrupt tree: {message}")]
    CorruptTree { message: String },

    /// I/O error with path context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Persisted representation could not be read or written.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TreeError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        Self::CorruptTree {
            message: message.into(),
        }
    }
}
