//! Core types for dirassoc.
//!
//! This crate provides the association tree: a case-insensitive directory
//! hierarchy that maps directories and files to caller-defined values, along
//! with flat export, JSON persistence and configuration.
//!
//! # Example
//!
//! ```rust
//! use dirassoc_core::{AssociationTree, TreeConfig};
//!
//! let config = TreeConfig::builder().separator('/').build().unwrap();
//! let mut tree = AssociationTree::with_config("/data", &config);
//! tree.add_file("Archive/2020/report.csv", "quarterly", true).unwrap();
//!
//! let dir = tree.find_directory("archive/2020").unwrap();
//! assert_eq!(tree.directory(dir), "/data/archive/2020");
//! assert_eq!(tree.get_file("ARCHIVE/2020/REPORT.CSV"), Some(&"quarterly"));
//! ```

mod config;
mod error;
mod export;
mod name;
mod node;
mod persist;
mod tree;

pub use config::{TreeConfig, TreeConfigBuilder};
pub use error::TreeError;
pub use export::{COLUMN_ASSOCIATION, COLUMN_DIRECTORY, COLUMN_FILE};
pub use name::{
    INVALID_FILE_NAME_CHARS, INVALID_PATH_CHARS, normalize, validate_directory_name,
    validate_file_name,
};
pub use node::{Node, NodeId};
pub use tree::{AssociationTree, PreOrder, TreeStats};
