//! Directory import for dirassoc.
//!
//! This crate walks a real directory with jwalk and inserts every file into
//! an [`AssociationTree`], computing each association from the file's path.
//!
//! # Overview
//!
//! - **Relative storage**: files are keyed by their path relative to the
//!   tree's base directory, so the saved tree can be relocated
//! - **Deterministic order**: entries are visited sorted by name
//! - **Configurable** recursion, ignore patterns and hidden-file handling
//!
//! # Example
//!
//! ```rust,no_run
//! use dirassoc_scan::{AssociationTree, DirectoryImporter, ImportConfig};
//!
//! let mut tree: AssociationTree<u64> = AssociationTree::new("/path/to/data");
//! let config = ImportConfig::new("/path/to/data");
//!
//! let summary = DirectoryImporter::new()
//!     .import(&mut tree, &config, None, &mut |path| {
//!         std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
//!     })
//!     .unwrap();
//!
//! println!("Imported {} files", summary.files_added);
//! ```

mod config;
mod error;
mod importer;

pub use config::{ImportConfig, ImportConfigBuilder};
pub use error::ImportError;
pub use importer::{DirectoryImporter, ImportSummary};

// Re-export core types for convenience
pub use dirassoc_core::{AssociationTree, NodeId, TreeConfig, TreeError};
