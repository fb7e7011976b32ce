//! JWalk-based directory importer.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use jwalk::{Parallelism, WalkDir};

use dirassoc_core::{AssociationTree, TreeError};

use crate::config::ImportConfig;
use crate::error::ImportError;

/// Counters collected during an import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Files inserted into the tree.
    pub files_added: u64,
    /// Directories walked, import root included.
    pub directories_visited: u64,
    /// Entries left out: ignored names, unreadable entries, special files.
    pub skipped: u64,
    /// Wall time of the import.
    pub elapsed: Duration,
}

/// Imports real directory trees into an [`AssociationTree`].
#[derive(Debug, Default)]
pub struct DirectoryImporter;

impl DirectoryImporter {
    /// Create a new importer.
    pub fn new() -> Self {
        Self
    }

    /// Add every file below `config.root` to `tree`.
    ///
    /// Files are stored under their path relative to the tree's base
    /// directory. `file_associator` receives the full filesystem path of each
    /// file. `directory_associator` is only called when
    /// [`ImportConfig::associate_directories`] is set.
    pub fn import<T>(
        &self,
        tree: &mut AssociationTree<T>,
        config: &ImportConfig,
        mut directory_associator: Option<&mut dyn FnMut(&str) -> T>,
        file_associator: &mut dyn FnMut(&str) -> T,
    ) -> Result<ImportSummary, ImportError> {
        let start = Instant::now();
        let root = config.root.as_path();

        let metadata = std::fs::metadata(root).map_err(|e| ImportError::io(root, e))?;
        if !metadata.is_dir() {
            return Err(ImportError::NotADirectory {
                path: root.to_path_buf(),
            });
        }
        // Reject roots outside the base before touching the tree.
        relative_path(tree, root)?;

        if directory_associator.is_some() && !config.associate_directories {
            tracing::debug!("directory associator ignored, associate_directories is off");
        }

        let ignore = config.ignore_set()?;
        let ignored = Arc::new(AtomicUsize::new(0));
        let ignored_in_walk = Arc::clone(&ignored);

        let parallelism = match config.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_millis(100),
            },
            n => Parallelism::RayonNewPool(n),
        };
        let max_depth = if config.include_subdirectories {
            usize::MAX
        } else {
            1
        };

        let walker = WalkDir::new(root)
            .parallelism(parallelism)
            .sort(true)
            .skip_hidden(!config.include_hidden)
            .follow_links(config.follow_symlinks)
            .min_depth(0)
            .max_depth(max_depth)
            .process_read_dir(move |_depth, _path, _state, children| {
                children.retain(|entry| match entry {
                    Ok(entry) if ignore.is_match(entry.file_name()) => {
                        ignored_in_walk.fetch_add(1, Ordering::Relaxed);
                        false
                    }
                    _ => true,
                });
            });

        tracing::debug!(root = %root.display(), "importing directory");
        let mut summary = ImportSummary::default();

        for entry_result in walker {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable entry");
                    summary.skipped += 1;
                    continue;
                }
            };

            let path = entry.path();
            let file_type = entry.file_type();

            if file_type.is_dir() {
                summary.directories_visited += 1;
                if config.associate_directories {
                    if let Some(associator) = directory_associator.as_deref_mut() {
                        let result = relative_path(tree, &path).and_then(|relative| {
                            let association = associator(&path.to_string_lossy());
                            tree.set_directory_association(&relative, association)?;
                            Ok(())
                        });
                        if skip_unstorable(result, &path)? {
                            summary.skipped += 1;
                        }
                    }
                }
            } else if file_type.is_file() {
                let result = relative_path(tree, &path).and_then(|relative| {
                    let association = file_associator(&path.to_string_lossy());
                    tree.add_file(&relative, association, false)?;
                    tracing::trace!(file = %relative, "imported file");
                    Ok(())
                });
                if skip_unstorable(result, &path)? {
                    summary.skipped += 1;
                    continue;
                }
                summary.files_added += 1;

                if summary.files_added % 1000 == 0 {
                    tracing::debug!(files = summary.files_added, "import progress");
                }
            } else {
                tracing::debug!(path = %path.display(), "skipping special file");
                summary.skipped += 1;
            }
        }

        summary.skipped += ignored.load(Ordering::Relaxed) as u64;
        summary.elapsed = start.elapsed();
        tracing::debug!(
            files = summary.files_added,
            dirs = summary.directories_visited,
            skipped = summary.skipped,
            "import finished"
        );
        Ok(summary)
    }
}

/// Turn a name the tree cannot store into a skip; other errors propagate.
///
/// Returns `true` when the entry was skipped.
fn skip_unstorable(result: Result<(), ImportError>, path: &Path) -> Result<bool, ImportError> {
    match result {
        Ok(()) => Ok(false),
        Err(ImportError::Tree(
            err @ (TreeError::InvalidName { .. } | TreeError::InvalidFileName { .. }),
        )) => {
            tracing::warn!(path = %path.display(), error = %err, "skipping entry with unstorable name");
            Ok(true)
        }
        Err(err) => Err(err),
    }
}

/// Express `path` relative to the tree's base directory, joined with the
/// tree's separator.
///
/// With an empty base directory the whole path is kept, minus any root or
/// drive prefix.
fn relative_path<T>(tree: &AssociationTree<T>, path: &Path) -> Result<String, ImportError> {
    let base = tree.base_directory();
    let separator = tree.separator();
    let outside = || ImportError::OutsideBase {
        path: path.to_path_buf(),
        base: base.to_string(),
    };

    let relative: PathBuf = if base.is_empty() {
        path.to_path_buf()
    } else {
        path.strip_prefix(base).map_err(|_| outside())?.to_path_buf()
    };

    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => {
                let name = name.to_string_lossy();
                // A separator inside a name would split it into extra levels.
                if name.contains(separator) {
                    return Err(TreeError::InvalidName {
                        name: name.into_owned(),
                    }
                    .into());
                }
                segments.push(name.into_owned());
            }
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) if base.is_empty() => {}
            Component::RootDir | Component::Prefix(_) | Component::ParentDir => {
                return Err(outside());
            }
        }
    }
    Ok(segments.join(&separator.to_string()))
}
