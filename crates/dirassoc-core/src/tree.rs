//! Association tree container and insertion logic.

use compact_str::CompactString;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};

use crate::config::TreeConfig;
use crate::error::TreeError;
use crate::name::{normalize, validate_directory_name, validate_file_name};
use crate::node::{Node, NodeId};
use crate::persist::RawTree;

/// Summary statistics for a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    /// Number of directory nodes, root included.
    pub total_dirs: usize,
    /// Number of file entries.
    pub total_files: usize,
    /// Directories carrying an association.
    pub associated_dirs: usize,
    /// Deepest directory level (root = 0).
    pub max_depth: usize,
}

/// Tree mapping directory/file paths to associated values.
///
/// Nodes live in an arena addressed by [`NodeId`]; the root is always
/// [`NodeId::ROOT`]. The root carries the base directory, so a persisted tree
/// can be relocated by changing only that prefix.
///
/// Deserializing a tree restores its parent links and rejects structurally
/// broken input, see [`AssociationTree::restore_parents`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"),
    try_from = "RawTree<T>"
)]
pub struct AssociationTree<T> {
    /// Prefix prepended to the root when rebuilding directory paths.
    pub(crate) base_directory: String,

    /// Path separator for splitting and joining.
    pub(crate) separator: char,

    /// Node arena, root first.
    pub(crate) nodes: Vec<Node<T>>,
}

impl<T> AssociationTree<T> {
    /// Create an empty tree with an unnamed root.
    pub fn new(base_directory: impl Into<String>) -> Self {
        Self::with_config(base_directory, &TreeConfig::default())
    }

    /// Create an empty tree using the separator from `config`.
    pub fn with_config(base_directory: impl Into<String>, config: &TreeConfig) -> Self {
        Self {
            base_directory: base_directory.into(),
            separator: config.separator,
            nodes: vec![Node::new(CompactString::default())],
        }
    }

    /// Create a tree whose root is named after the first segment of `path`,
    /// then insert `path` with `association`.
    ///
    /// `path` must contain at least one directory level.
    pub fn with_file(
        base_directory: impl Into<String>,
        path: &str,
        association: T,
    ) -> Result<Self, TreeError> {
        Self::with_file_and_config(base_directory, path, association, &TreeConfig::default())
    }

    /// Same as [`AssociationTree::with_file`] with an explicit config.
    pub fn with_file_and_config(
        base_directory: impl Into<String>,
        path: &str,
        association: T,
        config: &TreeConfig,
    ) -> Result<Self, TreeError> {
        if path.is_empty() {
            return Err(TreeError::EmptyPath);
        }
        let mut tree = Self::with_config(base_directory, config);
        let lowered = normalize(path);
        let first = match lowered.split_once(tree.separator) {
            Some((first, _)) => first,
            None => {
                return Err(TreeError::MissingDirectory {
                    path: path.to_string(),
                });
            }
        };
        validate_directory_name(first, tree.separator)?;
        tree.nodes[0].name = first.into();
        tree.add_file_at(NodeId::ROOT, path, association, false)?;
        Ok(tree)
    }

    /// Base directory prepended to the root.
    pub fn base_directory(&self) -> &str {
        &self.base_directory
    }

    /// Relocate the tree by replacing its base directory.
    pub fn set_base_directory(&mut self, base_directory: impl Into<String>) {
        self.base_directory = base_directory.into();
    }

    /// Path separator used by this tree.
    pub fn separator(&self) -> char {
        self.separator
    }

    /// Handle of the root node.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by handle.
    pub fn get(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes.get(id.0)
    }

    /// Get a node by handle.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.0]
    }

    /// Total number of directory nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Insert a file relative to the root.
    ///
    /// With `fail_if_duplicate` an existing entry is an error and stays
    /// untouched; otherwise its association is replaced.
    pub fn add_file(
        &mut self,
        path: &str,
        association: T,
        fail_if_duplicate: bool,
    ) -> Result<(), TreeError> {
        let root_name = self.nodes[0].name.clone();
        self.insert_path(
            NodeId::ROOT,
            Some(root_name.as_str()),
            path,
            association,
            fail_if_duplicate,
        )
    }

    /// Insert a file relative to the root, computing its association from the path.
    pub fn add_file_with<F>(
        &mut self,
        path: &str,
        associator: F,
        fail_if_duplicate: bool,
    ) -> Result<(), TreeError>
    where
        F: FnOnce(&str) -> T,
    {
        let association = associator(path);
        self.add_file(path, association, fail_if_duplicate)
    }

    /// Insert a file below `node`.
    ///
    /// A single-segment `path` names a file directly inside `node`. Longer
    /// paths start with the name of `node` itself, followed by the
    /// directories to descend into and finally the file name.
    pub fn add_file_at(
        &mut self,
        node: NodeId,
        path: &str,
        association: T,
        fail_if_duplicate: bool,
    ) -> Result<(), TreeError> {
        self.insert_path(node, None, path, association, fail_if_duplicate)
    }

    /// Same as [`AssociationTree::add_file_at`], computing the association from the path.
    pub fn add_file_at_with<F>(
        &mut self,
        node: NodeId,
        path: &str,
        associator: F,
        fail_if_duplicate: bool,
    ) -> Result<(), TreeError>
    where
        F: FnOnce(&str) -> T,
    {
        let association = associator(path);
        self.add_file_at(node, path, association, fail_if_duplicate)
    }

    /// Set the association of a directory relative to the root, creating
    /// missing directories along the way. An empty path targets the root.
    pub fn set_directory_association(
        &mut self,
        path: &str,
        association: T,
    ) -> Result<NodeId, TreeError> {
        let lowered = normalize(path);
        let mut current = NodeId::ROOT;
        if !lowered.is_empty() {
            let segments: Vec<&str> = lowered.split(self.separator).collect();
            for segment in &segments {
                self.check_directory_segment(segment)?;
            }
            for segment in segments {
                current = match self.find_child(current, segment) {
                    Some(child) => child,
                    None => self.push_child(current, segment),
                };
            }
        }
        self.nodes[current.0].directory_association = Some(association);
        Ok(current)
    }

    /// Rebuild the full path of a directory node, base directory included.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn directory(&self, id: NodeId) -> String {
        let node = &self.nodes[id.0];
        debug_assert!(
            node.parent.is_some() || id == NodeId::ROOT,
            "parent links must be restored before rebuilding paths"
        );
        let mut directory = match node.parent {
            Some(parent) => self.directory(parent),
            None => self.base_directory.clone(),
        };
        if !directory.is_empty() && !node.name.is_empty() && !directory.ends_with(self.separator) {
            directory.push(self.separator);
        }
        directory.push_str(&node.name);
        directory
    }

    /// Names of the files directly inside a directory node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn files(&self, id: NodeId) -> Vec<&str> {
        self.nodes[id.0].files()
    }

    /// Child directories of a node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Parent of a node; `None` at the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Find a directory relative to the root, ignoring case.
    /// An empty path returns the root.
    pub fn find_directory(&self, path: &str) -> Option<NodeId> {
        let lowered = normalize(path);
        if lowered.is_empty() {
            return Some(NodeId::ROOT);
        }
        lowered
            .split(self.separator)
            .try_fold(NodeId::ROOT, |current, segment| {
                self.find_child(current, segment)
            })
    }

    /// Look up the association of a file relative to the root, ignoring case.
    pub fn get_file(&self, path: &str) -> Option<&T> {
        let lowered = normalize(path);
        let (directory, file) = match lowered.rsplit_once(self.separator) {
            Some((directory, file)) => (directory, file),
            None => ("", lowered.as_str()),
        };
        let id = self.find_directory(directory)?;
        self.nodes[id.0].files.get(file)
    }

    /// Iterate over node handles in pre-order, children in insertion order.
    pub fn iter(&self) -> PreOrder<'_, T> {
        PreOrder {
            tree: self,
            stack: vec![NodeId::ROOT],
        }
    }

    /// Depth of a node below the root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.nodes[id.0].parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes[parent.0].parent;
        }
        depth
    }

    /// Compute summary statistics.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        let mut stack = vec![(NodeId::ROOT, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let node = &self.nodes[id.0];
            stats.total_dirs += 1;
            stats.total_files += node.files.len();
            if node.directory_association.is_some() {
                stats.associated_dirs += 1;
            }
            stats.max_depth = stats.max_depth.max(depth);
            stack.extend(node.children.iter().map(|&child| (child, depth + 1)));
        }
        stats
    }

    fn insert_path(
        &mut self,
        node: NodeId,
        prefix: Option<&str>,
        path: &str,
        association: T,
        fail_if_duplicate: bool,
    ) -> Result<(), TreeError> {
        if path.is_empty() {
            return Err(TreeError::EmptyPath);
        }
        if node.0 >= self.nodes.len() {
            return Err(TreeError::NodeNotFound { id: node.0 });
        }

        let lowered = normalize(path);
        let mut segments: Vec<&str> = Vec::new();
        segments.extend(prefix);
        segments.extend(lowered.split(self.separator));

        // Validate everything up front so a failure never leaves new nodes behind.
        let (file, directories) = segments.split_last().ok_or(TreeError::EmptyPath)?;
        validate_file_name(file)?;
        for directory in directories.iter().skip(1) {
            self.check_directory_segment(directory)?;
        }

        self.insert(node, &segments, association, fail_if_duplicate, path)
    }

    fn insert(
        &mut self,
        node: NodeId,
        segments: &[&str],
        association: T,
        fail_if_duplicate: bool,
        path: &str,
    ) -> Result<(), TreeError> {
        match segments {
            [] => Err(TreeError::EmptyPath),
            [file] => self.insert_file(node, file, association, fail_if_duplicate, path),
            [directory, file] => {
                let name = &self.nodes[node.0].name;
                if name.as_str() != *directory {
                    return Err(TreeError::NameMismatch {
                        node: name.to_string(),
                        path: path.to_string(),
                    });
                }
                self.insert_file(node, file, association, fail_if_duplicate, path)
            }
            [_, rest @ ..] => {
                let next = rest[0];
                let child = match self.find_child(node, next) {
                    Some(child) => child,
                    None => self.push_child(node, next),
                };
                self.insert(child, rest, association, fail_if_duplicate, path)
            }
        }
    }

    fn insert_file(
        &mut self,
        node: NodeId,
        file: &str,
        association: T,
        fail_if_duplicate: bool,
        path: &str,
    ) -> Result<(), TreeError> {
        match self.nodes[node.0].files.entry(CompactString::from(file)) {
            Entry::Occupied(mut entry) => {
                if fail_if_duplicate {
                    return Err(TreeError::DuplicateEntry {
                        path: path.to_string(),
                    });
                }
                tracing::trace!(file, "replacing file association");
                entry.insert(association);
            }
            Entry::Vacant(entry) => {
                tracing::trace!(file, "adding file association");
                entry.insert(association);
            }
        }
        Ok(())
    }

    fn check_directory_segment(&self, segment: &str) -> Result<(), TreeError> {
        if segment.is_empty() {
            return Err(TreeError::InvalidName {
                name: String::new(),
            });
        }
        validate_directory_name(segment, self.separator)
    }

    fn find_child(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[node.0]
            .children
            .iter()
            .copied()
            .find(|child| self.nodes[child.0].name.as_str() == name)
    }

    fn push_child(&mut self, parent: NodeId, name: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut node = Node::new(name);
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        tracing::debug!(directory = name, id = id.0, "created directory node");
        id
    }
}

/// Pre-order iterator over the nodes of a tree.
pub struct PreOrder<'a, T> {
    tree: &'a AssociationTree<T>,
    stack: Vec<NodeId>,
}

impl<T> Iterator for PreOrder<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let children = &self.tree.nodes[id.0].children;
        self.stack.extend(children.iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slash_tree(base: &str) -> AssociationTree<String> {
        let config = TreeConfig::builder().separator('/').build().unwrap();
        AssociationTree::with_config(base, &config)
    }

    #[test]
    fn test_file_in_root() {
        let mut tree = slash_tree("");
        tree.add_file("a.txt", "one".to_string(), true).unwrap();

        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.files(tree.root()), vec!["a.txt"]);
    }

    #[test]
    fn test_nested_insertion_creates_nodes() {
        let mut tree = slash_tree("");
        tree.add_file("a/b/c/file.txt", "v".to_string(), true).unwrap();

        assert_eq!(tree.node_count(), 4);
        let c = tree.find_directory("a/b/c").unwrap();
        assert_eq!(tree.node(c).name(), "c");
        assert_eq!(tree.depth(c), 3);
        assert_eq!(tree.directory(c), "a/b/c");
    }

    #[test]
    fn test_siblings_reuse_existing_child() {
        let mut tree = slash_tree("");
        tree.add_file("a/x.txt", "1".to_string(), true).unwrap();
        tree.add_file("A/y.txt", "2".to_string(), true).unwrap();

        assert_eq!(tree.children(tree.root()).len(), 1);
        let a = tree.find_directory("a").unwrap();
        assert_eq!(tree.files(a), vec!["x.txt", "y.txt"]);
    }

    #[test]
    fn test_failed_insert_leaves_tree_untouched() {
        let mut tree = slash_tree("");
        let err = tree
            .add_file("new/dir/bad\0.txt", "v".to_string(), true)
            .unwrap_err();
        assert!(matches!(err, TreeError::InvalidFileName { .. }));
        assert_eq!(tree.node_count(), 1);

        let err = tree.add_file("new//x.txt", "v".to_string(), true).unwrap_err();
        assert!(matches!(err, TreeError::InvalidName { .. }));
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_add_file_at_checks_node_name() {
        let mut tree = slash_tree("");
        tree.add_file("docs/readme.txt", "v1".to_string(), true).unwrap();
        let docs = tree.find_directory("docs").unwrap();

        tree.add_file_at(docs, "docs/guide.txt", "v2".to_string(), true)
            .unwrap();
        tree.add_file_at(docs, "notes.txt", "v3".to_string(), true)
            .unwrap();
        let err = tree
            .add_file_at(docs, "other/readme.txt", "v4".to_string(), true)
            .unwrap_err();

        assert!(matches!(err, TreeError::NameMismatch { .. }));
        assert_eq!(tree.files(docs), vec!["readme.txt", "guide.txt", "notes.txt"]);
    }

    #[test]
    fn test_add_file_at_unknown_node() {
        let mut tree = slash_tree("");
        let err = tree
            .add_file_at(NodeId::new(7), "a.txt", "v".to_string(), false)
            .unwrap_err();
        assert!(matches!(err, TreeError::NodeNotFound { id: 7 }));
    }

    #[test]
    fn test_add_file_at_with_uses_path() {
        let mut tree = slash_tree("");
        tree.add_file("docs/readme.txt", "v1".to_string(), true).unwrap();
        let docs = tree.find_directory("docs").unwrap();

        tree.add_file_at_with(docs, "Docs/Guide.TXT", |path| format!("from {path}"), true)
            .unwrap();
        assert_eq!(
            tree.get_file("docs/guide.txt").map(String::as_str),
            Some("from Docs/Guide.TXT")
        );

        let err = tree
            .add_file_at_with(NodeId::new(9), "x.txt", |path| path.to_string(), true)
            .unwrap_err();
        assert!(matches!(err, TreeError::NodeNotFound { id: 9 }));
    }

    #[test]
    fn test_with_file_names_root() {
        let config = TreeConfig::builder().separator('/').build().unwrap();
        let tree =
            AssociationTree::with_file_and_config("/srv", "Data/x.txt", 5u32, &config).unwrap();

        assert_eq!(tree.node(tree.root()).name(), "data");
        assert_eq!(tree.directory(tree.root()), "/srv/data");
        assert_eq!(tree.get_file("x.txt"), Some(&5));

        let err = AssociationTree::with_file_and_config("", "x.txt", 5u32, &config).unwrap_err();
        assert!(matches!(err, TreeError::MissingDirectory { .. }));
    }

    #[test]
    fn test_set_directory_association() {
        let mut tree = slash_tree("");
        let id = tree
            .set_directory_association("Music/Jazz", "genre".to_string())
            .unwrap();

        assert_eq!(tree.directory(id), "music/jazz");
        assert_eq!(tree.node(id).directory_association().map(String::as_str), Some("genre"));

        tree.set_directory_association("", "root".to_string()).unwrap();
        assert!(tree.node(tree.root()).directory_association().is_some());
        assert_eq!(tree.stats().associated_dirs, 2);
    }

    #[test]
    fn test_directory_without_double_separator() {
        let mut tree = slash_tree("/");
        tree.add_file("tmp/a.txt", "v".to_string(), false).unwrap();
        let tmp = tree.find_directory("tmp").unwrap();

        assert_eq!(tree.directory(tree.root()), "/");
        assert_eq!(tree.directory(tmp), "/tmp");
    }

    #[test]
    fn test_pre_order_iteration() {
        let mut tree = slash_tree("");
        tree.add_file("a/1.txt", "v".to_string(), false).unwrap();
        tree.add_file("a/b/2.txt", "v".to_string(), false).unwrap();
        tree.add_file("c/3.txt", "v".to_string(), false).unwrap();

        let names: Vec<&str> = tree.iter().map(|id| tree.node(id).name()).collect();
        assert_eq!(names, vec!["", "a", "b", "c"]);
    }

    #[test]
    fn test_stats() {
        let mut tree = slash_tree("");
        tree.add_file("r.txt", "v".to_string(), false).unwrap();
        tree.add_file("a/b/c.txt", "v".to_string(), false).unwrap();
        tree.add_file("a/d.txt", "v".to_string(), false).unwrap();

        let stats = tree.stats();
        assert_eq!(stats.total_dirs, 3);
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.associated_dirs, 0);
    }
}
