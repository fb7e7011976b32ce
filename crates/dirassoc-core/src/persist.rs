//! JSON persistence and parent-link restoration.
//!
//! Parent links are not part of the persisted form. Loading is two steps:
//! deserialization into a [`RawTree`], then
//! [`AssociationTree::restore_parents`], which rebuilds every back-reference
//! from the `children` lists and rejects structurally broken input. Every
//! `Deserialize` of an [`AssociationTree`] takes this route.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::default_separator;
use crate::error::TreeError;
use crate::name::{validate_directory_name, validate_file_name};
use crate::node::{Node, NodeId};
use crate::tree::AssociationTree;

/// Persisted form of a tree before its parent links are restored.
#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct RawTree<T> {
    #[serde(default)]
    base_directory: String,
    #[serde(default = "default_separator")]
    separator: char,
    nodes: Vec<Node<T>>,
}

impl<T> TryFrom<RawTree<T>> for AssociationTree<T> {
    type Error = TreeError;

    fn try_from(raw: RawTree<T>) -> Result<Self, TreeError> {
        let mut tree = AssociationTree {
            base_directory: raw.base_directory,
            separator: raw.separator,
            nodes: raw.nodes,
        };
        tree.restore_parents()?;
        Ok(tree)
    }
}

impl<T> AssociationTree<T> {
    /// Assign every node's parent from its position in the `children` lists.
    ///
    /// Walks the tree pre-order from the root. Fails if a child handle is out
    /// of range, a node is reachable more than once, a node is unreachable,
    /// or a name breaks the naming rules.
    pub fn restore_parents(&mut self) -> Result<(), TreeError> {
        if self.nodes.is_empty() {
            return Err(TreeError::corrupt("tree has no root"));
        }

        let mut visited = vec![false; self.nodes.len()];
        visited[0] = true;
        self.nodes[0].parent = None;

        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            self.check_node(id)?;

            let mut names = HashSet::new();
            let child_count = self.nodes[id.0].children.len();
            for index in (0..child_count).rev() {
                let child = self.nodes[id.0].children[index];
                let Some(seen) = visited.get_mut(child.0) else {
                    return Err(TreeError::corrupt(format!(
                        "child {} of node {} is out of range",
                        child.0, id.0
                    )));
                };
                if *seen {
                    return Err(TreeError::corrupt(format!(
                        "node {} is reachable more than once",
                        child.0
                    )));
                }
                *seen = true;

                if !names.insert(self.nodes[child.0].name.clone()) {
                    return Err(TreeError::corrupt(format!(
                        "duplicate directory {:?} under node {}",
                        self.nodes[child.0].name, id.0
                    )));
                }

                self.nodes[child.0].parent = Some(id);
                stack.push(child);
            }
        }

        if let Some(orphan) = visited.iter().position(|seen| !seen) {
            return Err(TreeError::corrupt(format!("node {orphan} is unreachable")));
        }
        Ok(())
    }

    fn check_node(&self, id: NodeId) -> Result<(), TreeError> {
        let node = &self.nodes[id.0];
        if id != NodeId::ROOT && node.name.is_empty() {
            return Err(TreeError::corrupt(format!("node {} has no name", id.0)));
        }
        if node.name.to_lowercase() != node.name.as_str() {
            return Err(TreeError::corrupt(format!(
                "directory {:?} is not lowercase",
                node.name
            )));
        }
        validate_directory_name(&node.name, self.separator)?;
        for file in node.files.keys() {
            validate_file_name(file)?;
            if file.to_lowercase() != file.as_str() {
                return Err(TreeError::corrupt(format!("file {file:?} is not lowercase")));
            }
        }
        Ok(())
    }
}

impl<T: Serialize> AssociationTree<T> {
    /// Serialize the tree as pretty JSON.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), TreeError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Save the tree to a JSON file, truncating any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TreeError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| TreeError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        self.to_writer(&mut writer)?;
        writer.flush().map_err(|e| TreeError::io(path, e))?;

        tracing::debug!(path = %path.display(), nodes = self.node_count(), "saved tree");
        Ok(())
    }
}

impl<T: DeserializeOwned> AssociationTree<T> {
    /// Read a tree from JSON and restore its parent links.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TreeError> {
        let raw: RawTree<T> = serde_json::from_reader(reader)?;
        Self::try_from(raw)
    }

    /// Load a tree saved with [`AssociationTree::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TreeError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| TreeError::io(path, e))?;
        let tree = Self::from_reader(BufReader::new(file))?;

        tracing::debug!(path = %path.display(), nodes = tree.node_count(), "loaded tree");
        Ok(tree)
    }
}
