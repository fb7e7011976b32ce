//! Directory node types.

use compact_str::CompactString;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::name::normalize;

/// Handle of a node within its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root of every tree.
    pub const ROOT: NodeId = NodeId(0);

    /// Create a new NodeId from an arena index.
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    /// Get the arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// One directory level of an association tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct Node<T> {
    /// Lowercase directory name (single segment).
    pub(crate) name: CompactString,

    /// Association for the directory itself.
    #[serde(default)]
    pub(crate) directory_association: Option<T>,

    /// Associations of the files directly inside this directory, keyed by lowercase name.
    #[serde(default, with = "file_entries")]
    pub(crate) files: IndexMap<CompactString, T>,

    /// Child directories in insertion order.
    #[serde(default)]
    pub(crate) children: Vec<NodeId>,

    /// Back-reference used to rebuild paths; restored after loading.
    #[serde(skip)]
    pub(crate) parent: Option<NodeId>,
}

impl<T> Node<T> {
    pub(crate) fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            directory_association: None,
            files: IndexMap::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    /// Directory name, always lowercase.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Association of this directory, if one was set.
    pub fn directory_association(&self) -> Option<&T> {
        self.directory_association.as_ref()
    }

    /// Names of the files directly inside this directory, in insertion order.
    pub fn files(&self) -> Vec<&str> {
        self.files.keys().map(CompactString::as_str).collect()
    }

    /// Iterate over `(file name, association)` pairs of this directory.
    pub fn file_entries(&self) -> impl Iterator<Item = (&str, &T)> {
        self.files.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Look up a file directly inside this directory, ignoring case.
    pub fn file(&self, name: &str) -> Option<&T> {
        self.files.get(normalize(name).as_str())
    }

    /// Child directory handles.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Parent directory handle; `None` at the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Number of files directly inside this directory.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Number of direct child directories.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// Stores file associations as an explicit sequence of `{ name, association }`
/// records so that any serializable association type round-trips.
mod file_entries {
    use compact_str::CompactString;
    use indexmap::IndexMap;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize)]
    struct EntryRef<'a, T> {
        name: &'a str,
        association: &'a T,
    }

    #[derive(Deserialize)]
    struct Entry<T> {
        name: CompactString,
        association: T,
    }

    pub fn serialize<S, T>(files: &IndexMap<CompactString, T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        serializer.collect_seq(
            files
                .iter()
                .map(|(name, association)| EntryRef {
                    name: name.as_str(),
                    association,
                }),
        )
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<IndexMap<CompactString, T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        let entries = Vec::<Entry<T>>::deserialize(deserializer)?;
        let count = entries.len();
        let files: IndexMap<CompactString, T> = entries
            .into_iter()
            .map(|entry| (entry.name, entry.association))
            .collect();
        if files.len() != count {
            return Err(D::Error::custom("duplicate file entry"));
        }
        Ok(files)
    }
}
