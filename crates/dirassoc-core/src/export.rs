//! Flat, separator-delimited export of a tree.
//!
//! One record per line: `directory<sep>file<sep>association`. Directory
//! records leave the file column empty. Fields are not escaped, so values
//! containing the separator do not survive a read-back.

use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::TreeError;
use crate::node::NodeId;
use crate::tree::AssociationTree;

/// Header of the directory column.
pub const COLUMN_DIRECTORY: &str = "Directory";
/// Header of the file column.
pub const COLUMN_FILE: &str = "File";
/// Header of the association column.
pub const COLUMN_ASSOCIATION: &str = "Association";

impl<T> AssociationTree<T> {
    /// Write the records of `node` and all its descendants, pre-order,
    /// rendering associations with `render`.
    ///
    /// A `node` outside this tree fails with [`std::io::ErrorKind::NotFound`]
    /// wrapping [`TreeError::NodeNotFound`].
    pub fn export_node_with<W, F>(
        &self,
        node: NodeId,
        writer: &mut W,
        separator: char,
        render: &F,
    ) -> std::io::Result<()>
    where
        W: Write + ?Sized,
        F: Fn(&T) -> String,
    {
        let current = self.get(node).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                TreeError::NodeNotFound { id: node.index() },
            )
        })?;
        let directory = self.directory(node);

        let association = current
            .directory_association()
            .map(render)
            .unwrap_or_default();
        writeln!(writer, "{directory}{separator}{separator}{association}")?;

        for (file, value) in current.file_entries() {
            let association = render(value);
            writeln!(writer, "{directory}{separator}{file}{separator}{association}")?;
        }

        for &child in current.children() {
            self.export_node_with(child, writer, separator, render)?;
        }
        Ok(())
    }

    /// Write the header line followed by every record of the tree.
    pub fn export_with<W, F>(&self, writer: &mut W, separator: char, render: F) -> std::io::Result<()>
    where
        W: Write + ?Sized,
        F: Fn(&T) -> String,
    {
        writeln!(
            writer,
            "{COLUMN_DIRECTORY}{separator}{COLUMN_FILE}{separator}{COLUMN_ASSOCIATION}"
        )?;
        self.export_node_with(self.root(), writer, separator, &render)
    }

    /// Export the tree to `path`, truncating any existing file.
    pub fn export_file_with<F>(
        &self,
        path: impl AsRef<Path>,
        separator: char,
        render: F,
    ) -> Result<(), TreeError>
    where
        F: Fn(&T) -> String,
    {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| TreeError::io(path, e))?;
        let mut writer = BufWriter::new(file);

        self.export_with(&mut writer, separator, render)
            .map_err(|e| TreeError::io(path, e))?;
        writer.flush().map_err(|e| TreeError::io(path, e))?;

        tracing::debug!(path = %path.display(), nodes = self.node_count(), "exported tree");
        Ok(())
    }
}

impl<T: Display> AssociationTree<T> {
    /// Write the records of `node` and its descendants using `Display`.
    pub fn export_node<W>(&self, node: NodeId, writer: &mut W, separator: char) -> std::io::Result<()>
    where
        W: Write + ?Sized,
    {
        self.export_node_with(node, writer, separator, &|value: &T| value.to_string())
    }

    /// Write the header and every record using `Display`.
    pub fn export<W>(&self, writer: &mut W, separator: char) -> std::io::Result<()>
    where
        W: Write + ?Sized,
    {
        self.export_with(writer, separator, |value: &T| value.to_string())
    }

    /// Export to `path` using `Display`.
    pub fn export_file(&self, path: impl AsRef<Path>, separator: char) -> Result<(), TreeError> {
        self.export_file_with(path, separator, |value: &T| value.to_string())
    }
}
