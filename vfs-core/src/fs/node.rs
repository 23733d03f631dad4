//! Node - the shared identity of directories and files.

use std::fmt;

use super::directory::{Directory, WeakDir};
use super::file::File;
use super::render::Render;

/// Kind of a tree node, as shown in rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    /// A directory created as the root of a tree
    Drive,
    File,
}

impl NodeKind {
    /// The `<Kind>` prefix of a rendered line.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Directory => "Directory",
            NodeKind::Drive => "Drive",
            NodeKind::File => "File",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Any entry in the tree.
///
/// Both variants are shared handles: cloning a `Node` yields another handle to
/// the same directory or file, never a copy of it. Use [`Node::ptr_eq`] to test
/// identity.
#[derive(Clone)]
pub enum Node {
    Directory(Directory),
    File(File),
}

impl Node {
    pub fn name(&self) -> String {
        match self {
            Node::Directory(dir) => dir.name(),
            Node::File(file) => file.name(),
        }
    }

    /// Owning directory, or `None` for a root (or a detached node).
    pub fn parent(&self) -> Option<Directory> {
        match self {
            Node::Directory(dir) => dir.parent(),
            Node::File(file) => file.parent(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Directory(dir) => dir.kind(),
            Node::File(_) => NodeKind::File,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Node::File(_))
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Directory(_))
    }

    pub fn as_file(&self) -> Option<&File> {
        match self {
            Node::File(file) => Some(file),
            Node::Directory(_) => None,
        }
    }

    pub fn as_dir(&self) -> Option<&Directory> {
        match self {
            Node::Directory(dir) => Some(dir),
            Node::File(_) => None,
        }
    }

    pub fn into_file(self) -> Option<File> {
        match self {
            Node::File(file) => Some(file),
            Node::Directory(_) => None,
        }
    }

    pub fn into_dir(self) -> Option<Directory> {
        match self {
            Node::Directory(dir) => Some(dir),
            Node::File(_) => None,
        }
    }

    /// True if both handles point at the same node instance.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Directory(a), Node::Directory(b)) => a.ptr_eq(b),
            (Node::File(a), Node::File(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Lazily rendered lines for this node and, for directories, its subtree.
    pub fn render(&self) -> Render {
        Render::new(self.clone())
    }

    pub(crate) fn set_parent(&self, parent: WeakDir) {
        match self {
            Node::Directory(dir) => dir.set_parent(parent),
            Node::File(file) => file.set_parent(parent),
        }
    }
}

impl From<Directory> for Node {
    fn from(dir: Directory) -> Self {
        Node::Directory(dir)
    }
}

impl From<File> for Node {
    fn from(file: File) -> Self {
        Node::File(file)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Directory(dir) => fmt::Debug::fmt(dir, f),
            Node::File(file) => fmt::Debug::fmt(file, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        assert_eq!(NodeKind::Directory.label(), "Directory");
        assert_eq!(NodeKind::Drive.label(), "Drive");
        assert_eq!(NodeKind::File.to_string(), "File");
    }

    #[test]
    fn test_variant_accessors() {
        let node: Node = File::new("f").into();
        assert!(node.is_file());
        assert!(!node.is_dir());
        assert!(node.as_file().is_some());
        assert!(node.as_dir().is_none());
        assert_eq!(node.kind(), NodeKind::File);

        let node: Node = Directory::new("d").into();
        assert!(node.is_dir());
        assert!(node.clone().into_dir().is_some());
        assert!(node.into_file().is_none());
    }

    #[test]
    fn test_ptr_eq_is_identity() {
        let a: Node = File::new("same").into();
        let b: Node = File::new("same").into();
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn test_detached_node_has_no_parent() {
        let node: Node = File::new("loose").into();
        assert!(node.parent().is_none());
    }
}
