//! Directory - an internal node owning an ordered set of named children.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use log::debug;

use super::file::{File, FileOptions};
use super::node::{Node, NodeKind};
use super::path::{is_valid_name, join_path, split_path};
use super::render::Render;
use crate::error::{VfsError, VfsResult};

/// Non-owning back-reference from a child to its directory.
pub(crate) type WeakDir = Weak<RefCell<DirectoryInner>>;

pub(crate) struct DirectoryInner {
    name: String,
    parent: WeakDir,
    children: IndexMap<String, Node>,
    auto_create: bool,
    file_defaults: FileOptions,
    drive: bool,
}

/// A directory node.
///
/// Children are kept in insertion order and looked up by exact, case-sensitive
/// name. The directory owns its children; each child only holds a weak
/// reference back to it. A directory without a parent is a root.
///
/// When `auto_create` is set, path walks started from this directory create
/// missing segments instead of failing. Directories appended to this one
/// inherit the flag (and the defaults for auto-created files) at attachment.
///
/// `Directory` is a shared handle: clones refer to the same directory.
#[derive(Clone)]
pub struct Directory {
    inner: Rc<RefCell<DirectoryInner>>,
}

impl Directory {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_auto_create(name, false)
    }

    pub fn with_auto_create(name: impl Into<String>, auto_create: bool) -> Self {
        Self::from_cell(Rc::new(RefCell::new(DirectoryInner {
            name: name.into(),
            parent: Weak::new(),
            children: IndexMap::new(),
            auto_create,
            file_defaults: FileOptions::default(),
            drive: false,
        })))
    }

    pub(crate) fn from_cell(inner: Rc<RefCell<DirectoryInner>>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> WeakDir {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn set_parent(&self, parent: WeakDir) {
        self.inner.borrow_mut().parent = parent;
    }

    /// Render this directory with the `Drive` kind.
    pub(crate) fn mark_drive(&self) {
        self.inner.borrow_mut().drive = true;
    }

    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    pub fn parent(&self) -> Option<Directory> {
        self.inner.borrow().parent.upgrade().map(Directory::from_cell)
    }

    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    pub fn kind(&self) -> NodeKind {
        if self.inner.borrow().drive {
            NodeKind::Drive
        } else {
            NodeKind::Directory
        }
    }

    pub fn auto_create(&self) -> bool {
        self.inner.borrow().auto_create
    }

    /// Change the flag on this directory only. Existing children keep theirs.
    pub fn set_auto_create(&self, auto_create: bool) {
        self.inner.borrow_mut().auto_create = auto_create;
    }

    /// Options used for files created by a path walk.
    pub fn file_defaults(&self) -> FileOptions {
        self.inner.borrow().file_defaults
    }

    pub fn set_file_defaults(&self, options: FileOptions) {
        self.inner.borrow_mut().file_defaults = options;
    }

    pub fn ptr_eq(&self, other: &Directory) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Absolute path from the root, root name included.
    pub fn path(&self) -> String {
        let mut names = vec![self.name()];
        let mut current = self.parent();
        while let Some(dir) = current {
            names.push(dir.name());
            current = dir.parent();
        }
        names.reverse();
        join_path(&names)
    }

    /// True if `self` is `other` or lies somewhere below it.
    fn is_within(&self, other: &Directory) -> bool {
        let mut current = Some(self.clone());
        while let Some(dir) = current {
            if dir.ptr_eq(other) {
                return true;
            }
            current = dir.parent();
        }
        false
    }

    fn inherit_from(&self, parent: &Directory) {
        let (auto_create, file_defaults) = {
            let p = parent.inner.borrow();
            (p.auto_create, p.file_defaults)
        };
        let mut inner = self.inner.borrow_mut();
        inner.auto_create = auto_create;
        inner.file_defaults = file_defaults;
    }

    /// Drop the entry `name` if it still refers to `node`.
    fn detach(&self, name: &str, node: &Node) {
        let mut inner = self.inner.borrow_mut();
        let matches = inner
            .children
            .get(name)
            .map_or(false, |child| child.ptr_eq(node));
        if matches {
            inner.children.shift_remove(name);
        }
    }

    /// Attach `node` as a child keyed by its name.
    ///
    /// - An existing child with the same name is replaced in place (keeping its
    ///   position) and detached
    /// - A node still attached elsewhere is removed from its old directory
    /// - An appended directory inherits `auto_create` and the file defaults
    ///
    /// Fails with [`VfsError::InvalidName`] if the node's name is empty or
    /// contains a separator, and with [`VfsError::Cycle`] if `node` is this
    /// directory or one of its ancestors.
    pub fn append(&self, node: impl Into<Node>) -> VfsResult<()> {
        let node = node.into();
        let name = node.name();
        if !is_valid_name(&name) {
            return Err(VfsError::InvalidName { name });
        }

        if let Node::Directory(dir) = &node {
            if self.is_within(dir) {
                return Err(VfsError::Cycle { name });
            }
            dir.inherit_from(self);
        }

        if let Some(old_parent) = node.parent() {
            if !old_parent.ptr_eq(self) {
                debug!("move {} from {} to {}", name, old_parent.path(), self.path());
                old_parent.detach(&name, &node);
            }
        }

        node.set_parent(self.downgrade());
        let previous = self
            .inner
            .borrow_mut()
            .children
            .insert(name.clone(), node.clone());

        if let Some(previous) = previous {
            if !previous.ptr_eq(&node) {
                debug!("{} shadows existing entry in {}", name, self.path());
                previous.set_parent(Weak::new());
            }
        }
        Ok(())
    }

    /// Single-segment lookup.
    pub fn get(&self, name: &str) -> Option<Node> {
        self.inner.borrow().children.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.borrow().children.contains_key(name)
    }

    /// Children in insertion order.
    pub fn children(&self) -> Vec<Node> {
        self.inner.borrow().children.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Walk `path` from this directory.
    ///
    /// With `auto_create` set on this directory, missing segments are created as
    /// directories, except the last one which becomes a file when
    /// `allow_auto_create_file` is true. Without it, a missing segment fails with
    /// [`VfsError::NotFound`]. Nodes created before a failure stay attached.
    pub fn resolve(&self, path: &str, allow_auto_create_file: bool) -> VfsResult<Node> {
        self.walk_path(path, self.auto_create(), allow_auto_create_file)
    }

    fn walk_path(&self, path: &str, auto_create: bool, allow_file: bool) -> VfsResult<Node> {
        let segments = split_path(path);
        let mut current = self.clone();

        for (i, segment) in segments.iter().enumerate() {
            let is_last = i + 1 == segments.len();

            let node = match current.get(segment) {
                Some(node) => node,
                None if auto_create => {
                    let created: Node = if is_last && allow_file {
                        File::with_options(*segment, self.file_defaults()).into()
                    } else {
                        Directory::new(*segment).into()
                    };
                    debug!(
                        "auto-create {} {}/{}",
                        created.kind(),
                        current.path(),
                        segment
                    );
                    current.append(created.clone())?;
                    created
                }
                None => {
                    return Err(VfsError::NotFound {
                        segment: segment.to_string(),
                        path: path.to_string(),
                    })
                }
            };

            if is_last {
                return Ok(node);
            }
            current = match node {
                Node::Directory(dir) => dir,
                Node::File(_) => {
                    return Err(VfsError::TypeMismatch {
                        path: join_path(&segments[..=i]),
                        expected: NodeKind::Directory,
                    })
                }
            };
        }

        Ok(Node::Directory(current))
    }

    /// Look up `path` without creating anything, whatever `auto_create` says.
    pub fn open(&self, path: &str) -> VfsResult<Node> {
        self.walk_path(path, false, false)
    }

    /// Resolve `path` to a directory, auto-creating directories if enabled.
    pub fn open_directory(&self, path: &str) -> VfsResult<Directory> {
        match self.resolve(path, false)? {
            Node::Directory(dir) => Ok(dir),
            Node::File(_) => Err(VfsError::TypeMismatch {
                path: path.to_string(),
                expected: NodeKind::Directory,
            }),
        }
    }

    /// Resolve `path` to a file, auto-creating directories and the file itself
    /// if enabled.
    pub fn open_file(&self, path: &str) -> VfsResult<File> {
        match self.resolve(path, true)? {
            Node::File(file) => Ok(file),
            Node::Directory(_) => Err(VfsError::TypeMismatch {
                path: path.to_string(),
                expected: NodeKind::File,
            }),
        }
    }

    /// Open the file at `path` for the duration of `f`, closing it afterwards.
    pub fn with_file<R, F>(&self, path: &str, f: F) -> VfsResult<R>
    where
        F: FnOnce(&File) -> VfsResult<R>,
    {
        self.open_file(path)?.with(f)
    }

    /// Every descendant with its `/`-joined path relative to this directory,
    /// depth-first in insertion order.
    pub fn walk(&self) -> Vec<(String, Node)> {
        let mut out = Vec::new();
        self.walk_into("", &mut out);
        out
    }

    fn walk_into(&self, prefix: &str, out: &mut Vec<(String, Node)>) {
        for child in self.children() {
            let path = if prefix.is_empty() {
                child.name()
            } else {
                format!("{}/{}", prefix, child.name())
            };
            let dir = child.as_dir().cloned();
            out.push((path.clone(), child));
            if let Some(dir) = dir {
                dir.walk_into(&path, out);
            }
        }
    }

    pub fn render(&self) -> Render {
        Render::new(Node::Directory(self.clone()))
    }
}

impl fmt::Display for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.render().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            f.write_str(&line)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct(self.kind().label())
            .field("name", &inner.name)
            .field("auto_create", &inner.auto_create)
            .field("children", &inner.children.values().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::FileMode;

    #[test]
    fn test_append_sets_parent() {
        let dir = Directory::new("d");
        let file = File::new("f");
        dir.append(file.clone()).unwrap();

        assert!(file.parent().unwrap().ptr_eq(&dir));
        assert!(dir.get("f").unwrap().ptr_eq(&file.into()));
        assert!(dir.is_root());
    }

    #[test]
    fn test_append_shadows_in_place() {
        let dir = Directory::new("d");
        let first = File::new("x");
        dir.append(first.clone()).unwrap();
        dir.append(File::new("y")).unwrap();

        let second = Directory::new("x");
        dir.append(second.clone()).unwrap();

        let names: Vec<String> = dir.children().iter().map(Node::name).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert!(dir.get("x").unwrap().is_dir());
        assert!(first.parent().is_none());
        assert!(second.parent().unwrap().ptr_eq(&dir));
    }

    #[test]
    fn test_append_same_node_twice_is_noop() {
        let dir = Directory::new("d");
        let file = File::new("f");
        dir.append(file.clone()).unwrap();
        dir.append(file.clone()).unwrap();
        assert_eq!(dir.len(), 1);
        assert!(file.parent().is_some());
    }

    #[test]
    fn test_append_moves_between_directories() {
        let a = Directory::new("a");
        let b = Directory::new("b");
        let file = File::new("f");
        a.append(file.clone()).unwrap();
        b.append(file.clone()).unwrap();

        assert!(!a.contains("f"));
        assert!(b.contains("f"));
        assert!(file.parent().unwrap().ptr_eq(&b));
    }

    #[test]
    fn test_append_rejects_cycles() {
        let root = Directory::new("root");
        let child = root.clone();
        assert!(matches!(root.append(child), Err(VfsError::Cycle { .. })));

        let sub = Directory::new("sub");
        root.append(sub.clone()).unwrap();
        assert!(matches!(sub.append(root.clone()), Err(VfsError::Cycle { .. })));
        assert!(sub.is_empty());
    }

    #[test]
    fn test_append_rejects_unreachable_names() {
        let root = Directory::with_auto_create("root", true);
        for name in ["a/b", "a\\b", ""] {
            let err = root.append(File::new(name)).unwrap_err();
            assert!(matches!(err, VfsError::InvalidName { name: ref n } if n == name));
        }
        assert!(matches!(
            root.append(Directory::new("x/y")),
            Err(VfsError::InvalidName { .. })
        ));
        assert!(root.is_empty());
        assert!(root.open("a/b").unwrap_err().is_not_found());
    }

    #[test]
    fn test_append_inherits_policy() {
        let root = Directory::with_auto_create("root", true);
        root.set_file_defaults(FileOptions::binary());

        let sub = Directory::new("sub");
        assert!(!sub.auto_create());
        root.append(sub.clone()).unwrap();
        assert!(sub.auto_create());
        assert_eq!(sub.file_defaults().mode, FileMode::Binary);

        let file = sub.open_file("nested/data.bin").unwrap();
        assert_eq!(file.mode(), FileMode::Binary);
    }

    #[test]
    fn test_resolve_empty_path_is_self() {
        let dir = Directory::new("d");
        assert!(dir.open("").unwrap().ptr_eq(&dir.clone().into()));
        assert!(dir.open("/").unwrap().ptr_eq(&dir.clone().into()));
        assert!(dir.open_directory("\\").unwrap().ptr_eq(&dir));
    }

    #[test]
    fn test_resolve_not_found() {
        let dir = Directory::new("d");
        dir.append(Directory::new("a")).unwrap();

        match dir.open("a/missing/deeper") {
            Err(VfsError::NotFound { segment, path }) => {
                assert_eq!(segment, "missing");
                assert_eq!(path, "a/missing/deeper");
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_through_file_fails() {
        let dir = Directory::with_auto_create("d", true);
        dir.open_file("a/f").unwrap();

        let err = dir.open_file("a/f/g").unwrap_err();
        assert!(err.is_type_mismatch());
        assert!(dir.open("a/f/g").unwrap_err().is_type_mismatch());
    }

    #[test]
    fn test_open_ignores_auto_create() {
        let dir = Directory::with_auto_create("d", true);
        assert!(dir.open("x/y").unwrap_err().is_not_found());
        assert!(dir.is_empty());
    }

    #[test]
    fn test_open_directory_never_creates_files() {
        let dir = Directory::with_auto_create("d", true);
        let leaf = dir.open_directory("a/b").unwrap();
        assert_eq!(leaf.kind(), NodeKind::Directory);
        assert_eq!(leaf.path(), "d/a/b");
    }

    #[test]
    fn test_backslash_paths() {
        let dir = Directory::with_auto_create("d", true);
        let file = dir.open_file("a\\b\\c.txt").unwrap();
        assert!(dir.open("a/b/c.txt").unwrap().ptr_eq(&file.into()));
    }

    #[test]
    fn test_auto_create_governed_by_caller() {
        let root = Directory::new("root");
        let sub = Directory::with_auto_create("sub", true);
        root.append(sub.clone()).unwrap();
        // Appending copied root's flag onto sub
        assert!(!sub.auto_create());

        sub.set_auto_create(true);
        assert!(root.open_file("sub/new.txt").unwrap_err().is_not_found());
        assert!(sub.open_file("new.txt").is_ok());
    }

    #[test]
    fn test_with_file_closes() {
        let dir = Directory::with_auto_create("d", true);
        dir.with_file("log.txt", |f| f.write("entry")).unwrap();

        let file = dir.open_file("log.txt").unwrap();
        assert!(file.is_closed());
        assert_eq!(file.peek(), "entry");
    }

    #[test]
    fn test_walk_lists_descendants() {
        let dir = Directory::with_auto_create("d", true);
        dir.open_file("a/b/c").unwrap();
        dir.open_file("z").unwrap();

        let paths: Vec<String> = dir.walk().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["a", "a/b", "a/b/c", "z"]);
    }

    #[test]
    fn test_display_joins_lines() {
        let dir = Directory::new("d");
        dir.append(File::new("f")).unwrap();
        assert_eq!(dir.to_string(), "Directory.d\n    File.f");
    }
}
