//! File - a leaf node with an in-memory buffer and an open/closed state.

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::directory::{Directory, WeakDir};
use crate::error::{VfsError, VfsResult};

/// Buffer type selected when a file is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileMode {
    #[default]
    Text,
    Binary,
}

impl FileMode {
    /// Parse open-mode flags such as `"t"`, `"b"` or `"rb"`.
    /// Any flag string containing `b` selects binary, everything else is text.
    pub fn parse(flags: &str) -> Self {
        if flags.contains('b') {
            FileMode::Binary
        } else {
            FileMode::Text
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileMode::Text => "text",
            FileMode::Binary => "binary",
        }
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File content, typed by the file's mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Binary(Vec<u8>),
}

impl Content {
    /// Empty buffer of the type `mode` selects.
    pub fn empty(mode: FileMode) -> Self {
        match mode {
            FileMode::Text => Content::Text(String::new()),
            FileMode::Binary => Content::Binary(Vec::new()),
        }
    }

    pub fn mode(&self) -> FileMode {
        match self {
            Content::Text(_) => FileMode::Text,
            Content::Binary(_) => FileMode::Binary,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Content::Text(s) => s.as_bytes(),
            Content::Binary(b) => b,
        }
    }

    /// Text content, or `None` for a binary buffer.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(s) => Some(s),
            Content::Binary(_) => None,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Content::Text(s) => s.into_bytes(),
            Content::Binary(b) => b,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append `data`, keeping this buffer's type.
    /// Text goes into binary buffers as UTF-8; bytes never go into text buffers.
    fn push(&mut self, data: Content, name: &str) -> VfsResult<()> {
        match (self, data) {
            (Content::Text(buf), Content::Text(s)) => buf.push_str(&s),
            (Content::Binary(buf), data) => buf.extend_from_slice(data.as_bytes()),
            (Content::Text(_), Content::Binary(_)) => {
                return Err(VfsError::ModeMismatch {
                    name: name.to_string(),
                    mode: FileMode::Text,
                })
            }
        }
        Ok(())
    }
}

impl Default for Content {
    fn default() -> Self {
        Content::empty(FileMode::default())
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::Text(s.to_string())
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::Text(s)
    }
}

impl From<Vec<u8>> for Content {
    fn from(b: Vec<u8>) -> Self {
        Content::Binary(b)
    }
}

impl From<&[u8]> for Content {
    fn from(b: &[u8]) -> Self {
        Content::Binary(b.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Content {
    fn from(b: &[u8; N]) -> Self {
        Content::Binary(b.to_vec())
    }
}

impl PartialEq<str> for Content {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for Content {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

/// Construction options for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileOptions {
    pub mode: FileMode,
    /// Reject I/O once the file is closed
    pub enforce_closed: bool,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            mode: FileMode::Text,
            enforce_closed: true,
        }
    }
}

impl FileOptions {
    pub fn text() -> Self {
        Self::default()
    }

    pub fn binary() -> Self {
        Self {
            mode: FileMode::Binary,
            ..Self::default()
        }
    }

    pub fn with_enforce_closed(mut self, enforce: bool) -> Self {
        self.enforce_closed = enforce;
        self
    }
}

struct FileInner {
    name: String,
    parent: WeakDir,
    content: Content,
    closed: bool,
    enforce_closed: bool,
}

/// A file node.
///
/// Files start open. `close()` moves them to the terminal closed state. While
/// `enforce_closed` is set, `read`, `write`, `truncate` and `close` on a closed
/// file fail with [`VfsError::InvalidState`]; otherwise closed state is ignored.
///
/// `File` is a shared handle: clones refer to the same file.
#[derive(Clone)]
pub struct File {
    inner: Rc<RefCell<FileInner>>,
}

impl File {
    /// Create an open text file that enforces its closed state.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_options(name, FileOptions::default())
    }

    pub fn with_options(name: impl Into<String>, options: FileOptions) -> Self {
        Self {
            inner: Rc::new(RefCell::new(FileInner {
                name: name.into(),
                parent: Weak::new(),
                content: Content::empty(options.mode),
                closed: false,
                enforce_closed: options.enforce_closed,
            })),
        }
    }

    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    pub fn parent(&self) -> Option<Directory> {
        self.inner.borrow().parent.upgrade().map(Directory::from_cell)
    }

    pub fn mode(&self) -> FileMode {
        self.inner.borrow().content.mode()
    }

    pub fn options(&self) -> FileOptions {
        let inner = self.inner.borrow();
        FileOptions {
            mode: inner.content.mode(),
            enforce_closed: inner.enforce_closed,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.borrow().closed
    }

    pub fn enforces_closed(&self) -> bool {
        self.inner.borrow().enforce_closed
    }

    /// Buffer length in bytes. Not guarded by the closed state.
    pub fn len(&self) -> usize {
        self.inner.borrow().content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ptr_eq(&self, other: &File) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn check_open(&self) -> VfsResult<()> {
        let inner = self.inner.borrow();
        if inner.enforce_closed && inner.closed {
            return Err(VfsError::closed_file());
        }
        Ok(())
    }

    /// Return the whole buffer.
    pub fn read(&self) -> VfsResult<Content> {
        self.check_open()?;
        Ok(self.inner.borrow().content.clone())
    }

    /// Append `data` to the buffer.
    pub fn write(&self, data: impl Into<Content>) -> VfsResult<()> {
        self.check_open()?;
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        inner.content.push(data.into(), &inner.name)
    }

    /// Reset the buffer to empty, keeping its mode.
    pub fn truncate(&self) -> VfsResult<()> {
        self.check_open()?;
        let mut inner = self.inner.borrow_mut();
        trace!("truncate {}", inner.name);
        let mode = inner.content.mode();
        inner.content = Content::empty(mode);
        Ok(())
    }

    pub fn close(&self) -> VfsResult<()> {
        self.check_open()?;
        let mut inner = self.inner.borrow_mut();
        trace!("close {}", inner.name);
        inner.closed = true;
        Ok(())
    }

    /// Acquire the file for a scope. The returned guard closes it when dropped.
    pub fn scoped(&self) -> FileGuard {
        FileGuard {
            file: self.clone(),
            finished: false,
        }
    }

    /// Run `f` with the file, then close it whatever `f` returned.
    ///
    /// An error from `f` takes precedence over an error from closing.
    pub fn with<R, F>(&self, f: F) -> VfsResult<R>
    where
        F: FnOnce(&File) -> VfsResult<R>,
    {
        let guard = self.scoped();
        let result = f(&guard);
        let closed = guard.finish();
        let value = result?;
        closed?;
        Ok(value)
    }

    /// Buffer contents without the closed-state guard, for snapshots.
    pub(crate) fn peek(&self) -> Content {
        self.inner.borrow().content.clone()
    }

    pub(crate) fn set_parent(&self, parent: WeakDir) {
        self.inner.borrow_mut().parent = parent;
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("File")
            .field("name", &inner.name)
            .field("mode", &inner.content.mode())
            .field("closed", &inner.closed)
            .field("enforce_closed", &inner.enforce_closed)
            .finish()
    }
}

/// Scoped acquisition of a [`File`].
///
/// Derefs to the file. On drop the file is closed, on every exit path including
/// early returns and unwinding. Use [`FileGuard::finish`] to observe the result
/// of closing.
pub struct FileGuard {
    file: File,
    finished: bool,
}

impl FileGuard {
    /// Close the file now and report the outcome.
    pub fn finish(mut self) -> VfsResult<()> {
        self.finished = true;
        self.file.close()
    }
}

impl Deref for FileGuard {
    type Target = File;

    fn deref(&self) -> &File {
        &self.file
    }
}

impl Drop for FileGuard {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.file.close() {
            debug!("scoped close of {} failed: {}", self.file.name(), e);
        }
    }
}
