//! Drive - the named root of a tree.

use std::fmt;
use std::ops::Deref;

use log::debug;

use super::directory::Directory;
use super::node::Node;
use crate::config::VfsConfig;

/// Name used when none is given.
pub const DEFAULT_DRIVE_NAME: &str = "V:";

/// A root directory, conventionally named like `V:`.
///
/// Derefs to [`Directory`], so the whole directory API is available on it.
#[derive(Clone)]
pub struct Drive {
    root: Directory,
}

impl Drive {
    pub fn new(name: impl Into<String>, auto_create: bool) -> Self {
        let root = Directory::with_auto_create(name, auto_create);
        root.mark_drive();
        Self { root }
    }

    /// Build an empty drive from configuration.
    pub fn from_config(config: &VfsConfig) -> Self {
        debug!(
            "create drive {} (auto_create={}, files={:?})",
            config.drive, config.auto_create, config.files
        );
        let drive = Self::new(config.drive.clone(), config.auto_create);
        drive.set_file_defaults(config.files);
        drive
    }

    pub fn root(&self) -> &Directory {
        &self.root
    }

    pub fn into_node(self) -> Node {
        Node::Directory(self.root)
    }
}

impl Default for Drive {
    fn default() -> Self {
        Self::new(DEFAULT_DRIVE_NAME, false)
    }
}

impl Deref for Drive {
    type Target = Directory;

    fn deref(&self) -> &Directory {
        &self.root
    }
}

impl From<Drive> for Node {
    fn from(drive: Drive) -> Self {
        drive.into_node()
    }
}

impl fmt::Display for Drive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}

impl fmt::Debug for Drive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.root, f)
    }
}
