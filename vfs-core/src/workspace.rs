//! Workspace - several drives mounted side by side.
//!
//! A Workspace provides:
//! - Drives keyed by name (`V:`, `R:`, ...), kept in mount order
//! - Paths that start with a drive name, e.g. `V:/docs/readme.txt`
//!
//! Trees are built from `Rc` handles, so a workspace stays on one thread.
//! Callers needing shared access wrap the whole workspace in their own lock.

use indexmap::IndexMap;
use log::debug;

use crate::config::VfsConfig;
use crate::error::{VfsError, VfsResult};
use crate::fs::{Directory, Drive, File, Node};
use crate::manifest::TreeManifest;

#[derive(Debug, Default)]
pub struct Workspace {
    drives: IndexMap<String, Drive>,
}

impl Workspace {
    /// Create a new empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a drive under its own name.
    pub fn mount(&mut self, drive: Drive) -> VfsResult<()> {
        let name = drive.name();
        if self.drives.contains_key(&name) {
            return Err(VfsError::DriveExists(name));
        }
        debug!("mount {}", name);
        self.drives.insert(name, drive);
        Ok(())
    }

    /// Create and mount an empty drive, returning a handle to it.
    pub fn create_drive(&mut self, name: &str, auto_create: bool) -> VfsResult<Drive> {
        let drive = Drive::new(name, auto_create);
        self.mount(drive.clone())?;
        Ok(drive)
    }

    /// Create and mount a drive described by `config`.
    pub fn mount_config(&mut self, config: &VfsConfig) -> VfsResult<Drive> {
        let drive = Drive::from_config(config);
        self.mount(drive.clone())?;
        Ok(drive)
    }

    /// Build and mount the drive described by `manifest`.
    pub fn mount_manifest(&mut self, manifest: &TreeManifest) -> VfsResult<Drive> {
        let drive = manifest.build()?;
        self.mount(drive.clone())?;
        Ok(drive)
    }

    /// Unmount a drive, handing it back to the caller.
    pub fn unmount(&mut self, name: &str) -> VfsResult<Drive> {
        let drive = self
            .drives
            .shift_remove(name)
            .ok_or_else(|| VfsError::DriveNotMounted(name.to_string()))?;
        debug!("unmount {}", name);
        Ok(drive)
    }

    pub fn is_mounted(&self, name: &str) -> bool {
        self.drives.contains_key(name)
    }

    pub fn drive(&self, name: &str) -> Option<&Drive> {
        self.drives.get(name)
    }

    /// Mounted drives in mount order.
    pub fn drives(&self) -> impl Iterator<Item = &Drive> {
        self.drives.values()
    }

    /// Split `V:/rest` into the mounted drive and `rest`.
    fn split_drive<'a>(&self, path: &'a str) -> VfsResult<(&Drive, &'a str)> {
        let path = path.trim_start_matches(|c: char| c == '/' || c == '\\');
        let (name, rest) = match path.find(|c: char| c == '/' || c == '\\') {
            Some(pos) => (&path[..pos], &path[pos + 1..]),
            None => (path, ""),
        };
        let drive = self
            .drives
            .get(name)
            .ok_or_else(|| VfsError::DriveNotMounted(name.to_string()))?;
        Ok((drive, rest))
    }

    /// Look up a drive-qualified path without creating anything.
    pub fn open(&self, path: &str) -> VfsResult<Node> {
        let (drive, rest) = self.split_drive(path)?;
        drive.open(rest)
    }

    pub fn open_file(&self, path: &str) -> VfsResult<File> {
        let (drive, rest) = self.split_drive(path)?;
        drive.open_file(rest)
    }

    pub fn open_directory(&self, path: &str) -> VfsResult<Directory> {
        let (drive, rest) = self.split_drive(path)?;
        drive.open_directory(rest)
    }

    /// Rendered lines of every drive, in mount order.
    pub fn render(&self) -> impl Iterator<Item = String> + '_ {
        self.drives.values().flat_map(|drive| drive.render())
    }
}
