//! Tree manifests: JSON descriptions used to seed a drive or export one.
//!
//! A manifest names a drive and lists its entries by path:
//!
//! ```json
//! {
//!   "drive": "V:",
//!   "autoCreate": false,
//!   "entries": [
//!     { "path": "docs", "type": "directory" },
//!     { "path": "mnt/D:", "type": "drive" },
//!     { "path": "docs/readme.txt", "content": "hello" },
//!     { "path": "bin/tool", "mode": "binary", "content": [201, 0] }
//!   ]
//! }
//! ```
//!
//! The manifest data may also be an array of such objects.

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{VfsError, VfsResult};
use crate::fs::{
    split_path, Content, Directory, Drive, File, FileMode, FileOptions, Node, NodeKind,
    DEFAULT_DRIVE_NAME,
};

/// Entry kind in a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    #[default]
    File,
    Directory,
    /// A drive mounted inside the tree
    Drive,
}

/// File content as stored in a manifest: a string or an array of bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManifestContent {
    Text(String),
    Bytes(Vec<u8>),
}

impl From<ManifestContent> for Content {
    fn from(content: ManifestContent) -> Self {
        match content {
            ManifestContent::Text(s) => Content::Text(s),
            ManifestContent::Bytes(b) => Content::Binary(b),
        }
    }
}

impl From<Content> for ManifestContent {
    fn from(content: Content) -> Self {
        match content {
            Content::Text(s) => ManifestContent::Text(s),
            Content::Binary(b) => ManifestContent::Bytes(b),
        }
    }
}

/// One node of the tree, addressed by its path relative to the drive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub path: String,
    #[serde(rename = "type")]
    #[serde(default)]
    pub entry_type: EntryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ManifestContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<FileMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforce_closed: Option<bool>,
    /// Close the file after writing its content
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub closed: bool,
}

impl ManifestEntry {
    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            entry_type: EntryType::Directory,
            content: None,
            mode: None,
            enforce_closed: None,
            closed: false,
        }
    }

    pub fn drive(path: impl Into<String>) -> Self {
        Self {
            entry_type: EntryType::Drive,
            ..Self::directory(path)
        }
    }

    pub fn file(path: impl Into<String>, content: impl Into<Content>) -> Self {
        let content: Content = content.into();
        Self {
            path: path.into(),
            entry_type: EntryType::File,
            mode: Some(content.mode()),
            content: Some(content.into()),
            enforce_closed: None,
            closed: false,
        }
    }
}

/// Manifest schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeManifest {
    #[serde(default = "default_drive")]
    pub drive: String,
    #[serde(default)]
    pub auto_create: bool,
    /// Defaults for files created without an explicit mode
    #[serde(default)]
    pub files: FileOptions,
    #[serde(default)]
    pub entries: Vec<ManifestEntry>,
}

fn default_drive() -> String {
    DEFAULT_DRIVE_NAME.to_string()
}

impl Default for TreeManifest {
    fn default() -> Self {
        Self {
            drive: default_drive(),
            auto_create: false,
            files: FileOptions::default(),
            entries: Vec::new(),
        }
    }
}

impl TreeManifest {
    /// Create a drive holding the manifest's entries.
    pub fn build(&self) -> VfsResult<Drive> {
        let drive = Drive::new(self.drive.clone(), self.auto_create);
        drive.set_file_defaults(self.files);
        self.apply_to(&drive)?;
        Ok(drive)
    }

    /// Add the manifest's entries to an existing tree.
    ///
    /// Intermediate directories are created as needed whatever the target's
    /// `auto_create` flag says. Content of an existing file is appended to.
    /// The target keeps its own `auto_create` flag and file defaults.
    pub fn apply_to(&self, dir: &Directory) -> VfsResult<()> {
        for entry in &self.entries {
            materialize(dir, entry)?;
        }
        debug!("applied {} entries to {}", self.entries.len(), dir.path());
        Ok(())
    }

    pub fn to_json(&self) -> VfsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Find the directory `name` under `parent`, creating it (as a drive when
/// `drive` is set) if it is missing. An existing directory is kept as it is.
fn ensure_directory(parent: &Directory, name: &str, drive: bool) -> VfsResult<Directory> {
    match parent.get(name) {
        Some(Node::Directory(dir)) => Ok(dir),
        Some(Node::File(_)) => Err(VfsError::TypeMismatch {
            path: format!("{}/{}", parent.path(), name),
            expected: NodeKind::Directory,
        }),
        None => {
            let dir = if drive {
                Drive::new(name, false).root().clone()
            } else {
                Directory::new(name)
            };
            parent.append(dir.clone())?;
            Ok(dir)
        }
    }
}

fn materialize(root: &Directory, entry: &ManifestEntry) -> VfsResult<()> {
    let segments = split_path(&entry.path);
    let Some((leaf, parents)) = segments.split_last() else {
        // An empty path names the root itself
        return match entry.entry_type {
            EntryType::Directory | EntryType::Drive => Ok(()),
            EntryType::File => Err(VfsError::TypeMismatch {
                path: entry.path.clone(),
                expected: NodeKind::File,
            }),
        };
    };

    let mut current = root.clone();
    for segment in parents {
        current = ensure_directory(&current, segment, false)?;
    }

    match entry.entry_type {
        EntryType::Directory => {
            ensure_directory(&current, leaf, false)?;
        }
        EntryType::Drive => {
            ensure_directory(&current, leaf, true)?;
        }
        EntryType::File => {
            let file = match current.get(leaf) {
                Some(Node::File(file)) => file,
                Some(Node::Directory(_)) => {
                    return Err(VfsError::TypeMismatch {
                        path: entry.path.clone(),
                        expected: NodeKind::File,
                    })
                }
                None => {
                    let defaults = root.file_defaults();
                    let options = FileOptions {
                        mode: entry.mode.unwrap_or(defaults.mode),
                        enforce_closed: entry.enforce_closed.unwrap_or(defaults.enforce_closed),
                    };
                    let file = File::with_options(*leaf, options);
                    current.append(file.clone())?;
                    file
                }
            };
            if let Some(content) = &entry.content {
                file.write(content.clone())?;
            }
            if entry.closed {
                file.close()?;
            }
        }
    }
    Ok(())
}

/// Export a tree as a manifest.
///
/// Closed files are exported too; their content is read without the
/// closed-state guard. Drives mounted inside the tree keep their kind, and
/// `dir`'s file defaults are carried in `files`. Building the result yields a
/// drive that renders the same way as `dir` when `dir` is itself a drive.
pub fn snapshot(dir: &Directory) -> TreeManifest {
    let entries = dir
        .walk()
        .into_iter()
        .map(|(path, node)| match node {
            Node::Directory(dir) if dir.kind() == NodeKind::Drive => ManifestEntry::drive(path),
            Node::Directory(_) => ManifestEntry::directory(path),
            Node::File(file) => {
                let options = file.options();
                let content = file.peek();
                ManifestEntry {
                    path,
                    entry_type: EntryType::File,
                    content: (!content.is_empty()).then(|| content.into()),
                    mode: Some(options.mode),
                    enforce_closed: Some(options.enforce_closed),
                    closed: file.is_closed(),
                }
            }
        })
        .collect();

    TreeManifest {
        drive: dir.name(),
        auto_create: dir.auto_create(),
        files: dir.file_defaults(),
        entries,
    }
}

/// Load manifests from JSON text.
/// Accepts a single object or an array of objects.
pub fn load_manifests(text: &str) -> VfsResult<Vec<TreeManifest>> {
    let data: serde_json::Value = serde_json::from_str(text)?;
    if data.is_array() {
        Ok(serde_json::from_value(data)?)
    } else {
        Ok(vec![serde_json::from_value(data)?])
    }
}

/// Load a single manifest (convenience wrapper).
/// Several manifests are merged: the first one names the drive, entries are
/// concatenated in order.
pub fn load_manifest(text: &str) -> VfsResult<TreeManifest> {
    let mut manifests = load_manifests(text)?.into_iter();
    let Some(mut merged) = manifests.next() else {
        return Ok(TreeManifest::default());
    };
    for manifest in manifests {
        merged.entries.extend(manifest.entries);
    }
    Ok(merged)
}

/// Load a manifest from a file path.
pub fn load_manifest_from_path<P: AsRef<Path>>(path: P) -> VfsResult<TreeManifest> {
    let text = std::fs::read_to_string(path)?;
    load_manifest(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "drive": "V:",
        "entries": [
            { "path": "docs", "type": "directory" },
            { "path": "docs/readme.txt", "content": "hello" },
            { "path": "bin/tool", "mode": "binary", "content": [201, 0] },
            { "path": "logs/old.log", "content": "done", "closed": true }
        ]
    }"#;

    #[test]
    fn test_build_sample() {
        let drive = load_manifest(SAMPLE).unwrap().build().unwrap();
        assert!(!drive.auto_create());

        let readme = drive.open_file("docs/readme.txt").unwrap();
        assert_eq!(readme.read().unwrap(), "hello");

        let tool = drive.open_file("bin/tool").unwrap();
        assert_eq!(tool.read().unwrap(), Content::Binary(vec![201, 0]));

        let log = drive.open_file("logs/old.log").unwrap();
        assert!(log.is_closed());
        assert!(log.read().unwrap_err().is_invalid_state());
    }

    #[test]
    fn test_array_manifests_merge() {
        let text = r#"[
            { "drive": "A:", "entries": [ { "path": "one" } ] },
            { "drive": "B:", "entries": [ { "path": "two" } ] }
        ]"#;
        assert_eq!(load_manifests(text).unwrap().len(), 2);

        let merged = load_manifest(text).unwrap();
        assert_eq!(merged.drive, "A:");
        assert_eq!(merged.entries.len(), 2);
        assert_eq!(merged.entries[1].entry_type, EntryType::File);
    }

    #[test]
    fn test_empty_array_gives_default() {
        assert_eq!(load_manifest("[]").unwrap(), TreeManifest::default());
    }

    #[test]
    fn test_file_in_directory_position_fails() {
        let manifest = TreeManifest {
            entries: vec![
                ManifestEntry::file("a", "x"),
                ManifestEntry::directory("a/b"),
            ],
            ..TreeManifest::default()
        };
        assert!(manifest.build().unwrap_err().is_type_mismatch());
    }

    #[test]
    fn test_bytes_into_text_file_fails() {
        let text = r#"{ "entries": [ { "path": "t.txt", "mode": "text", "content": [1, 2] } ] }"#;
        let err = load_manifest(text).unwrap().build().unwrap_err();
        assert!(matches!(err, VfsError::ModeMismatch { .. }));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let drive = Drive::new("V:", true);
        drive.open_file("a/b/c.txt").unwrap().write("text").unwrap();
        drive
            .open_directory("a/empty")
            .unwrap()
            .append(File::with_options("raw", FileOptions::binary()))
            .unwrap();
        let closed = drive.open_file("z").unwrap();
        closed.close().unwrap();
        let mounted = Drive::new("D:", false);
        drive.open_directory("mnt").unwrap().append(mounted.clone()).unwrap();
        mounted.append(File::new("f")).unwrap();
        drive.set_file_defaults(FileOptions::binary());

        let manifest = snapshot(&drive);
        assert!(manifest.auto_create);
        assert_eq!(manifest.files, FileOptions::binary());
        let json = manifest.to_json().unwrap();
        let rebuilt = load_manifest(&json).unwrap().build().unwrap();

        assert_eq!(rebuilt.to_string(), drive.to_string());
        assert_eq!(rebuilt.open_file("a/b/c.txt").unwrap().read().unwrap(), "text");
        assert_eq!(
            rebuilt.open_file("a/empty/raw").unwrap().mode(),
            FileMode::Binary
        );
        assert!(rebuilt.open_file("z").unwrap().is_closed());
        assert!(rebuilt.to_string().contains("        Drive.D:\n            File.f"));
        assert_eq!(rebuilt.open("mnt/D:").unwrap().kind(), NodeKind::Drive);
        assert_eq!(rebuilt.open_file("new").unwrap().mode(), FileMode::Binary);
    }

    #[test]
    fn test_drive_entry_builds_nested_drive() {
        let text = r#"{
            "drive": "V:",
            "files": { "mode": "binary" },
            "entries": [
                { "path": "D:", "type": "drive" },
                { "path": "D:/f" }
            ]
        }"#;
        let drive = load_manifest(text).unwrap().build().unwrap();
        assert_eq!(drive.to_string(), "Drive.V:\n    Drive.D:\n        File.f");
        assert_eq!(drive.file_defaults().mode, FileMode::Binary);
        assert_eq!(drive.open_file("D:/f").unwrap().mode(), FileMode::Binary);
    }
}
