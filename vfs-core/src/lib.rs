//! In-memory hierarchical virtual filesystem.
//!
//! This crate provides a tree of named directories and files that lives
//! entirely in memory:
//! - Path lookup with `/` or `\` separators
//! - Optional auto-creation of missing path segments
//! - Open/read/write/truncate/close on files, with an enforceable closed state
//! - Rendering of a subtree as indented `Kind.name` lines
//!
//! # Architecture
//!
//! - `Node`: either a `Directory` or a `File`, both shared handles
//! - `Directory`: owns its ordered children, children point back weakly
//! - `Drive`: the named root of a tree (`V:` by default)
//! - `Workspace`: several drives addressed by `V:/path` style paths
//! - `TreeManifest`: JSON description used to seed or export a tree
//!
//! The tree is single-threaded and performs no I/O on file content.
//!
//! ```
//! use vfs_core::Drive;
//!
//! let drive = Drive::new("V:", true);
//! drive.open_file("docs/readme.txt")?.write("hello")?;
//! assert_eq!(drive.open_file("docs/readme.txt")?.read()?, "hello");
//! assert_eq!(
//!     drive.to_string(),
//!     "Drive.V:\n    Directory.docs\n        File.readme.txt"
//! );
//! # Ok::<(), vfs_core::VfsError>(())
//! ```

pub mod config;
pub mod error;
pub mod fs;
pub mod manifest;
pub mod workspace;

pub use config::VfsConfig;
pub use error::{VfsError, VfsResult};
pub use fs::{
    is_valid_name, join_path, split_path, Content, Directory, Drive, File, FileGuard, FileMode,
    FileOptions, Node, NodeKind, Render, DEFAULT_DRIVE_NAME, INDENT,
};
pub use manifest::{
    load_manifest, load_manifest_from_path, load_manifests, snapshot, EntryType,
    ManifestContent, ManifestEntry, TreeManifest,
};
pub use workspace::Workspace;
