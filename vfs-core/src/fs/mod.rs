//! The in-memory tree.
//!
//! - `Node`: a directory or a file, shared by handle
//! - `File`: leaf with an in-memory buffer and an open/closed state
//! - `Directory`: ordered, named children and the path walk
//! - `Drive`: a directory serving as the root of a tree

mod directory;
mod drive;
mod file;
mod node;
mod path;
mod render;

pub use directory::Directory;
pub use drive::{Drive, DEFAULT_DRIVE_NAME};
pub use file::{Content, File, FileGuard, FileMode, FileOptions};
pub use node::{Node, NodeKind};
pub use path::{is_valid_name, join_path, split_path};
pub use render::{Render, INDENT};
