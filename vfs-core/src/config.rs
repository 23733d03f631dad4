//! Drive configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::VfsResult;
use crate::fs::{FileOptions, DEFAULT_DRIVE_NAME};

/// Configuration for a drive and the files its path walks create.
///
/// ```json
/// { "drive": "V:", "autoCreate": true, "files": { "mode": "text", "enforceClosed": true } }
/// ```
///
/// Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VfsConfig {
    /// Drive (root directory) name
    pub drive: String,
    /// Create missing path segments instead of failing
    pub auto_create: bool,
    /// Options for auto-created files
    pub files: FileOptions,
}

impl Default for VfsConfig {
    fn default() -> Self {
        Self {
            drive: DEFAULT_DRIVE_NAME.to_string(),
            auto_create: false,
            files: FileOptions::default(),
        }
    }
}

impl VfsConfig {
    pub fn from_json(text: &str) -> VfsResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> VfsResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VfsError;
    use crate::fs::FileMode;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = VfsConfig::from_json("{}").unwrap();
        assert_eq!(config, VfsConfig::default());
        assert_eq!(config.drive, "V:");
        assert!(config.files.enforce_closed);
    }

    #[test]
    fn test_full_config() {
        let config = VfsConfig::from_json(
            r#"{"drive":"R:","autoCreate":true,"files":{"mode":"binary","enforceClosed":false}}"#,
        )
        .unwrap();
        assert_eq!(config.drive, "R:");
        assert!(config.auto_create);
        assert_eq!(config.files.mode, FileMode::Binary);
        assert!(!config.files.enforce_closed);
    }

    #[test]
    fn test_invalid_json() {
        let err = VfsConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, VfsError::Json(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = VfsConfig::from_path("/nonexistent/vfs.json").unwrap_err();
        assert!(matches!(err, VfsError::Io(_)));
    }
}
