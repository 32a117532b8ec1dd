//! Configuration of the virtual file system.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{DESCRIPTOR_FILE_NAME, VfsError};

/// Archive extensions that may not appear inside a resource package.
pub const DEFAULT_BLOCKED_EXTENSIONS: &[&str] = &["zip", "rar", "arj", "gz", "tar", "7z", "bz2"];

/// Bounds applied to every resource package before it is read or extracted.
///
/// # Example
///
/// ```rust
/// use murasame_vfs::PackageLimits;
///
/// let limits = PackageLimits::default()
///     .with_max_member_count(100)
///     .with_max_member_size(1024 * 1024);
/// assert_eq!(limits.max_member_count, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageLimits {
    /// Maximum number of members in one archive.
    pub max_member_count: usize,
    /// Maximum size in bytes of a single member.
    pub max_member_size: u64,
    /// Maximum size in bytes of all members combined.
    pub max_total_size: u64,
    /// Extensions (without the dot, case-insensitive) rejected inside archives.
    pub blocked_extensions: Vec<String>,
}

impl PackageLimits {
    /// Set the maximum number of members.
    pub fn with_max_member_count(mut self, count: usize) -> Self {
        self.max_member_count = count;
        self
    }

    /// Set the maximum size of a single member.
    pub fn with_max_member_size(mut self, size: u64) -> Self {
        self.max_member_size = size;
        self
    }

    /// Set the maximum combined size of all members.
    pub fn with_max_total_size(mut self, size: u64) -> Self {
        self.max_total_size = size;
        self
    }

    /// Replace the list of blocked extensions.
    pub fn with_blocked_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocked_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Returns `true` if `extension` is on the block list.
    pub fn is_blocked_extension(&self, extension: &str) -> bool {
        self.blocked_extensions
            .iter()
            .any(|blocked| blocked.eq_ignore_ascii_case(extension))
    }
}

impl Default for PackageLimits {
    fn default() -> Self {
        Self {
            max_member_count: 10_000,
            max_member_size: 256 * 1024 * 1024,
            max_total_size: 1024 * 1024 * 1024,
            blocked_extensions: DEFAULT_BLOCKED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Settings of a [`Vfs`](crate::Vfs) instance.
///
/// All fields have defaults, so a partial JSON document is enough:
///
/// ```rust
/// use murasame_vfs::VfsConfig;
///
/// let config = VfsConfig::from_json_str(r#"{"limits": {"max_member_count": 50}}"#).unwrap();
/// assert_eq!(config.limits.max_member_count, 50);
/// assert_eq!(config.descriptor_file, ".vfs");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VfsConfig {
    /// Name of the node tree descriptor looked up in source directories.
    pub descriptor_file: String,
    /// Bounds for resource packages.
    pub limits: PackageLimits,
}

impl VfsConfig {
    /// Parse a configuration from JSON.
    ///
    /// # Errors
    ///
    /// - [`VfsError::Deserialization`] if the document is not valid
    pub fn from_json_str(json: &str) -> Result<Self, VfsError> {
        serde_json::from_str(json).map_err(|e| VfsError::Deserialization(e.to_string()))
    }

    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if the file does not exist
    /// - [`VfsError::Deserialization`] if the document is not valid
    pub fn load(path: &Path) -> Result<Self, VfsError> {
        let data = std::fs::read_to_string(path).map_err(|e| VfsError::io("read", path, e))?;
        Self::from_json_str(&data)
    }

    /// Set the descriptor file name.
    pub fn with_descriptor_file(mut self, name: impl Into<String>) -> Self {
        self.descriptor_file = name.into();
        self
    }

    /// Set the package limits.
    pub fn with_limits(mut self, limits: PackageLimits) -> Self {
        self.limits = limits;
        self
    }
}

impl Default for VfsConfig {
    fn default() -> Self {
        Self {
            descriptor_file: DESCRIPTOR_FILE_NAME.to_string(),
            limits: PackageLimits::default(),
        }
    }
}
