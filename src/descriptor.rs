//! Resource descriptors: where the bytes of a resource live.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    LocalFileConnector, PackageFileConnector, PackageLimits, ResourceConnector, ResourceType,
};

/// Descriptor of a file in the local file system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalFile {
    /// Host path of the file. `~` is expanded when the file is loaded.
    pub path: PathBuf,
    /// Declared MIME type; guessed on load when absent.
    #[serde(rename = "contenttype", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl LocalFile {
    /// Describe the file at `path` with no declared content type.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            content_type: None,
        }
    }

    /// Declare the MIME type of the file.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Descriptor of a file stored inside a resource package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageFile {
    /// Path of the member inside the package, e.g. `/directory1/file1.txt`.
    pub path: String,
    /// Host path of the package. Bound when the package is opened.
    #[serde(rename = "package", default, skip_serializing_if = "Option::is_none")]
    pub package_path: Option<PathBuf>,
    /// Declared MIME type; guessed on load when absent.
    #[serde(rename = "contenttype", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl PackageFile {
    /// Describe the member at `path` of a not yet bound package.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            package_path: None,
            content_type: None,
        }
    }

    /// Bind the descriptor to the package at `package_path`.
    pub fn with_package(mut self, package_path: impl Into<PathBuf>) -> Self {
        self.package_path = Some(package_path.into());
        self
    }

    /// Declare the MIME type of the member.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Serializable description of a resource's storage.
///
/// Tagged by `"type"` in its serialized form:
///
/// ```rust
/// use murasame_vfs::ResourceDescriptor;
///
/// let json = r#"{"type": "localfile", "path": "/data/app.json"}"#;
/// let descriptor: ResourceDescriptor = serde_json::from_str(json).unwrap();
/// assert!(matches!(descriptor, ResourceDescriptor::LocalFile(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResourceDescriptor {
    /// File in the local file system.
    #[serde(rename = "localfile")]
    LocalFile(LocalFile),
    /// Member of a resource package.
    #[serde(rename = "packagefile")]
    PackageFile(PackageFile),
}

impl ResourceDescriptor {
    /// The storage type of the described resource.
    pub fn resource_type(&self) -> ResourceType {
        match self {
            ResourceDescriptor::LocalFile(_) => ResourceType::LocalFile,
            ResourceDescriptor::PackageFile(_) => ResourceType::PackageFile,
        }
    }

    /// The declared MIME type, if any.
    pub fn content_type(&self) -> Option<&str> {
        match self {
            ResourceDescriptor::LocalFile(file) => file.content_type.as_deref(),
            ResourceDescriptor::PackageFile(file) => file.content_type.as_deref(),
        }
    }

    /// Replace the declared MIME type.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        let content_type = Some(content_type.into());
        match self {
            ResourceDescriptor::LocalFile(file) => file.content_type = content_type,
            ResourceDescriptor::PackageFile(file) => file.content_type = content_type,
        }
    }

    /// Create the connector able to load this descriptor.
    ///
    /// `limits` bound package reads; local files ignore them.
    pub fn create_connector(&self, limits: &PackageLimits) -> Box<dyn ResourceConnector> {
        match self {
            ResourceDescriptor::LocalFile(_) => Box::new(LocalFileConnector),
            ResourceDescriptor::PackageFile(_) => Box::new(PackageFileConnector::new(limits.clone())),
        }
    }

    /// Bind package descriptors to `package_path`; local files are unchanged.
    pub(crate) fn bind_package(&mut self, package_path: &Path) {
        if let ResourceDescriptor::PackageFile(file) = self {
            file.package_path = Some(package_path.to_path_buf());
        }
    }

    /// Resolve a relative local file path against `base`.
    pub(crate) fn anchor_local_path(&mut self, base: &Path) {
        if let ResourceDescriptor::LocalFile(file) = self {
            if file.path.is_relative() && !file.path.starts_with("~") {
                file.path = base.join(&file.path);
            }
        }
    }
}

impl From<LocalFile> for ResourceDescriptor {
    fn from(file: LocalFile) -> Self {
        ResourceDescriptor::LocalFile(file)
    }
}

impl From<PackageFile> for ResourceDescriptor {
    fn from(file: PackageFile) -> Self {
        ResourceDescriptor::PackageFile(file)
    }
}
