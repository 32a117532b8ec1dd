//! # Resource Packages
//!
//! A resource package is a tar archive (optionally gzip-compressed) holding
//! resource files and a `.vfs` descriptor that maps VFS keys to members.
//!
//! ## Layout
//!
//! ```text
//! base.pkg
//! ├── .vfs                    node tree, "packagefile" descriptors
//! ├── directory1/file1.txt
//! └── directory2/file2.txt
//! ```
//!
//! Opening a package validates every member (see [`SecureArchive`]) before
//! the descriptor is read, then binds each package file descriptor to the
//! package's host path so the resources can be loaded later. A descriptor
//! holding anything but package files is rejected, so a package can never
//! expose host files.

mod archive;
mod builder;
mod connector;

use std::path::{Path, PathBuf};

use tracing::{error, info};

pub use archive::{MemberInfo, MemberKind, SecureArchive};
pub use builder::PackageBuilder;
pub use connector::PackageFileConnector;

use crate::paths::resolve_host_path;
use crate::{DESCRIPTOR_FILE_NAME, Node, PackageLimits, Resource, ResourceType, VfsError};

/// An opened and validated resource package.
#[derive(Debug, Clone)]
pub struct Package {
    path: PathBuf,
    root: Node,
    members: Vec<MemberInfo>,
}

impl Package {
    /// Open the package at `path`, reading its `.vfs` descriptor.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if the package does not exist
    /// - Any [`SecureArchive`] validation error
    /// - [`VfsError::InvalidData`] if the descriptor is missing or not a directory
    /// - [`VfsError::ThreatDetected`] if the descriptor holds local file resources
    /// - [`VfsError::Deserialization`] if the descriptor does not parse
    pub fn open(path: &Path, limits: &PackageLimits) -> Result<Self, VfsError> {
        Self::open_with_descriptor(path, DESCRIPTOR_FILE_NAME, limits)
    }

    /// Open the package at `path`, reading the descriptor member `descriptor`.
    pub fn open_with_descriptor(
        path: &Path,
        descriptor: &str,
        limits: &PackageLimits,
    ) -> Result<Self, VfsError> {
        let path = resolve_host_path(path)?;
        let archive = SecureArchive::open(&path, limits.clone())?;

        let bytes = match archive.read_member(descriptor) {
            Ok(bytes) => bytes,
            Err(VfsError::NotFound { .. }) => {
                return Err(VfsError::InvalidData {
                    path,
                    details: format!("package has no {descriptor} descriptor"),
                });
            }
            Err(err) => return Err(err),
        };
        let value: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| VfsError::Deserialization(format!("{}: {e}", path.display())))?;

        let mut root = Node::from_value(&value)?;
        if !root.is_dir() {
            return Err(VfsError::InvalidData {
                path,
                details: "package descriptor root is not a directory".into(),
            });
        }
        let foreign = root.find_file_key(&|resource: &Resource| {
            resource.resource_type() != ResourceType::PackageFile
        });
        if let Some(key) = foreign {
            error!(package = %path.display(), key, "package descriptor points outside the package");
            return Err(VfsError::ThreatDetected {
                path: PathBuf::from(key),
                reason: format!("non-package resource in {}", path.display()),
            });
        }
        root.bind_package(&path);

        info!(
            package = %path.display(),
            members = archive.members().len(),
            files = root.get_all_files(true, None).len(),
            "package opened"
        );
        Ok(Self {
            path,
            root,
            members: archive.into_members(),
        })
    }

    /// Host path of the package.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Node tree of the package, with descriptors bound to [`path`](Self::path).
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Member headers of the archive.
    pub fn members(&self) -> &[MemberInfo] {
        &self.members
    }
}
