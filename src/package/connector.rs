//! Connector for resources stored inside resource packages.

use std::path::Path;

use crate::content::decode;
use crate::{
    PackageLimits, ResourceConnector, ResourceContent, ResourceDescriptor, SecureArchive, VfsError,
};

/// Loads [`PackageFile`](crate::PackageFile) resources out of their package.
///
/// The package is opened and fully validated on every load.
#[derive(Debug, Clone, Default)]
pub struct PackageFileConnector {
    limits: PackageLimits,
}

impl PackageFileConnector {
    /// Create a connector that enforces `limits` on every package it opens.
    pub fn new(limits: PackageLimits) -> Self {
        Self { limits }
    }

    /// The enforced limits.
    pub fn limits(&self) -> &PackageLimits {
        &self.limits
    }
}

impl ResourceConnector for PackageFileConnector {
    fn load(&self, descriptor: &ResourceDescriptor) -> Result<ResourceContent, VfsError> {
        let ResourceDescriptor::PackageFile(file) = descriptor else {
            return Err(VfsError::UnsupportedDescriptor {
                connector: "PackageFileConnector",
                found: descriptor.resource_type(),
            });
        };
        let Some(package_path) = &file.package_path else {
            return Err(VfsError::InvalidInput(format!(
                "package file {} is not bound to a package",
                file.path
            )));
        };

        let archive = SecureArchive::open(package_path, self.limits.clone())?;
        let bytes = archive.read_member(&file.path)?;
        decode(Path::new(&file.path), bytes, file.content_type.as_deref())
    }
}
