//! Connector for resources stored in the local file system.

use tracing::debug;

use crate::content::decode;
use crate::paths::resolve_host_path;
use crate::{ResourceConnector, ResourceContent, ResourceDescriptor, VfsError};

/// Loads [`LocalFile`](crate::LocalFile) resources from disk.
///
/// `~` is expanded and relative paths are resolved against the current
/// directory before the file is read.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileConnector;

impl ResourceConnector for LocalFileConnector {
    fn load(&self, descriptor: &ResourceDescriptor) -> Result<ResourceContent, VfsError> {
        let ResourceDescriptor::LocalFile(file) = descriptor else {
            return Err(VfsError::UnsupportedDescriptor {
                connector: "LocalFileConnector",
                found: descriptor.resource_type(),
            });
        };

        let path = resolve_host_path(&file.path)?;
        let metadata = std::fs::metadata(&path).map_err(|e| VfsError::io("metadata", &path, e))?;
        if metadata.is_dir() {
            return Err(VfsError::NotAFile {
                key: path.display().to_string(),
            });
        }

        let bytes = std::fs::read(&path).map_err(|e| VfsError::io("read", &path, e))?;
        debug!(path = %path.display(), size = bytes.len(), "local file read");
        decode(&path, bytes, file.content_type.as_deref())
    }
}
