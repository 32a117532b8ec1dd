//! Versioned resources and their content cache.

use std::sync::OnceLock;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::{
    PackageLimits, ResourceConnector, ResourceContent, ResourceDescriptor, ResourceType,
    ResourceVersion, VfsError,
};

/// One version of a file's content.
///
/// A resource pairs a [`ResourceVersion`] with the [`ResourceDescriptor`]
/// telling where its bytes live. Content is loaded on first access and
/// cached; the cache is safe to fill from several threads at once.
///
/// # Example
///
/// ```rust
/// use murasame_vfs::{LocalFile, Resource, ResourceVersion};
///
/// let resource = Resource::new(ResourceVersion::FIRST, LocalFile::new("/etc/hostname"));
/// assert!(!resource.is_loaded());
/// ```
#[derive(Debug, Clone)]
pub struct Resource {
    version: ResourceVersion,
    descriptor: ResourceDescriptor,
    content: OnceLock<ResourceContent>,
}

impl Resource {
    /// Create a resource that has not been loaded yet.
    pub fn new(version: ResourceVersion, descriptor: impl Into<ResourceDescriptor>) -> Self {
        Self {
            version,
            descriptor: descriptor.into(),
            content: OnceLock::new(),
        }
    }

    /// Version of the resource.
    #[inline]
    pub fn version(&self) -> ResourceVersion {
        self.version
    }

    /// Where the resource's bytes live.
    #[inline]
    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    /// Storage type of the resource.
    #[inline]
    pub fn resource_type(&self) -> ResourceType {
        self.descriptor.resource_type()
    }

    /// Returns `true` once content has been loaded and cached.
    pub fn is_loaded(&self) -> bool {
        self.content.get().is_some()
    }

    /// Content of the resource, loaded through the descriptor's default
    /// connector with default package limits.
    ///
    /// # Errors
    ///
    /// Any error of the connector. Failed loads are not cached.
    pub fn content(&self) -> Result<&ResourceContent, VfsError> {
        self.content_with_limits(&PackageLimits::default())
    }

    /// Content of the resource, loaded through the descriptor's default
    /// connector bounded by `limits`.
    pub fn content_with_limits(&self, limits: &PackageLimits) -> Result<&ResourceContent, VfsError> {
        if let Some(content) = self.content.get() {
            return Ok(content);
        }
        let connector = self.descriptor.create_connector(limits);
        self.content_with(connector.as_ref())
    }

    /// Content of the resource, loaded through `connector` unless already cached.
    pub fn content_with(
        &self,
        connector: &dyn ResourceConnector,
    ) -> Result<&ResourceContent, VfsError> {
        if let Some(content) = self.content.get() {
            return Ok(content);
        }
        let loaded = connector.load(&self.descriptor)?;
        debug!(version = %self.version, descriptor = ?self.descriptor, "resource loaded");
        // A concurrent load may have won; keep whichever landed first.
        Ok(self.content.get_or_init(|| loaded))
    }

    /// Mutable access to the descriptor. Drops cached content.
    pub(crate) fn descriptor_mut(&mut self) -> &mut ResourceDescriptor {
        self.content = OnceLock::new();
        &mut self.descriptor
    }

    /// Serialize into the `{"version", "descriptor"}` shape.
    ///
    /// # Errors
    ///
    /// - [`VfsError::Serialization`] if the descriptor cannot be serialized
    pub fn to_value(&self) -> Result<serde_json::Value, VfsError> {
        serde_json::to_value(self).map_err(|e| VfsError::Serialization(e.to_string()))
    }

    /// Parse a resource from the `{"version", "descriptor"}` shape.
    ///
    /// # Errors
    ///
    /// - [`VfsError::Deserialization`] if a field is missing or invalid
    pub fn from_value(value: &serde_json::Value) -> Result<Self, VfsError> {
        Resource::deserialize(value).map_err(|e| VfsError::Deserialization(e.to_string()))
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version && self.descriptor == other.descriptor
    }
}

#[derive(Serialize)]
struct ResourceRecordRef<'a> {
    version: ResourceVersion,
    descriptor: &'a ResourceDescriptor,
}

#[derive(Deserialize)]
struct ResourceRecord {
    version: ResourceVersion,
    descriptor: ResourceDescriptor,
}

impl Serialize for Resource {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        ResourceRecordRef {
            version: self.version,
            descriptor: &self.descriptor,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Resource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let record = ResourceRecord::deserialize(deserializer)?;
        Ok(Resource::new(record.version, record.descriptor))
    }
}
