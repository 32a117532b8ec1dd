//! Resource connectors: backends that materialize resource content.

use crate::{ResourceContent, ResourceDescriptor, VfsError};

/// Backend able to load the content described by a [`ResourceDescriptor`].
///
/// Each descriptor type has a default connector, returned by
/// [`ResourceDescriptor::create_connector`]. Custom connectors (caching,
/// remote, in-memory) can be passed to
/// [`Resource::content_with`](crate::Resource::content_with).
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. `load` takes `&self` so one
/// connector can serve concurrent loads.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn ResourceConnector`.
///
/// # Example
///
/// ```rust
/// use murasame_vfs::{ResourceConnector, ResourceContent, ResourceDescriptor, VfsError};
///
/// struct Fixed(&'static str);
///
/// impl ResourceConnector for Fixed {
///     fn load(&self, _: &ResourceDescriptor) -> Result<ResourceContent, VfsError> {
///         Ok(ResourceContent::Text(self.0.to_string()))
///     }
/// }
/// ```
pub trait ResourceConnector: Send + Sync {
    /// Load and decode the content of `descriptor`.
    ///
    /// # Errors
    ///
    /// - [`VfsError::UnsupportedDescriptor`] if the connector does not handle this descriptor type
    /// - [`VfsError::NotFound`] if the underlying file or archive member does not exist
    /// - [`VfsError::Deserialization`] or [`VfsError::InvalidData`] if decoding fails
    fn load(&self, descriptor: &ResourceDescriptor) -> Result<ResourceContent, VfsError>;
}
