//! The public interface of a virtual file system.

use std::path::Path;

use crate::{Node, ResourceContent, ResourceVersion, VfsError};

/// Operations every virtual file system offers.
///
/// Keys are `/`-separated node paths relative to the root; a leading `/` is
/// ignored, so `"config/app.json"` and `"/config/app.json"` are the same key.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. Lookups take `&self`, mutations
/// take `&mut self`; share a mutable VFS behind `Arc<RwLock<_>>`.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn VfsApi`.
pub trait VfsApi: Send + Sync {
    /// Add `node` under the node at `parent`, or under the root when `parent`
    /// is `None`. A same-named child is merged with the new node.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NodeNotFound`] if `parent` does not exist
    /// - [`VfsError::NotADirectory`] if `parent` is a file
    /// - [`VfsError::TypeMismatch`] if a same-named child has the other type
    fn add_node(&mut self, node: Node, parent: Option<&str>) -> Result<(), VfsError>;

    /// Remove and return the node at `key`.
    fn remove_node(&mut self, key: &str) -> Option<Node>;

    /// Returns `true` if a node exists at `key`.
    fn has_node(&self, key: &str) -> bool;

    /// The node at `key`, if any.
    fn get_node(&self, key: &str) -> Option<&Node>;

    /// Content of the file at `key`.
    ///
    /// With `version` set to `None` the newest resource is returned.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NodeNotFound`] if no node exists at `key`
    /// - [`VfsError::NotAFile`] if the node is a directory
    /// - [`VfsError::VersionNotFound`] if no resource matches `version`
    /// - Any error of the resource's connector
    fn get_content(
        &self,
        key: &str,
        version: Option<ResourceVersion>,
    ) -> Result<&ResourceContent, VfsError>;

    /// Mount a local directory or a resource package into the tree.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if `path` does not exist
    /// - [`VfsError::InvalidInput`] if `path` is neither a directory nor a regular file
    /// - [`VfsError::AlreadyExists`] if the package was registered before
    /// - Any package validation or descriptor parsing error
    fn register_source(&mut self, path: &Path) -> Result<(), VfsError>;

    /// File nodes below the directory at `key` whose name contains `filter`.
    ///
    /// Returns an empty list if `key` does not name a directory.
    fn get_all_files(&self, key: &str, recursive: bool, filter: Option<&str>) -> Vec<&Node>;
}
