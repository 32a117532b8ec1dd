//! The virtual file system façade.

use std::path::Path;

use tracing::{debug, error, info};

use crate::paths::resolve_host_path;
use crate::{
    Node, Package, ResourceContent, ResourceVersion, VfsApi, VfsConfig, VfsError,
};

/// A virtual file system over local directories and resource packages.
///
/// Sources are mounted with [`register_source`](VfsApi::register_source)
/// and merged into a single tree. Same-named directories merge, and
/// same-named files collect the resources of every source, so the newest
/// version wins. Local directories are mounted at
/// [`ResourceVersion::LATEST`] and therefore shadow packaged files.
///
/// # Example
///
/// ```rust,no_run
/// use murasame_vfs::{Vfs, VfsApi};
/// use std::path::Path;
///
/// let mut vfs = Vfs::new();
/// vfs.register_source(Path::new("~/.myapp/resources/base.pkg"))?;
/// vfs.register_source(Path::new("~/.myapp/overrides"))?;
///
/// let config = vfs.get_content("config/app.json", None)?;
/// # Ok::<(), murasame_vfs::VfsError>(())
/// ```
#[derive(Debug, Default)]
pub struct Vfs {
    root: Node,
    packages: Vec<Package>,
    config: VfsConfig,
}

impl Vfs {
    /// An empty VFS with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty VFS with the given configuration.
    pub fn with_config(config: VfsConfig) -> Self {
        Self {
            root: Node::root(),
            packages: Vec::new(),
            config,
        }
    }

    /// The root directory.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Packages registered so far, in registration order.
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// The configuration.
    pub fn config(&self) -> &VfsConfig {
        &self.config
    }

    fn register_directory(&mut self, path: &Path) -> Result<(), VfsError> {
        let descriptor = path.join(&self.config.descriptor_file);
        if descriptor.is_file() {
            let data = std::fs::read(&descriptor)
                .map_err(|e| VfsError::io("read", &descriptor, e))?;
            let value: serde_json::Value = serde_json::from_slice(&data).map_err(|e| {
                VfsError::Deserialization(format!("{}: {e}", descriptor.display()))
            })?;
            let mut tree = Node::from_value(&value)?;
            if !tree.is_dir() {
                return Err(VfsError::InvalidData {
                    path: descriptor,
                    details: "descriptor root is not a directory".into(),
                });
            }
            tree.anchor_local_paths(path);
            self.root.merge_with(tree)?;
            info!(source = %path.display(), "directory registered from descriptor");
        } else {
            let mut tree = Node::root();
            tree.populate_from_directory(path)?;
            self.root.merge_with(tree)?;
            info!(source = %path.display(), "directory registered");
        }
        Ok(())
    }

    fn register_package(&mut self, path: &Path) -> Result<(), VfsError> {
        if self.packages.iter().any(|package| package.path() == path) {
            return Err(VfsError::AlreadyExists {
                path: path.to_path_buf(),
                operation: "register_source",
            });
        }
        let package = Package::open_with_descriptor(
            path,
            &self.config.descriptor_file,
            &self.config.limits,
        )?;
        self.root.merge_with(package.root().clone())?;
        info!(source = %path.display(), "package registered");
        self.packages.push(package);
        Ok(())
    }
}

impl VfsApi for Vfs {
    fn add_node(&mut self, node: Node, parent: Option<&str>) -> Result<(), VfsError> {
        let Some(key) = parent else {
            return self.root.add_node(node);
        };
        let parent = self
            .root
            .get_node_mut(key)
            .ok_or_else(|| VfsError::NodeNotFound {
                key: key.to_string(),
            })?;
        if !parent.is_dir() {
            return Err(VfsError::NotADirectory {
                key: key.to_string(),
            });
        }
        parent.add_node(node)
    }

    fn remove_node(&mut self, key: &str) -> Option<Node> {
        self.root.remove_node(key)
    }

    fn has_node(&self, key: &str) -> bool {
        self.root.has_node(key)
    }

    fn get_node(&self, key: &str) -> Option<&Node> {
        self.root.get_node(key)
    }

    fn get_content(
        &self,
        key: &str,
        version: Option<ResourceVersion>,
    ) -> Result<&ResourceContent, VfsError> {
        let node = self.root.get_node(key).ok_or_else(|| VfsError::NodeNotFound {
            key: key.to_string(),
        })?;
        if !node.is_file() {
            return Err(VfsError::NotAFile {
                key: key.to_string(),
            });
        }
        let resource = node
            .get_resource(version)
            .ok_or_else(|| VfsError::VersionNotFound {
                key: key.to_string(),
                version: version.unwrap_or(ResourceVersion::LATEST),
            })?;
        debug!(key, version = %resource.version(), "loading content");
        resource.content_with_limits(&self.config.limits)
    }

    fn register_source(&mut self, path: &Path) -> Result<(), VfsError> {
        let path = resolve_host_path(path)?;
        let metadata =
            std::fs::metadata(&path).map_err(|e| VfsError::io("register_source", &path, e))?;

        if metadata.is_dir() {
            self.register_directory(&path)
        } else if metadata.is_file() {
            self.register_package(&path)
        } else {
            error!(source = %path.display(), "source is neither a directory nor a file");
            Err(VfsError::InvalidInput(format!(
                "cannot register {} as a VFS source",
                path.display()
            )))
        }
    }

    fn get_all_files(&self, key: &str, recursive: bool, filter: Option<&str>) -> Vec<&Node> {
        match self.root.get_node(key) {
            Some(node) if node.is_dir() => node.get_all_files(recursive, filter),
            Some(_) => {
                error!(key, "cannot list files of a file node");
                Vec::new()
            }
            None => {
                error!(key, "cannot list files of a missing node");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LocalFile, NodeType, Resource};

    fn file_with_content(name: &str, path: &Path) -> Node {
        let mut node = Node::new(name, NodeType::File).unwrap();
        node.add_resource(Resource::new(ResourceVersion::FIRST, LocalFile::new(path)))
            .unwrap();
        node
    }

    #[test]
    fn new_vfs_has_empty_root() {
        let vfs = Vfs::new();
        assert!(vfs.root().is_root());
        assert!(vfs.root().files().is_empty());
        assert!(vfs.packages().is_empty());
        assert_eq!(vfs.config(), &VfsConfig::default());
    }

    #[test]
    fn add_node_under_parent() {
        let mut vfs = Vfs::new();
        vfs.add_node(Node::new("sub", NodeType::Directory).unwrap(), None)
            .unwrap();
        vfs.add_node(Node::new("a.txt", NodeType::File).unwrap(), Some("sub"))
            .unwrap();
        assert!(vfs.has_node("sub/a.txt"));

        assert!(matches!(
            vfs.add_node(Node::new("b.txt", NodeType::File).unwrap(), Some("missing")),
            Err(VfsError::NodeNotFound { .. })
        ));
        assert!(matches!(
            vfs.add_node(Node::new("c.txt", NodeType::File).unwrap(), Some("sub/a.txt")),
            Err(VfsError::NotADirectory { .. })
        ));
    }

    #[test]
    fn remove_node_by_key() {
        let mut vfs = Vfs::new();
        vfs.add_node(Node::new("a.txt", NodeType::File).unwrap(), None)
            .unwrap();
        assert!(vfs.remove_node("a.txt").is_some());
        assert!(!vfs.has_node("a.txt"));
        assert!(vfs.remove_node("a.txt").is_none());
    }

    #[test]
    fn get_content_errors() {
        let mut vfs = Vfs::new();
        vfs.add_node(Node::new("dir", NodeType::Directory).unwrap(), None)
            .unwrap();
        vfs.add_node(Node::new("empty.txt", NodeType::File).unwrap(), None)
            .unwrap();

        assert!(matches!(
            vfs.get_content("missing.txt", None),
            Err(VfsError::NodeNotFound { .. })
        ));
        assert!(matches!(
            vfs.get_content("dir", None),
            Err(VfsError::NotAFile { .. })
        ));
        assert!(matches!(
            vfs.get_content("empty.txt", None),
            Err(VfsError::VersionNotFound { .. })
        ));
    }

    #[test]
    fn get_content_loads_and_caches() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.txt");
        std::fs::write(&path, "test").unwrap();

        let mut vfs = Vfs::new();
        vfs.add_node(file_with_content("a.txt", &path), None).unwrap();

        assert_eq!(vfs.get_content("a.txt", None).unwrap().as_text(), Some("test"));
        std::fs::remove_file(&path).unwrap();
        assert_eq!(
            vfs.get_content("/a.txt", Some(ResourceVersion::FIRST))
                .unwrap()
                .as_text(),
            Some("test")
        );
        assert!(matches!(
            vfs.get_content("a.txt", Some(ResourceVersion::new(2).unwrap())),
            Err(VfsError::VersionNotFound { .. })
        ));
    }

    #[test]
    fn get_all_files_on_missing_or_file_is_empty() {
        let mut vfs = Vfs::new();
        vfs.add_node(Node::new("a.txt", NodeType::File).unwrap(), None)
            .unwrap();
        assert!(vfs.get_all_files("missing", true, None).is_empty());
        assert!(vfs.get_all_files("a.txt", true, None).is_empty());
        assert_eq!(vfs.get_all_files("", false, None).len(), 1);
    }

    #[test]
    fn register_missing_source_fails() {
        let mut vfs = Vfs::new();
        assert!(matches!(
            vfs.register_source(Path::new("/nonexistent/vfs/source")),
            Err(VfsError::NotFound { .. })
        ));
    }

    #[test]
    fn vfs_is_send_sync() {
        fn _assert_send_sync<T: Send + Sync>() {}
        _assert_send_sync::<Vfs>();
    }
}
