//! # VFS Nodes
//!
//! The hierarchical namespace of the virtual file system.
//!
//! ## Responsibility
//! - Keep directory children and file resources
//! - Resolve `/`-separated keys
//! - Merge trees coming from different sources
//! - Convert to and from the `.vfs` descriptor format
//!
//! ## Descriptor Format
//!
//! ```json
//! {
//!   "name": "ROOT",
//!   "type": "directory",
//!   "subdirectories": {
//!     "config": {"name": "config", "type": "directory", "subdirectories": {}, "files": {}}
//!   },
//!   "files": {
//!     "app.json": {
//!       "name": "app.json",
//!       "type": "file",
//!       "resource": [
//!         {"version": 1, "descriptor": {"type": "localfile", "path": "/srv/app.json"}}
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! Any `type` other than `"directory"` is read as a file, so package
//! descriptors using `"packagefile"` parse as well.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, warn};

use crate::paths::key_segments;
use crate::{LocalFile, NodeType, ROOT_NODE_NAME, Resource, ResourceVersion, VfsError};

/// A directory or file in the VFS tree.
///
/// Directories hold child nodes, files hold resources sorted by version,
/// newest first.
///
/// # Example
///
/// ```rust
/// use murasame_vfs::{Node, NodeType};
///
/// let mut root = Node::root();
/// let mut config = Node::new("config", NodeType::Directory).unwrap();
/// config.add_node(Node::new("app.json", NodeType::File).unwrap()).unwrap();
/// root.add_node(config).unwrap();
///
/// assert!(root.has_node("config/app.json"));
/// assert!(root.has_node("/config"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: String,
    node_type: NodeType,
    subdirectories: BTreeMap<String, Node>,
    files: BTreeMap<String, Node>,
    resources: Vec<Resource>,
}

impl Node {
    /// Create a node.
    ///
    /// An empty name yields the root name (`ROOT`), and the root is always a
    /// directory.
    ///
    /// # Errors
    ///
    /// - [`VfsError::InvalidInput`] if a root file is requested or the name contains `/`
    pub fn new(name: impl Into<String>, node_type: NodeType) -> Result<Self, VfsError> {
        let mut name = name.into();
        if name.is_empty() {
            if node_type != NodeType::Directory {
                return Err(VfsError::InvalidInput(
                    "the root node can only be a directory".into(),
                ));
            }
            name = ROOT_NODE_NAME.to_string();
        }
        if name.contains('/') {
            return Err(VfsError::InvalidInput(format!(
                "node name may not contain '/': {name}"
            )));
        }
        Ok(Self {
            name,
            node_type,
            subdirectories: BTreeMap::new(),
            files: BTreeMap::new(),
            resources: Vec::new(),
        })
    }

    /// An empty root directory.
    pub fn root() -> Self {
        Self {
            name: ROOT_NODE_NAME.to_string(),
            node_type: NodeType::Directory,
            subdirectories: BTreeMap::new(),
            files: BTreeMap::new(),
            resources: Vec::new(),
        }
    }

    /// Name of the node.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type of the node.
    #[inline]
    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Returns `true` for directory nodes.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.node_type == NodeType::Directory
    }

    /// Returns `true` for file nodes.
    #[inline]
    pub fn is_file(&self) -> bool {
        self.node_type == NodeType::File
    }

    /// Returns `true` for the root directory.
    pub fn is_root(&self) -> bool {
        self.is_dir() && self.name == ROOT_NODE_NAME
    }

    /// Child directories by name.
    pub fn subdirectories(&self) -> &BTreeMap<String, Node> {
        &self.subdirectories
    }

    /// Child files by name.
    pub fn files(&self) -> &BTreeMap<String, Node> {
        &self.files
    }

    /// Resources, newest first.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Number of resources.
    pub fn num_resources(&self) -> usize {
        self.resources.len()
    }

    /// The newest resource, if any.
    pub fn latest(&self) -> Option<&Resource> {
        self.resources.first()
    }

    // ------------------------------------------------------------------------
    // Key resolution
    // ------------------------------------------------------------------------

    fn child(&self, name: &str) -> Option<&Node> {
        self.subdirectories
            .get(name)
            .or_else(|| self.files.get(name))
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        if self.subdirectories.contains_key(name) {
            self.subdirectories.get_mut(name)
        } else {
            self.files.get_mut(name)
        }
    }

    /// Returns `true` if a node exists at `key`, relative to this node.
    pub fn has_node(&self, key: &str) -> bool {
        self.get_node(key).is_some()
    }

    /// The node at `key`, relative to this node. An empty key is this node.
    pub fn get_node(&self, key: &str) -> Option<&Node> {
        key_segments(key).try_fold(self, |node, segment| node.child(segment))
    }

    /// Mutable access to the node at `key`.
    pub fn get_node_mut(&mut self, key: &str) -> Option<&mut Node> {
        key_segments(key).try_fold(self, |node, segment| node.child_mut(segment))
    }

    // ------------------------------------------------------------------------
    // Tree mutation
    // ------------------------------------------------------------------------

    /// Add a child node, merging it into a same-named child if one exists.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotADirectory`] if this node is a file
    /// - [`VfsError::TypeMismatch`] if a same-named child has the other type
    pub fn add_node(&mut self, node: Node) -> Result<(), VfsError> {
        if !self.is_dir() {
            return Err(VfsError::NotADirectory {
                key: self.name.clone(),
            });
        }

        let (target, other) = match node.node_type {
            NodeType::Directory => (&mut self.subdirectories, &self.files),
            NodeType::File => (&mut self.files, &self.subdirectories),
        };

        if let Some(existing) = other.get(&node.name) {
            return Err(VfsError::TypeMismatch {
                name: node.name,
                expected: existing.node_type,
                found: node.node_type,
            });
        }

        match target.get_mut(&node.name) {
            Some(existing) => existing.merge_with(node),
            None => {
                target.insert(node.name.clone(), node);
                Ok(())
            }
        }
    }

    /// Merge `other` into this node.
    ///
    /// Files take over all resources of `other` (duplicate versions are
    /// ignored); directories take over all children, recursively.
    ///
    /// # Errors
    ///
    /// - [`VfsError::TypeMismatch`] if the node types differ, here or below.
    ///   Nothing is merged in that case.
    pub fn merge_with(&mut self, other: Node) -> Result<(), VfsError> {
        self.check_merge(&other)?;

        match self.node_type {
            NodeType::File => {
                for resource in other.resources {
                    self.add_resource(resource)?;
                }
            }
            NodeType::Directory => {
                for child in other.subdirectories.into_values().chain(other.files.into_values()) {
                    self.add_node(child)?;
                }
            }
        }
        Ok(())
    }

    /// Walk both trees and fail on the first same-named pair of different types.
    fn check_merge(&self, other: &Node) -> Result<(), VfsError> {
        if self.node_type != other.node_type {
            return Err(VfsError::TypeMismatch {
                name: other.name.clone(),
                expected: self.node_type,
                found: other.node_type,
            });
        }
        for child in other.subdirectories.values().chain(other.files.values()) {
            if let Some(existing) = self.child(&child.name) {
                existing.check_merge(child)?;
            }
        }
        Ok(())
    }

    /// Remove and return the node at `key`, relative to this node.
    pub fn remove_node(&mut self, key: &str) -> Option<Node> {
        let mut segments: Vec<&str> = key_segments(key).collect();
        let name = segments.pop()?;
        let parent = segments
            .into_iter()
            .try_fold(self, |node, segment| node.child_mut(segment))?;
        parent
            .subdirectories
            .remove(name)
            .or_else(|| parent.files.remove(name))
    }

    /// Remove and return the child directory `name`.
    pub fn remove_subdirectory(&mut self, name: &str) -> Option<Node> {
        self.subdirectories.remove(name)
    }

    /// Remove and return the child file `name`.
    pub fn remove_file(&mut self, name: &str) -> Option<Node> {
        self.files.remove(name)
    }

    /// Remove all child directories.
    pub fn remove_all_subdirectories(&mut self) {
        self.subdirectories.clear();
    }

    /// Remove all child files.
    pub fn remove_all_files(&mut self) {
        self.files.clear();
    }

    /// Remove all resources.
    pub fn remove_all_resources(&mut self) {
        self.resources.clear();
    }

    /// Remove all children and resources, keeping name and type.
    pub fn reset(&mut self) {
        self.remove_all_subdirectories();
        self.remove_all_files();
        self.remove_all_resources();
    }

    // ------------------------------------------------------------------------
    // Resources
    // ------------------------------------------------------------------------

    fn resource_index(&self, version: ResourceVersion) -> Result<usize, usize> {
        // Sorted newest first.
        self.resources
            .binary_search_by(|resource| version.cmp(&resource.version()))
    }

    /// The resource with `version`, or the newest one when `version` is `None`.
    ///
    /// Directories have no resources and always return `None`.
    pub fn get_resource(&self, version: Option<ResourceVersion>) -> Option<&Resource> {
        match version {
            None => self.latest(),
            Some(version) => self
                .resource_index(version)
                .ok()
                .map(|index| &self.resources[index]),
        }
    }

    /// Returns `true` if a resource with `version` exists.
    pub fn has_resource(&self, version: ResourceVersion) -> bool {
        self.get_resource(Some(version)).is_some()
    }

    /// Add a resource, keeping newest-first order.
    ///
    /// Returns `Ok(false)` without changing anything if a resource with the
    /// same version already exists.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotAFile`] if this node is a directory
    pub fn add_resource(&mut self, resource: Resource) -> Result<bool, VfsError> {
        if !self.is_file() {
            return Err(VfsError::NotAFile {
                key: self.name.clone(),
            });
        }
        match self.resource_index(resource.version()) {
            Ok(_) => {
                warn!(
                    node = %self.name,
                    version = %resource.version(),
                    "resource version already present, ignoring"
                );
                Ok(false)
            }
            Err(index) => {
                self.resources.insert(index, resource);
                Ok(true)
            }
        }
    }

    /// Remove and return the resource with `version`.
    pub fn remove_resource(&mut self, version: ResourceVersion) -> Option<Resource> {
        let index = self.resource_index(version).ok()?;
        Some(self.resources.remove(index))
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Child files whose name contains `filter`.
    ///
    /// With `recursive` the files of all subdirectories are included, with
    /// the same filter applied at every depth.
    pub fn get_all_files(&self, recursive: bool, filter: Option<&str>) -> Vec<&Node> {
        let mut result = Vec::new();
        self.collect_files(recursive, filter, &mut result);
        result
    }

    fn collect_files<'a>(&'a self, recursive: bool, filter: Option<&str>, out: &mut Vec<&'a Node>) {
        out.extend(
            self.files
                .values()
                .filter(|file| filter.is_none_or(|f| file.name.contains(f))),
        );
        if recursive {
            for directory in self.subdirectories.values() {
                directory.collect_files(true, filter, out);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Sources
    // ------------------------------------------------------------------------

    /// Mirror a host directory below this node.
    ///
    /// Subdirectories become directory nodes and files become file nodes
    /// with one local file resource at [`ResourceVersion::LATEST`]. Entries
    /// whose names are not valid UTF-8 and special files are skipped.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotADirectory`] if this node is a file
    /// - [`VfsError::NotFound`] or [`VfsError::Io`] if the directory cannot be read
    pub fn populate_from_directory(&mut self, path: &Path) -> Result<(), VfsError> {
        if !self.is_dir() {
            return Err(VfsError::NotADirectory {
                key: self.name.clone(),
            });
        }

        let mut entries = std::fs::read_dir(path)
            .map_err(|e| VfsError::io("read_dir", path, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| VfsError::io("read_dir", path, e))?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let entry_path = entry.path();
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                warn!(path = %entry_path.display(), "skipping entry with non UTF-8 name");
                continue;
            };
            let metadata = std::fs::metadata(&entry_path)
                .map_err(|e| VfsError::io("metadata", &entry_path, e))?;

            if metadata.is_dir() {
                let mut directory = Node::new(name, NodeType::Directory)?;
                directory.populate_from_directory(&entry_path)?;
                self.add_node(directory)?;
            } else if metadata.is_file() {
                let mut file = Node::new(name, NodeType::File)?;
                file.add_resource(Resource::new(
                    ResourceVersion::LATEST,
                    LocalFile::new(&entry_path),
                ))?;
                self.add_node(file)?;
            } else {
                debug!(path = %entry_path.display(), "skipping special file");
            }
        }
        Ok(())
    }

    /// Key, relative to this node, of the first file with a resource matching
    /// `predicate`.
    pub(crate) fn find_file_key(&self, predicate: &dyn Fn(&Resource) -> bool) -> Option<String> {
        if self.resources.iter().any(predicate) {
            return Some(self.name.clone());
        }
        self.subdirectories
            .values()
            .chain(self.files.values())
            .find_map(|child| {
                let key = child.find_file_key(predicate)?;
                Some(if self.is_root() {
                    key
                } else {
                    format!("{}/{key}", self.name)
                })
            })
    }

    /// Bind every package file descriptor below this node to `package_path`.
    pub(crate) fn bind_package(&mut self, package_path: &Path) {
        self.for_each_resource_mut(&mut |resource: &mut Resource| {
            resource.descriptor_mut().bind_package(package_path)
        });
    }

    /// Resolve relative local file paths below this node against `base`.
    pub(crate) fn anchor_local_paths(&mut self, base: &Path) {
        self.for_each_resource_mut(&mut |resource: &mut Resource| {
            resource.descriptor_mut().anchor_local_path(base)
        });
    }

    fn for_each_resource_mut(&mut self, f: &mut dyn FnMut(&mut Resource)) {
        self.resources.iter_mut().for_each(&mut *f);
        for child in self.subdirectories.values_mut().chain(self.files.values_mut()) {
            child.for_each_resource_mut(f);
        }
    }

    // ------------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------------

    /// Serialize into the `.vfs` descriptor format.
    ///
    /// # Errors
    ///
    /// - [`VfsError::Serialization`] if a descriptor cannot be serialized
    pub fn to_value(&self) -> Result<serde_json::Value, VfsError> {
        serde_json::to_value(self).map_err(|e| VfsError::Serialization(e.to_string()))
    }

    /// Parse a node tree from the `.vfs` descriptor format.
    ///
    /// # Errors
    ///
    /// - [`VfsError::Deserialization`] if a name or type is missing, or a
    ///   child or resource is invalid
    pub fn from_value(value: &serde_json::Value) -> Result<Self, VfsError> {
        Node::deserialize(value).map_err(|e| VfsError::Deserialization(e.to_string()))
    }
}

impl Default for Node {
    fn default() -> Self {
        Node::root()
    }
}

#[derive(Serialize)]
struct NodeRecordRef<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    node_type: NodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    subdirectories: Option<&'a BTreeMap<String, Node>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    files: Option<&'a BTreeMap<String, Node>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource: Option<&'a [Resource]>,
}

#[derive(Deserialize)]
struct NodeRecord {
    name: String,
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default)]
    subdirectories: BTreeMap<String, Node>,
    #[serde(default)]
    files: BTreeMap<String, Node>,
    #[serde(default)]
    resource: Vec<Resource>,
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let record = match self.node_type {
            NodeType::Directory => NodeRecordRef {
                name: &self.name,
                node_type: self.node_type,
                subdirectories: Some(&self.subdirectories),
                files: Some(&self.files),
                resource: None,
            },
            NodeType::File => NodeRecordRef {
                name: &self.name,
                node_type: self.node_type,
                subdirectories: None,
                files: None,
                resource: Some(&self.resources),
            },
        };
        record.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let record = NodeRecord::deserialize(deserializer)?;
        let node_type = if record.node_type == "directory" {
            NodeType::Directory
        } else {
            NodeType::File
        };

        let mut node = Node::new(record.name, node_type).map_err(D::Error::custom)?;
        match node_type {
            NodeType::Directory => {
                for child in record
                    .subdirectories
                    .into_values()
                    .chain(record.files.into_values())
                {
                    node.add_node(child).map_err(D::Error::custom)?;
                }
            }
            NodeType::File => {
                for resource in record.resource {
                    node.add_resource(resource).map_err(D::Error::custom)?;
                }
            }
        }
        Ok(node)
    }
}
