//! Writing resource packages.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::info;

use super::archive::{VIRTUAL_ROOT, check_member};
use crate::paths::key_segments;
use crate::{
    DESCRIPTOR_FILE_NAME, MemberInfo, MemberKind, Node, NodeType, PackageFile, PackageLimits,
    Resource, ResourceVersion, VfsError,
};

/// Collects files and writes them as a resource package.
///
/// The package is a tar archive holding every file plus a `.vfs` descriptor
/// that maps keys to members. The first version of a key is stored under
/// the key itself; later versions go below `.versions/<version>/`.
///
/// Files are checked against the builder's [`PackageLimits`] as they are
/// added, so every written package opens under the same limits.
///
/// # Example
///
/// ```rust,no_run
/// use murasame_vfs::{PackageBuilder, ResourceVersion};
/// use std::path::Path;
///
/// let mut builder = PackageBuilder::new().compressed(true);
/// builder.add_file("config/app.json", ResourceVersion::FIRST, None, br#"{"debug": false}"#.to_vec())?;
/// builder.write(Path::new("base.pkg"))?;
/// # Ok::<(), murasame_vfs::VfsError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PackageBuilder {
    root: Node,
    members: BTreeMap<String, Vec<u8>>,
    compressed: bool,
    limits: PackageLimits,
}

impl Default for PackageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageBuilder {
    /// An empty, uncompressed package.
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            members: BTreeMap::new(),
            compressed: false,
            limits: PackageLimits::default(),
        }
    }

    /// Gzip-compress the written package.
    pub fn compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    /// Check added files against `limits` instead of the defaults.
    pub fn with_limits(mut self, limits: PackageLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Node tree that will be written as the package descriptor.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Add `data` as `version` of the file at `key`.
    ///
    /// # Errors
    ///
    /// - [`VfsError::InvalidInput`] if `key` is empty
    /// - [`VfsError::AlreadyExists`] if this version of `key` was added before
    /// - [`VfsError::TypeMismatch`] if `key` collides with a directory
    /// - [`VfsError::ThreatDetected`] or [`VfsError::FileSizeExceeded`] if the
    ///   member would fail the package checks (`..` segments, blocked
    ///   extensions, oversized data)
    pub fn add_file(
        &mut self,
        key: &str,
        version: ResourceVersion,
        content_type: Option<&str>,
        data: Vec<u8>,
    ) -> Result<(), VfsError> {
        let segments: Vec<&str> = key_segments(key).collect();
        let Some((name, parents)) = segments.split_last() else {
            return Err(VfsError::InvalidInput("empty package key".into()));
        };
        let key = segments.join("/");

        if self
            .root
            .get_node(&key)
            .is_some_and(|node| node.has_resource(version))
        {
            return Err(VfsError::AlreadyExists {
                path: key.into(),
                operation: "add_file",
            });
        }

        let member = if version == ResourceVersion::FIRST {
            key.clone()
        } else {
            format!(".versions/{version}/{key}")
        };
        let info = MemberInfo {
            name: member.clone(),
            kind: MemberKind::File,
            size: data.len() as u64,
            link_target: None,
        };
        check_member(&info, Path::new(VIRTUAL_ROOT), &self.limits)?;

        let mut descriptor = PackageFile::new(format!("/{member}"));
        if let Some(content_type) = content_type {
            descriptor = descriptor.with_content_type(content_type);
        }
        let mut node = Node::new(*name, NodeType::File)?;
        node.add_resource(Resource::new(version, descriptor))?;
        for parent in parents.iter().rev() {
            let mut directory = Node::new(*parent, NodeType::Directory)?;
            directory.add_node(node)?;
            node = directory;
        }

        self.root.add_node(node)?;
        self.members.insert(member, data);
        Ok(())
    }

    /// Add every file below the host directory `path` as version 1.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] or [`VfsError::Io`] if the directory cannot be read
    pub fn add_directory(&mut self, path: &Path) -> Result<(), VfsError> {
        self.add_directory_at(path, "")
    }

    fn add_directory_at(&mut self, path: &Path, prefix: &str) -> Result<(), VfsError> {
        let mut entries = std::fs::read_dir(path)
            .map_err(|e| VfsError::io("read_dir", path, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| VfsError::io("read_dir", path, e))?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let entry_path = entry.path();
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            let key = if prefix.is_empty() {
                name
            } else {
                format!("{prefix}/{name}")
            };
            let metadata = std::fs::metadata(&entry_path)
                .map_err(|e| VfsError::io("metadata", &entry_path, e))?;
            if metadata.is_dir() {
                self.add_directory_at(&entry_path, &key)?;
            } else if metadata.is_file() {
                let data = std::fs::read(&entry_path)
                    .map_err(|e| VfsError::io("read", &entry_path, e))?;
                self.add_file(&key, ResourceVersion::FIRST, None, data)?;
            }
        }
        Ok(())
    }

    /// Write the package to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// - [`VfsError::Io`] if the file cannot be written
    /// - [`VfsError::Serialization`] if the descriptor cannot be serialized
    pub fn write(&self, path: &Path) -> Result<(), VfsError> {
        let descriptor = serde_json::to_vec_pretty(&self.root)
            .map_err(|e| VfsError::Serialization(e.to_string()))?;
        let file = File::create(path).map_err(|e| VfsError::io("create", path, e))?;

        if self.compressed {
            let encoder = GzEncoder::new(file, Compression::default());
            let encoder = self
                .write_archive(encoder, &descriptor)
                .map_err(|e| VfsError::io("write package", path, e))?;
            encoder
                .finish()
                .map_err(|e| VfsError::io("write package", path, e))?;
        } else {
            let mut file = self
                .write_archive(file, &descriptor)
                .map_err(|e| VfsError::io("write package", path, e))?;
            file.flush()
                .map_err(|e| VfsError::io("write package", path, e))?;
        }

        info!(
            package = %path.display(),
            members = self.members.len(),
            compressed = self.compressed,
            "package written"
        );
        Ok(())
    }

    fn write_archive<W: Write>(&self, writer: W, descriptor: &[u8]) -> std::io::Result<W> {
        let mut builder = tar::Builder::new(writer);

        let mut directories = BTreeSet::new();
        for member in self.members.keys() {
            let parts: Vec<&str> = member.split('/').collect();
            for depth in 1..parts.len() {
                directories.insert(parts[..depth].join("/"));
            }
        }
        for directory in &directories {
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Directory);
            header.set_mode(0o755);
            header.set_size(0);
            builder.append_data(&mut header, format!("{directory}/"), std::io::empty())?;
        }

        for (member, data) in &self.members {
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Regular);
            header.set_mode(0o644);
            header.set_size(data.len() as u64);
            builder.append_data(&mut header, member, data.as_slice())?;
        }

        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_mode(0o644);
        header.set_size(descriptor.len() as u64);
        builder.append_data(&mut header, DESCRIPTOR_FILE_NAME, descriptor)?;

        builder.into_inner()
    }
}
