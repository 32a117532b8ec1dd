//! Error types for the virtual file system.

use std::path::PathBuf;

use crate::{NodeType, ResourceType, ResourceVersion};

/// Virtual file system error type with contextual variants.
///
/// Variants carry the VFS key, host path or archive member that caused the
/// failure. Uses `#[non_exhaustive]` for forward compatibility.
///
/// # Examples
///
/// ```rust
/// use murasame_vfs::VfsError;
///
/// let err = VfsError::NodeNotFound { key: "config/app.json".into() };
/// assert_eq!(err.to_string(), "no such node: config/app.json");
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum VfsError {
    // Tree Errors
    /// No node exists under the given VFS key.
    #[error("no such node: {key}")]
    NodeNotFound {
        /// The VFS key that was looked up.
        key: String,
    },

    /// A host path or archive member does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The node exists but holds no resource with the requested version.
    #[error("no resource with version {version} for {key}")]
    VersionNotFound {
        /// The VFS key of the file node.
        key: String,
        /// The requested version.
        version: ResourceVersion,
    },

    /// Expected a file node but found a directory node.
    #[error("not a file: {key}")]
    NotAFile {
        /// The offending VFS key or node name.
        key: String,
    },

    /// Expected a directory node but found a file node.
    #[error("not a directory: {key}")]
    NotADirectory {
        /// The offending VFS key or node name.
        key: String,
    },

    /// Two nodes of different types were merged.
    #[error("cannot merge {found:?} node {name} into {expected:?} node")]
    TypeMismatch {
        /// Name of the node being merged.
        name: String,
        /// Type of the node merged into.
        expected: NodeType,
        /// Type of the incoming node.
        found: NodeType,
    },

    /// Something was registered twice.
    #[error("{operation}: already exists: {path}")]
    AlreadyExists {
        /// The path that already exists.
        path: PathBuf,
        /// The operation that failed.
        operation: &'static str,
    },

    // Input/Data Errors
    /// Invalid input value.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Invalid data encountered while decoding content.
    #[error("invalid data: {path} ({details})")]
    InvalidData {
        /// The path with invalid data.
        path: PathBuf,
        /// Details about the invalid data.
        details: String,
    },

    /// A connector was asked to load a descriptor it does not handle.
    #[error("{connector} cannot load {found:?} resources")]
    UnsupportedDescriptor {
        /// Name of the connector.
        connector: &'static str,
        /// Type of the descriptor it received.
        found: ResourceType,
    },

    // Package Security Errors
    /// An archive member failed a security check.
    #[error("threat detected: {reason} in {path}")]
    ThreatDetected {
        /// The archive member that failed the check.
        path: PathBuf,
        /// Description of the threat.
        reason: String,
    },

    /// The archive has more members than allowed.
    #[error("too many members in {path}: more than {limit}")]
    MemberCountExceeded {
        /// The archive path.
        path: PathBuf,
        /// The member count limit.
        limit: usize,
    },

    /// A member or the archive as a whole is larger than allowed.
    #[error("size exceeded: {path} ({size} > {limit})")]
    FileSizeExceeded {
        /// The member or archive path.
        path: PathBuf,
        /// The actual size.
        size: u64,
        /// The size limit.
        limit: u64,
    },

    // Serialization Errors
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// I/O error with context.
    #[error("{operation} failed for {path}: {source}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The path involved in the operation.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl VfsError {
    /// Wrap an I/O error with the operation and path that produced it.
    ///
    /// `NotFound` errors become [`VfsError::NotFound`] so callers can match on
    /// missing files without inspecting the source.
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => VfsError::NotFound { path },
            _ => VfsError::Io {
                operation,
                path,
                source,
            },
        }
    }
}

impl From<std::io::Error> for VfsError {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => VfsError::NotFound {
                path: PathBuf::new(),
            },
            std::io::ErrorKind::AlreadyExists => VfsError::AlreadyExists {
                path: PathBuf::new(),
                operation: "io",
            },
            _ => VfsError::Io {
                operation: "io",
                path: PathBuf::new(),
                source: error,
            },
        }
    }
}

impl From<serde_json::Error> for VfsError {
    fn from(error: serde_json::Error) -> Self {
        if error.is_io() {
            VfsError::Serialization(error.to_string())
        } else {
            VfsError::Deserialization(error.to_string())
        }
    }
}
