//! # murasame-vfs
//!
//! A **versioned virtual file system** over local directories and resource
//! packages.
//!
//! Applications read their resources (configuration, localization, assets)
//! through one namespace of `/`-separated keys, no matter whether a file
//! lives in a directory on disk or inside a tar package shipped with the
//! application. Every file can hold several versions; the newest one wins.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use murasame_vfs::{Vfs, VfsApi, VfsExt};
//! use std::path::Path;
//!
//! let mut vfs = Vfs::new();
//!
//! // A package with the shipped resources...
//! vfs.register_source(Path::new("~/.myapp/base.pkg"))?;
//! // ...and a local directory whose files shadow packaged ones.
//! vfs.register_source(Path::new("~/.myapp/overrides"))?;
//!
//! let settings: serde_json::Value = vfs.read_json("config/settings.json")?;
//! for file in vfs.get_all_files("localization", true, Some(".json")) {
//!     println!("{}", file.name());
//! }
//! # Ok::<(), murasame_vfs::VfsError>(())
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Vfs`] | The file system: mounts sources, resolves keys, loads content |
//! | [`VfsApi`] | Object-safe interface implemented by [`Vfs`] |
//! | [`Node`] | Directory or file in the tree |
//! | [`Resource`] | One version of a file, with cached content |
//! | [`ResourceDescriptor`] | Where a resource's bytes live ([`LocalFile`] or [`PackageFile`]) |
//! | [`ResourceConnector`] | Loads a descriptor's content |
//! | [`ResourceVersion`] | Ordered version number, starting at 1 |
//! | [`Package`] | An opened resource package |
//! | [`SecureArchive`] | Tar access with TarBomb protection |
//! | [`PackageBuilder`] | Writes resource packages |
//! | [`VfsError`] | Error type with context |
//!
//! ---
//!
//! ## Sources
//!
//! [`register_source`](VfsApi::register_source) accepts:
//!
//! - a directory containing a `.vfs` descriptor: the described tree is mounted,
//! - any other directory: its files are mirrored at [`ResourceVersion::LATEST`],
//! - a regular file: it is opened as a resource package.
//!
//! Sources merge into one tree. Files present in several sources keep every
//! version, and lookups without a version return the newest.
//!
//! ---
//!
//! ## Security
//!
//! Packages are untrusted input. Before a package is read, every member is
//! checked for path traversal, escaping links, device files, nested archives
//! and size limits (see [`SecureArchive`] and [`PackageLimits`]).
//!
//! ---
//!
//! ## Thread Safety
//!
//! All types are `Send + Sync`. Lookups and content loads take `&self`, so a
//! shared `&Vfs` can be read from many threads; content is loaded once and
//! cached. Share a mutable VFS as `Arc<RwLock<Vfs>>`.
//!
//! ---
//!
//! ## Logging
//!
//! The crate logs through [`tracing`] and never installs a subscriber.

// Private modules
mod config;
mod descriptor;
mod error;
mod ext;
mod local_file;
mod node;
mod package;
mod resource;
mod traits;
mod types;
mod version;
mod vfs;

// Public modules
pub mod content;
pub mod paths;

// Public re-exports - error types
pub use error::VfsError;

// Public re-exports - core types
pub use types::{DESCRIPTOR_FILE_NAME, NodeType, ROOT_NODE_NAME, ResourceContent, ResourceType};
pub use version::ResourceVersion;

// Public re-exports - tree
pub use node::Node;
pub use resource::Resource;
pub use vfs::Vfs;

// Public re-exports - traits
pub use traits::{ResourceConnector, VfsApi};

// Public re-exports - descriptors and connectors
pub use descriptor::{LocalFile, PackageFile, ResourceDescriptor};
pub use local_file::LocalFileConnector;
pub use package::{
    MemberInfo, MemberKind, Package, PackageBuilder, PackageFileConnector, SecureArchive,
};

// Public re-exports - configuration
pub use config::{DEFAULT_BLOCKED_EXTENSIONS, PackageLimits, VfsConfig};

// Public re-exports - infrastructure
pub use ext::VfsExt;
