//! # VFS Traits
//!
//! The two seams of the crate.
//!
//! | Trait | Implemented by | Role |
//! |-------|----------------|------|
//! | [`VfsApi`] | [`Vfs`](crate::Vfs) | Mount sources, resolve keys, load content |
//! | [`ResourceConnector`] | [`LocalFileConnector`](crate::LocalFileConnector), [`PackageFileConnector`](crate::PackageFileConnector) | Turn a descriptor into content |
//!
//! ## Thread Safety
//!
//! Both traits require `Send + Sync`. Connectors take `&self` everywhere;
//! `VfsApi` takes `&mut self` for operations that change the tree.
//!
//! ## Object Safety
//!
//! Both traits are object-safe:
//!
//! ```rust
//! use murasame_vfs::{ResourceConnector, VfsApi};
//!
//! fn count(vfs: &dyn VfsApi) -> usize {
//!     vfs.get_all_files("", true, None).len()
//! }
//!
//! fn boxed(_: Box<dyn ResourceConnector>) {}
//! ```

mod connector;
mod vfs_api;

pub use connector::ResourceConnector;
pub use vfs_api::VfsApi;
