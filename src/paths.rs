//! # Path Handling
//!
//! Host path resolution and VFS key splitting.
//!
//! ## Responsibility
//! - Expand `~` and make host paths absolute before touching the disk
//! - Normalize paths lexically (without following symlinks) for containment checks
//! - Split `/`-separated VFS keys into segments
//!
//! Host paths and VFS keys are different things: a host path names a file on
//! disk or an archive member, a key names a node in the VFS tree.

use std::path::{Component, Path, PathBuf};

use crate::VfsError;

/// Expand a leading `~` to the current user's home directory.
///
/// Paths without a leading `~` are returned unchanged. If the home directory
/// cannot be determined the path is returned unchanged as well.
pub fn expand_user(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => match dirs::home_dir() {
            Some(home) => home.join(components.as_path()),
            None => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

/// Expand `~`, make the path absolute and normalize it lexically.
///
/// # Errors
///
/// - [`VfsError::Io`] if the current directory cannot be determined
pub fn resolve_host_path(path: &Path) -> Result<PathBuf, VfsError> {
    let expanded = expand_user(path);
    let absolute = std::path::absolute(&expanded)
        .map_err(|e| VfsError::io("resolve", expanded.clone(), e))?;
    Ok(normalize(&absolute))
}

/// Normalize a path lexically: drop `.` components and fold `..` into the
/// preceding component.
///
/// A `..` that would climb above the start of a relative path is kept, so the
/// caller can still detect escaping paths. On absolute paths `..` at the root
/// stays at the root.
pub fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last = result.components().next_back();
                match last {
                    Some(Component::Normal(_)) => {
                        result.pop();
                    }
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                    _ => result.push(".."),
                }
            }
            other => result.push(other.as_os_str()),
        }
    }
    result
}

/// Returns `true` if `candidate` stays inside `root` after lexical
/// normalization.
pub fn is_contained(root: &Path, candidate: &Path) -> bool {
    normalize(candidate).starts_with(normalize(root))
}

/// Split a VFS key into its non-empty segments.
///
/// Leading, trailing and repeated `/` are ignored, so `"/a//b/"` yields
/// `["a", "b"]` and `""` or `"/"` yield no segments (the node itself).
pub fn key_segments(key: &str) -> impl Iterator<Item = &str> {
    key.split('/').filter(|segment| !segment.is_empty())
}

/// Strip a leading `/` or `./` from an archive member or descriptor path.
pub fn member_name(path: &str) -> &str {
    let trimmed = path.trim_start_matches("./");
    trimmed.trim_start_matches('/')
}

// ============================================================================
// Tests
// ============================================================================
