//! # Secure Archive Access
//!
//! Tar archives (optionally gzip-compressed) are untrusted input. Every
//! member is checked before anything is read or unpacked.
//!
//! ## Member Checks
//!
//! | Check | Rejects | Error |
//! |-------|---------|-------|
//! | count | more than `max_member_count` members | [`VfsError::MemberCountExceeded`] |
//! | traversal | `..` components, absolute names, names leaving the destination | [`VfsError::ThreatDetected`] |
//! | symlink | link targets outside the destination | [`VfsError::ThreatDetected`] |
//! | hard link | link targets outside the destination | [`VfsError::ThreatDetected`] |
//! | device | character and block devices, FIFOs | [`VfsError::ThreatDetected`] |
//! | extension | nested archives (`zip`, `gz`, `tar`, ...) | [`VfsError::ThreatDetected`] |
//! | size | members larger than `max_member_size` | [`VfsError::FileSizeExceeded`] |
//! | total size | archives unpacking to more than `max_total_size` | [`VfsError::FileSizeExceeded`] |

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::EntryType;
use tracing::{debug, error};

use crate::PackageLimits;
use crate::VfsError;
use crate::paths::{is_contained, member_name, normalize, resolve_host_path};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Destination used when members are validated for reading only.
pub(crate) const VIRTUAL_ROOT: &str = "/vfs-package";

/// Kind of an archive member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Hard link to another member.
    HardLink,
    /// Character device.
    CharDevice,
    /// Block device.
    BlockDevice,
    /// Named pipe.
    Fifo,
    /// Anything else (sparse files, global headers, ...).
    Other,
}

impl From<EntryType> for MemberKind {
    fn from(entry_type: EntryType) -> Self {
        match entry_type {
            EntryType::Regular | EntryType::Continuous => MemberKind::File,
            EntryType::Directory => MemberKind::Directory,
            EntryType::Symlink => MemberKind::Symlink,
            EntryType::Link => MemberKind::HardLink,
            EntryType::Char => MemberKind::CharDevice,
            EntryType::Block => MemberKind::BlockDevice,
            EntryType::Fifo => MemberKind::Fifo,
            _ => MemberKind::Other,
        }
    }
}

/// Header information of one archive member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    /// Member name as stored in the archive.
    pub name: String,
    /// Member kind.
    pub kind: MemberKind,
    /// Size in bytes as declared by the header.
    pub size: u64,
    /// Target of symbolic and hard links.
    pub link_target: Option<PathBuf>,
}

impl MemberInfo {
    fn path(&self) -> &Path {
        Path::new(&self.name)
    }
}

type MemberCheck = fn(&MemberInfo, &Path, &PackageLimits) -> Result<(), VfsError>;

const MEMBER_CHECKS: &[MemberCheck] = &[
    check_traversal,
    check_symlink,
    check_hard_link,
    check_device,
    check_extension,
    check_size,
];

fn threat(member: &MemberInfo, reason: impl Into<String>) -> VfsError {
    VfsError::ThreatDetected {
        path: member.path().to_path_buf(),
        reason: reason.into(),
    }
}

fn check_traversal(member: &MemberInfo, dest: &Path, _: &PackageLimits) -> Result<(), VfsError> {
    let path = member.path();
    let escapes = path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes || !is_contained(dest, &dest.join(path)) {
        return Err(threat(member, "path traversal"));
    }
    Ok(())
}

fn check_symlink(member: &MemberInfo, dest: &Path, _: &PackageLimits) -> Result<(), VfsError> {
    if member.kind != MemberKind::Symlink {
        return Ok(());
    }
    let Some(target) = &member.link_target else {
        return Err(threat(member, "symlink without target"));
    };
    let base = dest.join(member.path().parent().unwrap_or(Path::new("")));
    if !is_contained(dest, &base.join(target)) {
        return Err(threat(member, format!("unsafe symlink to {}", target.display())));
    }
    Ok(())
}

fn check_hard_link(member: &MemberInfo, dest: &Path, _: &PackageLimits) -> Result<(), VfsError> {
    if member.kind != MemberKind::HardLink {
        return Ok(());
    }
    let Some(target) = &member.link_target else {
        return Err(threat(member, "hard link without target"));
    };
    let escapes = target
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
    if escapes || !is_contained(dest, &dest.join(target)) {
        return Err(threat(member, format!("unsafe hard link to {}", target.display())));
    }
    Ok(())
}

fn check_device(member: &MemberInfo, _: &Path, _: &PackageLimits) -> Result<(), VfsError> {
    match member.kind {
        MemberKind::CharDevice => Err(threat(member, "character device")),
        MemberKind::BlockDevice => Err(threat(member, "block device")),
        MemberKind::Fifo => Err(threat(member, "named pipe")),
        _ => Ok(()),
    }
}

fn check_extension(member: &MemberInfo, _: &Path, limits: &PackageLimits) -> Result<(), VfsError> {
    if member.kind == MemberKind::Directory {
        return Ok(());
    }
    match member.path().extension().and_then(|e| e.to_str()) {
        Some(extension) if limits.is_blocked_extension(extension) => {
            Err(threat(member, format!("blocked extension .{extension}")))
        }
        _ => Ok(()),
    }
}

fn check_size(member: &MemberInfo, _: &Path, limits: &PackageLimits) -> Result<(), VfsError> {
    if member.size > limits.max_member_size {
        return Err(VfsError::FileSizeExceeded {
            path: member.path().to_path_buf(),
            size: member.size,
            limit: limits.max_member_size,
        });
    }
    Ok(())
}

/// Run every per-member check against `member`.
pub(crate) fn check_member(
    member: &MemberInfo,
    destination: &Path,
    limits: &PackageLimits,
) -> Result<(), VfsError> {
    MEMBER_CHECKS
        .iter()
        .try_for_each(|check| check(member, destination, limits))
}

fn same_member(a: &str, b: &str) -> bool {
    member_name(a).trim_end_matches('/') == member_name(b).trim_end_matches('/')
}

/// A tar archive whose members are validated before use.
///
/// The archive is reopened for every operation; no file handle is kept.
///
/// # Example
///
/// ```rust,no_run
/// use murasame_vfs::{PackageLimits, SecureArchive};
/// use std::path::Path;
///
/// let archive = SecureArchive::open(Path::new("resources.pkg"), PackageLimits::default())?;
/// let descriptor = archive.read_member(".vfs")?;
/// # Ok::<(), murasame_vfs::VfsError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SecureArchive {
    path: PathBuf,
    limits: PackageLimits,
    compressed: bool,
    members: Vec<MemberInfo>,
}

impl SecureArchive {
    /// Open the archive at `path` and read its member headers.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if the archive does not exist
    /// - [`VfsError::MemberCountExceeded`] if it has too many members
    /// - [`VfsError::FileSizeExceeded`] if a member or the archive is too large
    /// - [`VfsError::Io`] if the archive is corrupt
    ///
    /// Limits are enforced on each header before the member's body is
    /// skipped, so oversized or compressed payloads are never read in full.
    pub fn open(path: &Path, limits: PackageLimits) -> Result<Self, VfsError> {
        let path = resolve_host_path(path)?;
        let (reader, compressed) = open_reader(&path)?;

        let mut archive = tar::Archive::new(reader);
        let mut members = Vec::new();
        let mut total: u64 = 0;
        let entries = archive
            .entries()
            .map_err(|e| VfsError::io("read archive", &path, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| VfsError::io("read archive", &path, e))?;
            if members.len() >= limits.max_member_count {
                error!(
                    archive = %path.display(),
                    limit = limits.max_member_count,
                    "archive has too many members"
                );
                return Err(VfsError::MemberCountExceeded {
                    path,
                    limit: limits.max_member_count,
                });
            }
            let member = MemberInfo {
                name: String::from_utf8_lossy(&entry.path_bytes()).into_owned(),
                kind: entry.header().entry_type().into(),
                size: entry.size(),
                link_target: entry
                    .link_name_bytes()
                    .map(|bytes| PathBuf::from(String::from_utf8_lossy(&bytes).into_owned())),
            };

            if let Err(err) = check_size(&member, &path, &limits) {
                error!(
                    archive = %path.display(),
                    member = %member.name,
                    error = %err,
                    "archive member rejected"
                );
                return Err(err);
            }
            total = total.saturating_add(member.size);
            if total > limits.max_total_size {
                error!(archive = %path.display(), total, "archive too large");
                return Err(VfsError::FileSizeExceeded {
                    path,
                    size: total,
                    limit: limits.max_total_size,
                });
            }
            members.push(member);
        }

        debug!(
            archive = %path.display(),
            members = members.len(),
            compressed,
            "archive headers read"
        );
        Ok(Self {
            path,
            limits,
            compressed,
            members,
        })
    }

    /// Host path of the archive.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if the archive is gzip-compressed.
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Member headers in archive order.
    pub fn members(&self) -> &[MemberInfo] {
        &self.members
    }

    /// Consume the archive, returning its member headers.
    pub fn into_members(self) -> Vec<MemberInfo> {
        self.members
    }

    /// Check every member as if the archive were unpacked into `destination`.
    ///
    /// # Errors
    ///
    /// The first failing check, see the module documentation.
    pub fn validate(&self, destination: &Path) -> Result<(), VfsError> {
        let destination = normalize(destination);
        let limits = &self.limits;

        if self.members.len() > limits.max_member_count {
            return Err(VfsError::MemberCountExceeded {
                path: self.path.clone(),
                limit: limits.max_member_count,
            });
        }

        let mut total: u64 = 0;
        for member in &self.members {
            if let Err(err) = check_member(member, &destination, limits) {
                error!(
                    archive = %self.path.display(),
                    member = %member.name,
                    error = %err,
                    "archive member rejected"
                );
                return Err(err);
            }
            total = total.saturating_add(member.size);
            if total > limits.max_total_size {
                error!(archive = %self.path.display(), total, "archive too large");
                return Err(VfsError::FileSizeExceeded {
                    path: self.path.clone(),
                    size: total,
                    limit: limits.max_total_size,
                });
            }
        }
        Ok(())
    }

    /// Validate the archive and return the bytes of the member `name`.
    ///
    /// A leading `/` or `./` in `name` is ignored.
    ///
    /// # Errors
    ///
    /// - Any validation error
    /// - [`VfsError::NotFound`] if no member has that name
    /// - [`VfsError::NotAFile`] if the member is not a regular file
    pub fn read_member(&self, name: &str) -> Result<Vec<u8>, VfsError> {
        self.validate(Path::new(VIRTUAL_ROOT))?;

        let (reader, _) = open_reader(&self.path)?;
        let mut archive = tar::Archive::new(reader);
        let entries = archive
            .entries()
            .map_err(|e| VfsError::io("read archive", &self.path, e))?;
        for entry in entries {
            let mut entry = entry.map_err(|e| VfsError::io("read archive", &self.path, e))?;
            let entry_name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
            if !same_member(&entry_name, name) {
                continue;
            }
            if MemberKind::from(entry.header().entry_type()) != MemberKind::File {
                return Err(VfsError::NotAFile { key: entry_name });
            }

            let capacity = entry.size().min(self.limits.max_member_size);
            let mut data = Vec::with_capacity(usize::try_from(capacity).unwrap_or(0));
            entry
                .by_ref()
                .take(self.limits.max_member_size)
                .read_to_end(&mut data)
                .map_err(|e| VfsError::io("read member", &self.path, e))?;
            debug!(archive = %self.path.display(), member = name, size = data.len(), "member read");
            return Ok(data);
        }

        Err(VfsError::NotFound {
            path: PathBuf::from(name),
        })
    }

    /// Validate the archive and unpack the member `name` below `destination`.
    ///
    /// Returns the host path of the unpacked member.
    ///
    /// # Errors
    ///
    /// - Any validation error
    /// - [`VfsError::NotFound`] if no member has that name
    /// - [`VfsError::Io`] if unpacking fails
    pub fn extract(&self, name: &str, destination: &Path) -> Result<PathBuf, VfsError> {
        let destination = resolve_host_path(destination)?;
        self.validate(&destination)?;
        std::fs::create_dir_all(&destination)
            .map_err(|e| VfsError::io("create_dir_all", &destination, e))?;

        let (reader, _) = open_reader(&self.path)?;
        let mut archive = tar::Archive::new(reader);
        let entries = archive
            .entries()
            .map_err(|e| VfsError::io("read archive", &self.path, e))?;
        for entry in entries {
            let mut entry = entry.map_err(|e| VfsError::io("read archive", &self.path, e))?;
            let entry_name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
            if !same_member(&entry_name, name) {
                continue;
            }
            unpack(&mut entry, &entry_name, &destination)?;
            debug!(archive = %self.path.display(), member = name, "member extracted");
            return Ok(destination.join(member_name(&entry_name)));
        }

        Err(VfsError::NotFound {
            path: PathBuf::from(name),
        })
    }

    /// Validate the archive and unpack all members below `destination`.
    ///
    /// Returns the number of unpacked members.
    ///
    /// # Errors
    ///
    /// - Any validation error
    /// - [`VfsError::Io`] if unpacking fails
    pub fn extract_all(&self, destination: &Path) -> Result<usize, VfsError> {
        let destination = resolve_host_path(destination)?;
        self.validate(&destination)?;
        std::fs::create_dir_all(&destination)
            .map_err(|e| VfsError::io("create_dir_all", &destination, e))?;

        let (reader, _) = open_reader(&self.path)?;
        let mut archive = tar::Archive::new(reader);
        let entries = archive
            .entries()
            .map_err(|e| VfsError::io("read archive", &self.path, e))?;
        let mut count = 0;
        for entry in entries {
            let mut entry = entry.map_err(|e| VfsError::io("read archive", &self.path, e))?;
            let entry_name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
            unpack(&mut entry, &entry_name, &destination)?;
            count += 1;
        }
        debug!(archive = %self.path.display(), members = count, "archive extracted");
        Ok(count)
    }
}

/// Unpack one entry below `destination`, failing if tar skips it.
fn unpack<R: Read>(
    entry: &mut tar::Entry<'_, R>,
    name: &str,
    destination: &Path,
) -> Result<(), VfsError> {
    let unpacked = entry
        .unpack_in(destination)
        .map_err(|e| VfsError::io("unpack", destination, e))?;
    if !unpacked {
        error!(member = name, destination = %destination.display(), "member refused to unpack");
        return Err(VfsError::ThreatDetected {
            path: PathBuf::from(name),
            reason: "member would unpack outside the destination".into(),
        });
    }
    Ok(())
}

/// Open `path` for reading, transparently decompressing gzip.
fn open_reader(path: &Path) -> Result<(Box<dyn Read>, bool), VfsError> {
    let file = File::open(path).map_err(|e| VfsError::io("open", path, e))?;
    let mut reader = BufReader::new(file);
    let compressed = reader
        .fill_buf()
        .map_err(|e| VfsError::io("read", path, e))?
        .starts_with(&GZIP_MAGIC);
    if compressed {
        Ok((Box::new(GzDecoder::new(reader)), true))
    } else {
        Ok((Box::new(reader), false))
    }
}
