//! Resource versions.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::VfsError;

/// Version number of a single VFS resource.
///
/// Versions start at 1 and are totally ordered. A file node keeps its
/// resources sorted newest first, so the highest version is what a lookup
/// without an explicit version returns.
///
/// # Examples
///
/// ```rust
/// use murasame_vfs::ResourceVersion;
///
/// let v1 = ResourceVersion::new(1).unwrap();
/// let v2 = ResourceVersion::new(2).unwrap();
/// assert!(v2 > v1);
/// assert!(ResourceVersion::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceVersion(u32);

impl ResourceVersion {
    /// The first valid version.
    pub const FIRST: Self = Self(1);

    /// The highest possible version.
    ///
    /// Files mirrored from a local directory use this version so they shadow
    /// any packaged resource under the same key.
    pub const LATEST: Self = Self(u32::MAX);

    /// Create a version from its number.
    ///
    /// # Errors
    ///
    /// - [`VfsError::InvalidInput`] if `version` is 0
    pub fn new(version: u32) -> Result<Self, VfsError> {
        if version < 1 {
            return Err(VfsError::InvalidInput(
                "resource version must be greater than 0".into(),
            ));
        }
        Ok(Self(version))
    }

    /// The raw version number.
    #[inline]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns `true` if this version is newer than `other`.
    #[inline]
    pub fn is_newer(&self, other: &Self) -> bool {
        self > other
    }

    /// Returns `true` if this version is older than `other`.
    #[inline]
    pub fn is_older(&self, other: &Self) -> bool {
        self < other
    }

    /// Increase the version number by one.
    pub fn bump(&mut self) {
        self.0 = self.0.saturating_add(1);
    }
}

impl Default for ResourceVersion {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for ResourceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for ResourceVersion {
    type Error = VfsError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for ResourceVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.0)
    }
}

impl<'de> Deserialize<'de> for ResourceVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Package descriptors write versions both as numbers and as strings.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        let number = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n,
            Raw::Text(s) => s.trim().parse::<u64>().map_err(|_| {
                serde::de::Error::custom(format!("invalid resource version: {s:?}"))
            })?,
        };
        let number = u32::try_from(number)
            .map_err(|_| serde::de::Error::custom(format!("resource version out of range: {number}")))?;
        ResourceVersion::new(number).map_err(serde::de::Error::custom)
    }
}
