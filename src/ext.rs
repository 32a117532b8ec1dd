//! # Extension Traits
//!
//! Typed reads over any [`VfsApi`].
//!
//! ## Overview
//!
//! [`VfsExt`] turns the [`ResourceContent`] returned by
//! [`get_content`](VfsApi::get_content) into the type the caller expects.
//! It has a blanket implementation, so every `VfsApi` gets it for free.
//!
//! ## Available Methods
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`read_json`](VfsExt::read_json) | Deserialize JSON content into `T` |
//! | [`read_text`](VfsExt::read_text) | Content as a string |
//! | [`read_bytes`](VfsExt::read_bytes) | Content as raw bytes |

use serde::de::DeserializeOwned;

use crate::{ResourceContent, VfsApi, VfsError};

/// Typed read methods for any virtual file system.
///
/// All methods read the newest version of the file at `key`.
///
/// # Example
///
/// ```rust
/// use murasame_vfs::{VfsApi, VfsError, VfsExt};
///
/// #[derive(serde::Deserialize)]
/// struct AppConfig {
///     debug: bool,
/// }
///
/// fn load_config(vfs: &dyn VfsApi) -> Result<AppConfig, VfsError> {
///     vfs.read_json("config/app.json")
/// }
/// ```
pub trait VfsExt: VfsApi {
    /// Deserialize the JSON content at `key` into `T`.
    ///
    /// Text and binary content are parsed as JSON as well.
    ///
    /// # Errors
    ///
    /// - Any error of [`get_content`](VfsApi::get_content)
    /// - [`VfsError::Deserialization`] if the content does not match `T`
    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<T, VfsError> {
        let parsed = match self.get_content(key, None)? {
            ResourceContent::Json(value) => T::deserialize(value),
            ResourceContent::Text(text) => serde_json::from_str(text),
            ResourceContent::Binary(bytes) => serde_json::from_slice(bytes),
        };
        parsed.map_err(|e| VfsError::Deserialization(format!("{key}: {e}")))
    }

    /// The content at `key` as text.
    ///
    /// JSON is re-encoded; binary content must be valid UTF-8.
    ///
    /// # Errors
    ///
    /// - Any error of [`get_content`](VfsApi::get_content)
    /// - [`VfsError::InvalidData`] if binary content is not valid UTF-8
    fn read_text(&self, key: &str) -> Result<String, VfsError> {
        match self.get_content(key, None)? {
            ResourceContent::Text(text) => Ok(text.clone()),
            ResourceContent::Json(value) => Ok(value.to_string()),
            ResourceContent::Binary(bytes) => {
                String::from_utf8(bytes.clone()).map_err(|_| VfsError::InvalidData {
                    path: key.into(),
                    details: "not valid UTF-8".into(),
                })
            }
        }
    }

    /// The content at `key` as bytes.
    ///
    /// # Errors
    ///
    /// - Any error of [`get_content`](VfsApi::get_content)
    fn read_bytes(&self, key: &str) -> Result<Vec<u8>, VfsError> {
        Ok(self.get_content(key, None)?.to_bytes())
    }
}

impl<V: VfsApi + ?Sized> VfsExt for V {}
