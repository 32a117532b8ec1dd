//! Content type detection and decoding of raw resource bytes.

use std::path::Path;

use tracing::debug;

use crate::{ResourceContent, VfsError};

/// MIME type of JSON documents.
pub const APPLICATION_JSON: &str = "application/json";
/// MIME type of YAML documents.
pub const APPLICATION_YAML: &str = "application/x-yaml";
/// MIME type of plain text.
pub const TEXT_PLAIN: &str = "text/plain";
/// MIME type of arbitrary binary data.
pub const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";

/// Guess the MIME type of a resource from its path and bytes.
///
/// The extension decides when it is known. Otherwise the bytes are sniffed:
/// UTF-8 text that parses as a JSON object or array is JSON, any other UTF-8
/// is plain text and everything else is binary.
pub fn guess_content_type(path: &Path, bytes: &[u8]) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("json") => return APPLICATION_JSON,
        Some("yaml" | "yml") => return APPLICATION_YAML,
        Some("txt" | "md" | "csv" | "log" | "toml" | "ini" | "cfg") => return TEXT_PLAIN,
        _ => {}
    }

    let Ok(text) = std::str::from_utf8(bytes) else {
        return APPLICATION_OCTET_STREAM;
    };

    let looks_like_json = matches!(text.trim_start().as_bytes().first(), Some(b'{' | b'['));
    if looks_like_json && serde_json::from_str::<serde_json::Value>(text).is_ok() {
        APPLICATION_JSON
    } else {
        TEXT_PLAIN
    }
}

/// Decode raw bytes into [`ResourceContent`].
///
/// `content_type` is the declared MIME type; when `None` it is guessed with
/// [`guess_content_type`]. Declared types are matched case-insensitively and
/// parameters such as `; charset=utf-8` are ignored. YAML documents are
/// parsed into the same tree as JSON. `path` is only used for guessing and
/// error context.
///
/// # Errors
///
/// - [`VfsError::Deserialization`] if JSON or YAML content does not parse
/// - [`VfsError::InvalidData`] if text content is not valid UTF-8
pub fn decode(
    path: &Path,
    bytes: Vec<u8>,
    content_type: Option<&str>,
) -> Result<ResourceContent, VfsError> {
    let content_type = match content_type {
        Some(declared) => essence(declared),
        None => {
            let guessed = guess_content_type(path, &bytes);
            debug!(path = %path.display(), content_type = guessed, "guessed content type");
            guessed.to_string()
        }
    };
    let content_type = content_type.as_str();

    if content_type == APPLICATION_JSON {
        let value = serde_json::from_slice(&bytes)
            .map_err(|e| VfsError::Deserialization(format!("{}: {e}", path.display())))?;
        return Ok(ResourceContent::Json(value));
    }

    if content_type == APPLICATION_YAML {
        let value = serde_yaml::from_slice(&bytes)
            .map_err(|e| VfsError::Deserialization(format!("{}: {e}", path.display())))?;
        return Ok(ResourceContent::Json(value));
    }

    if content_type.starts_with("text/") {
        let text = String::from_utf8(bytes).map_err(|_| VfsError::InvalidData {
            path: path.to_path_buf(),
            details: "not valid UTF-8".into(),
        })?;
        return Ok(ResourceContent::Text(text));
    }

    debug!(
        path = %path.display(),
        content_type,
        "content type has no decoder, loading as binary"
    );
    Ok(ResourceContent::Binary(bytes))
}

/// Lowercased MIME type without parameters.
fn essence(content_type: &str) -> String {
    content_type
        .split_once(';')
        .map_or(content_type, |(essence, _)| essence)
        .trim()
        .to_ascii_lowercase()
}
