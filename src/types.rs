//! Core types for the virtual file system.

/// Name given to the root node of every VFS tree.
pub const ROOT_NODE_NAME: &str = "ROOT";

/// File name of the node tree descriptor inside a source directory or package.
pub const DESCRIPTOR_FILE_NAME: &str = ".vfs";

/// Type of a VFS node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// File node holding versioned resources.
    File,
    /// Directory node holding child nodes.
    Directory,
}

/// Type of the storage backing a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// File in the local file system.
    LocalFile,
    /// File inside a resource package.
    PackageFile,
}

/// Materialized content of a VFS resource.
///
/// Connectors decode raw bytes according to the resource's content type:
/// JSON and YAML documents are parsed, text is kept as a string and anything
/// else is returned verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceContent {
    /// Parsed `application/json` or `application/x-yaml` document.
    Json(serde_json::Value),
    /// UTF-8 text (`text/*`).
    Text(String),
    /// Raw bytes.
    Binary(Vec<u8>),
}

impl ResourceContent {
    /// Returns the parsed JSON document, if this is JSON content.
    #[inline]
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResourceContent::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the text, if this is text content.
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResourceContent::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the raw bytes, if this is binary content.
    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ResourceContent::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Re-encodes the content into bytes regardless of its variant.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            ResourceContent::Json(value) => value.to_string().into_bytes(),
            ResourceContent::Text(text) => text.clone().into_bytes(),
            ResourceContent::Binary(bytes) => bytes.clone(),
        }
    }
}
