//! Wire request/response types shared by the server and the CLI client.

use serde::{Deserialize, Serialize};

/// Response to a successful upload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    /// The assigned filename (possibly suffix-versioned on collision).
    pub name: String,
    /// Size of the stored payload in bytes.
    pub size_bytes: u64,
    /// Lowercase hex SHA-256 of the stored payload.
    pub content_hash: String,
}

/// A single file in listings and info responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Unix timestamp (seconds).
    pub modified: i64,
}

/// Response to a listing request, newest first.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListResponse {
    pub files: Vec<FileEntry>,
}

/// Response to a successful delete.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// The deleted filename.
    pub name: String,
}
