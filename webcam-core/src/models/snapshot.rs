use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::config::ScreenshotFormat;

/// A captured still frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// `data:<mime>;base64,<payload>`
    pub data_url: String,
    pub format: ScreenshotFormat,
    pub metadata: SnapshotMetadata,
}

/// Metadata describing a snapshot. Serializable for JSON export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub id: String,
    pub created_at: String,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
    pub byte_len: usize,
    /// SHA-256 of the encoded image bytes, lowercase hex.
    pub checksum: String,
}

impl SnapshotMetadata {
    pub fn new(format: ScreenshotFormat, width: u32, height: u32, encoded: &[u8]) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            mime_type: format.mime_type().to_string(),
            width,
            height,
            byte_len: encoded.len(),
            checksum: sha256_hex(encoded),
        }
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
