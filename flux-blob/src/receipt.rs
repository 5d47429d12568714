use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Receipt returned after an upload has been assembled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    /// Name the assembled artifact was stored under
    pub file_name: String,
    pub size_bytes: u64,
    /// Number of chunks that went into the artifact
    pub chunks: usize,
    pub completed_at: DateTime<Utc>,
}

impl UploadReceipt {
    pub fn new(file_name: impl Into<String>, size_bytes: u64, chunks: usize) -> Self {
        Self {
            file_name: file_name.into(),
            size_bytes,
            chunks,
            completed_at: Utc::now(),
        }
    }

    pub fn with_completed_at(mut self, at: DateTime<Utc>) -> Self {
        self.completed_at = at;
        self
    }
}
