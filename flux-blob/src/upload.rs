use async_trait::async_trait;
use bytes::Bytes;

use crate::{FluxResult, UploadReceipt};

/// Drives one chunked upload from start to completion or cancellation.
///
/// Upload state is never stored: whether an upload is in progress is
/// inferred from the chunks present in the backing store.
#[async_trait]
pub trait UploadCoordinator: Send + Sync {
    /// Assign a unique identifier for a new upload of `file_name`
    async fn start_upload(&self, file_name: &str) -> FluxResult<String>;

    /// Persist one chunk and return its stored name
    async fn upload_chunk(&self, file_name: &str, bytes: Bytes, chunk_index: u64)
        -> FluxResult<String>;

    /// Assemble every chunk into `file_name`, then delete the chunks
    async fn complete_upload(&self, file_name: &str) -> FluxResult<UploadReceipt>;

    /// Delete every chunk of `file_name`
    async fn cancel_upload(&self, file_name: &str) -> FluxResult<()>;
}
