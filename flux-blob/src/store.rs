use async_trait::async_trait;
use bytes::Bytes;

use crate::FluxResult;

/// Chunk persistence - must be implemented by all storage backends.
///
/// Listing operations return chunks ordered by their embedded index so
/// reassembly never depends on the backend's enumeration order.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Write (or overwrite) `bytes` under `name`, returning the stored name
    async fn save_chunk(&self, name: &str, bytes: Bytes) -> FluxResult<String>;

    /// Concatenate every chunk matching `pattern`; empty when nothing matches
    async fn get_all_chunks(&self, pattern: &str) -> FluxResult<Bytes>;

    /// Names or paths of every chunk matching `pattern`, suitable for `delete_chunk`
    async fn get_all_chunk_paths(&self, pattern: &str) -> FluxResult<Vec<String>>;

    /// Remove one chunk by a name or path returned from `get_all_chunk_paths`
    async fn delete_chunk(&self, path: &str) -> FluxResult<()>;

    /// Backend name used in log fields
    fn backend_name(&self) -> &'static str {
        "custom"
    }
}
