use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, instrument, warn};

use crate::{
    ChunkStore, FluxConfig, FluxError, FluxResult, NameProvider, UploadCoordinator, UploadLocks,
    UploadReceipt,
};

/// Upload coordinator that stages chunks in a `ChunkStore` and assembles them on completion
pub struct ChunkUploadCoordinator {
    store: Arc<dyn ChunkStore>,
    names: Arc<dyn NameProvider>,
    locks: Option<UploadLocks>,
}

impl ChunkUploadCoordinator {
    pub fn new<S, N>(store: S, names: N) -> Self
    where
        S: ChunkStore + 'static,
        N: NameProvider + 'static,
    {
        Self::from_shared(Arc::new(store), Arc::new(names))
    }

    /// Build over a store and naming scheme that are shared with other components
    pub fn from_shared(store: Arc<dyn ChunkStore>, names: Arc<dyn NameProvider>) -> Self {
        Self {
            store,
            names,
            locks: Some(UploadLocks::new()),
        }
    }

    /// Apply the per-upload locking choice from `config`
    pub fn with_config(mut self, config: &FluxConfig) -> Self {
        self.locks = config.serialize_per_upload.then(UploadLocks::new);
        self
    }

    /// Replace the per-upload locks; `None` disables serialization
    pub fn with_locks(mut self, locks: Option<UploadLocks>) -> Self {
        self.locks = locks;
        self
    }

    pub fn store(&self) -> &Arc<dyn ChunkStore> {
        &self.store
    }

    pub fn names(&self) -> &Arc<dyn NameProvider> {
        &self.names
    }

    fn require_identifier(file_name: &str) -> FluxResult<()> {
        if file_name.is_empty() {
            return Err(FluxError::EmptyIdentifier);
        }
        Ok(())
    }

    /// Lock every spelling of `file_name` that addresses the same chunks
    async fn lock(&self, file_name: &str) -> Option<(String, OwnedMutexGuard<()>)> {
        let locks = self.locks.as_ref()?;
        let key = self.names.upload_key(file_name);
        let guard = locks.acquire(&key).await;
        Some((key, guard))
    }

    fn unlock(&self, held: Option<(String, OwnedMutexGuard<()>)>) {
        if let (Some(locks), Some((key, guard))) = (&self.locks, held) {
            drop(guard);
            locks.release(&key);
        }
    }

    /// Delete listed chunks in order, stopping at the first failure
    async fn purge(&self, paths: &[String]) -> FluxResult<()> {
        for (deleted, path) in paths.iter().enumerate() {
            if let Err(error) = self.store.delete_chunk(path).await {
                warn!(
                    %path,
                    %error,
                    deleted,
                    remaining = paths.len() - deleted,
                    "chunk cleanup stopped"
                );
                return Err(error);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UploadCoordinator for ChunkUploadCoordinator {
    #[instrument(skip(self))]
    async fn start_upload(&self, file_name: &str) -> FluxResult<String> {
        Self::require_identifier(file_name)?;
        let upload_id = self.names.unique_file_name(file_name);
        debug!(%upload_id, "upload started");
        Ok(upload_id)
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload_chunk(
        &self,
        file_name: &str,
        bytes: Bytes,
        chunk_index: u64,
    ) -> FluxResult<String> {
        Self::require_identifier(file_name)?;
        let chunk_name = self.names.chunk_file_name(file_name, chunk_index);

        let held = self.lock(file_name).await;
        let result = self.store.save_chunk(&chunk_name, bytes).await;
        self.unlock(held);

        let stored = result?;
        debug!(chunk = %stored, "chunk stored");
        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn complete_upload(&self, file_name: &str) -> FluxResult<UploadReceipt> {
        let pattern = self.names.file_search_pattern(file_name)?;

        let held = self.lock(file_name).await;
        let result: FluxResult<UploadReceipt> = async {
            let combined = self.store.get_all_chunks(&pattern).await?;
            if combined.is_empty() {
                return Err(FluxError::NoChunksFound);
            }
            let paths = self.store.get_all_chunk_paths(&pattern).await?;
            let size = combined.len() as u64;

            self.store.save_chunk(file_name, combined).await?;
            self.purge(&paths).await?;

            info!(
                chunks = paths.len(),
                size,
                backend = self.store.backend_name(),
                "upload completed"
            );
            Ok(UploadReceipt::new(file_name, size, paths.len()))
        }
        .await;
        self.unlock(held);
        result
    }

    #[instrument(skip(self))]
    async fn cancel_upload(&self, file_name: &str) -> FluxResult<()> {
        let pattern = self.names.file_search_pattern(file_name)?;

        let held = self.lock(file_name).await;
        let result: FluxResult<()> = async {
            let paths = self.store.get_all_chunk_paths(&pattern).await?;
            self.purge(&paths).await?;
            info!(
                chunks = paths.len(),
                backend = self.store.backend_name(),
                "upload cancelled"
            );
            Ok(())
        }
        .await;
        self.unlock(held);
        result
    }
}
