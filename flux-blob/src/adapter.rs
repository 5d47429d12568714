use std::sync::Arc;

use bytes::Bytes;

use crate::{
    ChunkStore, ChunkUploadCoordinator, ChunkedUploader, CoordinatorTransport, DefaultNameProvider,
    FluxConfig, FluxResult, LocalChunkStore, MemoryChunkStore, NameProvider, UploadCoordinator,
    UploadReceipt,
};

/// Wires naming, storage and coordination together.
///
/// This is what services and transports embed: one shared store, one naming
/// scheme (and so one identifier registry), one coordinator.
#[derive(Clone)]
pub struct FluxAdapter {
    store: Arc<dyn ChunkStore>,
    names: Arc<dyn NameProvider>,
    coordinator: Arc<dyn UploadCoordinator>,
    config: FluxConfig,
}

impl FluxAdapter {
    /// Create an adapter over `store` with the default naming scheme
    pub fn new<S: ChunkStore + 'static>(store: S, config: FluxConfig) -> Self {
        Self::with_name_provider(store, DefaultNameProvider::new(), config)
    }

    /// Create with a custom naming scheme
    pub fn with_name_provider<S, N>(store: S, names: N, config: FluxConfig) -> Self
    where
        S: ChunkStore + 'static,
        N: NameProvider + 'static,
    {
        Self::from_shared(Arc::new(store), Arc::new(names), config)
    }

    pub fn from_shared(
        store: Arc<dyn ChunkStore>,
        names: Arc<dyn NameProvider>,
        config: FluxConfig,
    ) -> Self {
        let coordinator = ChunkUploadCoordinator::from_shared(store.clone(), names.clone())
            .with_config(&config);
        Self {
            store,
            names,
            coordinator: Arc::new(coordinator),
            config,
        }
    }

    /// Local-disk adapter rooted at `config.upload_dir`
    pub async fn local(config: FluxConfig) -> FluxResult<Self> {
        let store = LocalChunkStore::new(&config.upload_dir).await?;
        Ok(Self::new(store, config))
    }

    /// In-memory adapter
    pub fn memory(config: FluxConfig) -> Self {
        Self::new(MemoryChunkStore::new(), config)
    }

    pub async fn start_upload(&self, file_name: &str) -> FluxResult<String> {
        self.coordinator.start_upload(file_name).await
    }

    pub async fn upload_chunk(
        &self,
        file_name: &str,
        bytes: Bytes,
        chunk_index: u64,
    ) -> FluxResult<String> {
        self.coordinator
            .upload_chunk(file_name, bytes, chunk_index)
            .await
    }

    pub async fn complete_upload(&self, file_name: &str) -> FluxResult<UploadReceipt> {
        self.coordinator.complete_upload(file_name).await
    }

    pub async fn cancel_upload(&self, file_name: &str) -> FluxResult<()> {
        self.coordinator.cancel_upload(file_name).await
    }

    /// Client driver that talks to this adapter's coordinator in-process
    pub fn uploader(&self) -> ChunkedUploader<CoordinatorTransport> {
        ChunkedUploader::from_config(
            CoordinatorTransport::new(self.coordinator.clone()),
            &self.config,
        )
    }

    pub fn coordinator(&self) -> &Arc<dyn UploadCoordinator> {
        &self.coordinator
    }

    pub fn store(&self) -> &Arc<dyn ChunkStore> {
        &self.store
    }

    pub fn names(&self) -> &Arc<dyn NameProvider> {
        &self.names
    }

    pub fn config(&self) -> &FluxConfig {
        &self.config
    }
}
