//! Client-side driver: slices a payload into chunks and pushes them through an
//! [`UploadTransport`] in order.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, instrument, warn};

use crate::config::DEFAULT_CHUNK_SIZE;
use crate::{FluxConfig, FluxError, FluxResult, UploadCoordinator, UploadReceipt};

/// Callback invoked with the completed percentage (0-100].
pub type ProgressCallback = Box<dyn Fn(f64) + Send + Sync>;

/// Callback invoked with the error that aborted an upload.
pub type ErrorCallback = Box<dyn Fn(&FluxError) + Send + Sync>;

/// Remote equivalent of the coordinator operations, as seen by a client
#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn initialize_upload(&self, file_name: &str) -> FluxResult<String>;

    async fn upload_chunk(&self, upload_id: &str, chunk: Bytes, chunk_index: u64)
        -> FluxResult<String>;

    async fn finalize_upload(&self, upload_id: &str) -> FluxResult<UploadReceipt>;

    async fn cancel_upload(&self, upload_id: &str) -> FluxResult<()>;
}

/// Transport that calls a coordinator in-process
#[derive(Clone)]
pub struct CoordinatorTransport {
    coordinator: Arc<dyn UploadCoordinator>,
}

impl CoordinatorTransport {
    pub fn new(coordinator: Arc<dyn UploadCoordinator>) -> Self {
        Self { coordinator }
    }
}

#[async_trait]
impl UploadTransport for CoordinatorTransport {
    async fn initialize_upload(&self, file_name: &str) -> FluxResult<String> {
        self.coordinator.start_upload(file_name).await
    }

    async fn upload_chunk(
        &self,
        upload_id: &str,
        chunk: Bytes,
        chunk_index: u64,
    ) -> FluxResult<String> {
        self.coordinator
            .upload_chunk(upload_id, chunk, chunk_index)
            .await
    }

    async fn finalize_upload(&self, upload_id: &str) -> FluxResult<UploadReceipt> {
        self.coordinator.complete_upload(upload_id).await
    }

    async fn cancel_upload(&self, upload_id: &str) -> FluxResult<()> {
        self.coordinator.cancel_upload(upload_id).await
    }
}

/// Sequential chunked uploader.
///
/// Uploads chunk `i` only after chunk `i - 1` succeeded, reports progress
/// after every chunk and pauses for `delay` between chunks. The first
/// failure stops the upload; nothing is retried and nothing is cancelled
/// on the server.
pub struct ChunkedUploader<T> {
    transport: T,
    chunk_size: usize,
    delay: Duration,
    on_progress: Option<ProgressCallback>,
    on_error: Option<ErrorCallback>,
}

impl<T: UploadTransport> ChunkedUploader<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            chunk_size: DEFAULT_CHUNK_SIZE,
            delay: Duration::from_secs(1),
            on_progress: None,
            on_error: None,
        }
    }

    /// Take chunk size and pacing from `config`
    pub fn from_config(transport: T, config: &FluxConfig) -> Self {
        Self::new(transport)
            .with_chunk_size(config.chunk_size)
            .with_delay(config.upload_delay)
    }

    /// Set chunk size; zero is bumped to one byte
    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes.max(1);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.on_progress = Some(Box::new(callback));
        self
    }

    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&FluxError) + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(callback));
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Number of chunks a payload of `len` bytes is split into
    pub fn chunk_count(&self, len: usize) -> usize {
        len.div_ceil(self.chunk_size)
    }

    /// Upload `data` as `file_name`
    pub async fn upload_bytes(&self, file_name: &str, data: Bytes) -> FluxResult<UploadReceipt> {
        match self.run(file_name, data).await {
            Ok(receipt) => Ok(receipt),
            Err(error) => {
                warn!(%file_name, %error, "chunked upload failed");
                if let Some(callback) = &self.on_error {
                    callback(&error);
                }
                Err(error)
            }
        }
    }

    /// Read a file from disk and upload it under its own file name
    pub async fn upload_file(&self, path: impl AsRef<Path>) -> FluxResult<UploadReceipt> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();

        let data = match tokio::fs::read(path).await {
            Ok(data) => Bytes::from(data),
            Err(error) => {
                let error = FluxError::from(error);
                if let Some(callback) = &self.on_error {
                    callback(&error);
                }
                return Err(error);
            }
        };
        self.upload_bytes(&file_name, data).await
    }

    #[instrument(skip(self, data), fields(size = data.len(), chunk_size = self.chunk_size))]
    async fn run(&self, file_name: &str, data: Bytes) -> FluxResult<UploadReceipt> {
        let total = self.chunk_count(data.len());
        let upload_id = self.transport.initialize_upload(file_name).await?;
        debug!(%upload_id, total, "upload initialized");

        for index in 0..total {
            let start = index * self.chunk_size;
            let end = (start + self.chunk_size).min(data.len());
            self.transport
                .upload_chunk(&upload_id, data.slice(start..end), index as u64)
                .await?;

            if let Some(callback) = &self.on_progress {
                callback((index + 1) as f64 / total as f64 * 100.0);
            }
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        self.transport.finalize_upload(&upload_id).await
    }
}
