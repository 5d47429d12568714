//! # flux-blob: chunked file upload infrastructure
//!
//! A client splits a large file into sequential chunks and uploads each one
//! independently. On completion the chunks are concatenated in index order
//! into the final artifact and deleted; on cancellation they are deleted.
//!
//! ## Quick Start
//!
//! ```rust
//! use flux_blob::prelude::*;
//! use bytes::Bytes;
//!
//! # #[tokio::main]
//! # async fn main() -> FluxResult<()> {
//! let adapter = FluxAdapter::memory(FluxConfig::default());
//!
//! let upload_id = adapter.start_upload("Holiday Video.mp4").await?;
//! adapter.upload_chunk(&upload_id, Bytes::from_static(b"first "), 0).await?;
//! adapter.upload_chunk(&upload_id, Bytes::from_static(b"second"), 1).await?;
//!
//! let receipt = adapter.complete_upload(&upload_id).await?;
//! assert_eq!(receipt.size_bytes, 12);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │   ChunkedUploader        │  ← client driver: slicing, pacing, progress
//! ├──────────────────────────┤
//! │   UploadTransport        │  ← in-process or remote (HTTP)
//! ├──────────────────────────┤
//! │   UploadCoordinator      │  ← start / chunk / complete / cancel
//! ├──────────────────────────┤
//! │ NameProvider, ChunkStore │  ← naming scheme and byte storage
//! └──────────────────────────┘
//! ```
//!
//! Upload state is never persisted. An upload is in progress exactly while
//! chunks matching its search pattern exist in the store.

pub mod adapter;
pub mod client;
mod config;
mod coordinator;
mod error;
mod fs_store;
pub mod identity;
mod locks;
mod memory_store;
pub mod naming;
mod pattern;
mod receipt;
pub mod store;
mod upload;

pub use adapter::FluxAdapter;
pub use client::{
    ChunkedUploader, CoordinatorTransport, ErrorCallback, ProgressCallback, UploadTransport,
};
pub use config::{env_var_or, FluxConfig, DEFAULT_CHUNK_SIZE};
pub use coordinator::ChunkUploadCoordinator;
pub use error::{FluxError, FluxResult};
pub use fs_store::LocalChunkStore;
pub use identity::{IdentifierRegistry, MemoryIdentifierRegistry, TokenGenerator, UuidTokenGenerator};
pub use locks::UploadLocks;
pub use memory_store::MemoryChunkStore;
pub use naming::{DefaultNameProvider, NameProvider};
pub use pattern::ChunkPattern;
pub use receipt::UploadReceipt;
pub use store::ChunkStore;
pub use upload::UploadCoordinator;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        ChunkStore, ChunkedUploader, FluxAdapter, FluxConfig, FluxError, FluxResult,
        NameProvider, UploadCoordinator, UploadReceipt, UploadTransport,
    };
}
