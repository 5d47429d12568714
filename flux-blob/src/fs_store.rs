//! Local filesystem chunk store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::fs;
use tokio::io::{AsyncReadExt, BufReader};
use tracing::{debug, instrument};

use crate::naming::order_by_chunk_index;
use crate::{ChunkPattern, ChunkStore, FluxResult};

/// Read buffer for chunk files (4 KiB).
const READ_BUFFER_SIZE: usize = 4 * 1024;

/// Stores each chunk as a flat file under a base directory.
///
/// Names are joined onto the base as given; no traversal or symlink checks
/// are performed, so callers must only pass names produced by the naming
/// scheme.
#[derive(Debug, Clone)]
pub struct LocalChunkStore {
    root: PathBuf,
}

impl LocalChunkStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub async fn new(root: impl AsRef<Path>) -> FluxResult<Self> {
        let root = root.as_ref();
        fs::create_dir_all(root).await?;
        let root = fs::canonicalize(root).await?;
        debug!(root = %root.display(), "opened local chunk store");
        Ok(Self { root })
    }

    /// Canonical base directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> PathBuf {
        // joining an absolute path replaces the root
        self.root.join(name)
    }

    async fn matching_paths(&self, pattern: &str) -> FluxResult<Vec<PathBuf>> {
        let pattern = ChunkPattern::new(pattern);
        let mut entries = fs::read_dir(&self.root).await?;
        let mut paths = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if pattern.matches(name) {
                    paths.push(entry.path());
                }
            }
        }

        let mut names: Vec<String> = paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        order_by_chunk_index(&mut names);
        Ok(names.into_iter().map(PathBuf::from).collect())
    }

    async fn read_file(path: &Path, into: &mut BytesMut) -> FluxResult<()> {
        let file = fs::File::open(path).await?;
        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        into.extend_from_slice(&buf);
        Ok(())
    }
}

#[async_trait]
impl ChunkStore for LocalChunkStore {
    #[instrument(skip(self, bytes), fields(backend = "local", size = bytes.len()))]
    async fn save_chunk(&self, name: &str, bytes: Bytes) -> FluxResult<String> {
        fs::write(self.resolve(name), &bytes).await?;
        Ok(name.to_string())
    }

    #[instrument(skip(self), fields(backend = "local"))]
    async fn get_all_chunks(&self, pattern: &str) -> FluxResult<Bytes> {
        let paths = self.matching_paths(pattern).await?;
        let mut combined = BytesMut::new();
        for path in &paths {
            Self::read_file(path, &mut combined).await?;
        }
        debug!(chunks = paths.len(), size = combined.len(), "read chunks");
        Ok(combined.freeze())
    }

    #[instrument(skip(self), fields(backend = "local"))]
    async fn get_all_chunk_paths(&self, pattern: &str) -> FluxResult<Vec<String>> {
        let paths = self.matching_paths(pattern).await?;
        Ok(paths
            .into_iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect())
    }

    #[instrument(skip(self), fields(backend = "local"))]
    async fn delete_chunk(&self, path: &str) -> FluxResult<()> {
        fs::remove_file(self.resolve(path)).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FluxError;
    use tempfile::TempDir;

    async fn store() -> (TempDir, LocalChunkStore) {
        let dir = TempDir::new().unwrap();
        let store = LocalChunkStore::new(dir.path()).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn creates_missing_base_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("uploads");
        let store = LocalChunkStore::new(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert!(store.root().is_absolute());
    }

    #[tokio::test]
    async fn save_overwrites_and_returns_name() {
        let (_dir, store) = store().await;
        let name = store
            .save_chunk("f_chunk_0.bin", Bytes::from_static(b"first"))
            .await
            .unwrap();
        assert_eq!(name, "f_chunk_0.bin");

        store
            .save_chunk("f_chunk_0.bin", Bytes::from_static(b"second"))
            .await
            .unwrap();
        let content = std::fs::read(store.root().join("f_chunk_0.bin")).unwrap();
        assert_eq!(content, b"second");
    }

    #[tokio::test]
    async fn concatenates_in_numeric_order() {
        let (_dir, store) = store().await;
        for i in (0..12u8).rev() {
            store
                .save_chunk(&format!("f_chunk_{i}.bin"), Bytes::from(vec![i]))
                .await
                .unwrap();
        }
        store
            .save_chunk("f.bin", Bytes::from_static(b"final"))
            .await
            .unwrap();

        let all = store.get_all_chunks("f_chunk_*").await.unwrap();
        assert_eq!(all.as_ref(), (0..12u8).collect::<Vec<_>>().as_slice());
    }

    #[tokio::test]
    async fn no_matches_is_empty_not_error() {
        let (_dir, store) = store().await;
        assert!(store.get_all_chunks("nothing_chunk_*").await.unwrap().is_empty());
        assert!(store.get_all_chunk_paths("nothing_chunk_*").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listed_paths_delete_cleanly() {
        let (_dir, store) = store().await;
        store.save_chunk("g_chunk_0.txt", Bytes::from_static(b"a")).await.unwrap();
        store.save_chunk("g_chunk_1.txt", Bytes::from_static(b"b")).await.unwrap();

        let paths = store.get_all_chunk_paths("g_chunk_*").await.unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("g_chunk_0.txt"));
        assert!(Path::new(&paths[0]).is_absolute());

        for path in &paths {
            store.delete_chunk(path).await.unwrap();
        }
        assert!(store.get_all_chunk_paths("g_chunk_*").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_accepts_bare_names() {
        let (_dir, store) = store().await;
        store.save_chunk("h_chunk_0.txt", Bytes::from_static(b"a")).await.unwrap();
        store.delete_chunk("h_chunk_0.txt").await.unwrap();
        assert!(!store.root().join("h_chunk_0.txt").exists());
    }

    #[tokio::test]
    async fn deleting_missing_file_is_io_error() {
        let (_dir, store) = store().await;
        let err = store.delete_chunk("ghost_chunk_0.txt").await.unwrap_err();
        assert!(matches!(err, FluxError::Io { .. }));
    }
}
