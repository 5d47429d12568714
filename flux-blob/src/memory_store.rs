use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use parking_lot::RwLock;

use crate::naming::order_by_chunk_index;
use crate::{ChunkPattern, ChunkStore, FluxError, FluxResult};

/// In-memory chunk store for tests and embedded use
#[derive(Debug, Default)]
pub struct MemoryChunkStore {
    blobs: RwLock<BTreeMap<String, Bytes>>,
}

impl MemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of a stored blob
    pub fn get(&self, name: &str) -> Option<Bytes> {
        self.blobs.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.blobs.read().contains_key(name)
    }

    /// All stored names in lexical order
    pub fn names(&self) -> Vec<String> {
        self.blobs.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }

    fn matching_names(&self, pattern: &str) -> Vec<String> {
        let pattern = ChunkPattern::new(pattern);
        let mut names: Vec<String> = self
            .blobs
            .read()
            .keys()
            .filter(|name| pattern.matches(name))
            .cloned()
            .collect();
        order_by_chunk_index(&mut names);
        names
    }
}

#[async_trait]
impl ChunkStore for MemoryChunkStore {
    async fn save_chunk(&self, name: &str, bytes: Bytes) -> FluxResult<String> {
        self.blobs.write().insert(name.to_string(), bytes);
        Ok(name.to_string())
    }

    async fn get_all_chunks(&self, pattern: &str) -> FluxResult<Bytes> {
        let names = self.matching_names(pattern);
        let blobs = self.blobs.read();
        let mut combined = BytesMut::new();
        for name in &names {
            if let Some(bytes) = blobs.get(name) {
                combined.extend_from_slice(bytes);
            }
        }
        Ok(combined.freeze())
    }

    async fn get_all_chunk_paths(&self, pattern: &str) -> FluxResult<Vec<String>> {
        Ok(self.matching_names(pattern))
    }

    async fn delete_chunk(&self, path: &str) -> FluxResult<()> {
        match self.blobs.write().remove(path) {
            Some(_) => Ok(()),
            None => Err(FluxError::not_found(path)),
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pattern_selects_only_that_uploads_chunks() {
        let store = MemoryChunkStore::new();
        store.save_chunk("a_chunk_1.txt", Bytes::from_static(b"B")).await.unwrap();
        store.save_chunk("a_chunk_0.txt", Bytes::from_static(b"A")).await.unwrap();
        store.save_chunk("ab_chunk_0.txt", Bytes::from_static(b"X")).await.unwrap();
        store.save_chunk("a.txt", Bytes::from_static(b"final")).await.unwrap();

        assert_eq!(store.get_all_chunks("a_chunk_*").await.unwrap().as_ref(), b"AB");
        assert_eq!(
            store.get_all_chunk_paths("a_chunk_*").await.unwrap(),
            vec!["a_chunk_0.txt", "a_chunk_1.txt"]
        );
    }

    #[tokio::test]
    async fn listing_is_numeric() {
        let store = MemoryChunkStore::new();
        for i in 0..11u8 {
            store
                .save_chunk(&format!("n_chunk_{i}.bin"), Bytes::from(vec![i]))
                .await
                .unwrap();
        }
        let paths = store.get_all_chunk_paths("n_chunk_*").await.unwrap();
        assert_eq!(paths[2], "n_chunk_2.bin");
        assert_eq!(paths[10], "n_chunk_10.bin");
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let store = MemoryChunkStore::new();
        let err = store.delete_chunk("nope_chunk_0.bin").await.unwrap_err();
        assert!(matches!(err, FluxError::NotFound { ref name } if name == "nope_chunk_0.bin"));
    }
}
