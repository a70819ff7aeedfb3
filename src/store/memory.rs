//! In-memory artifact store.
//!
//! Backs tests and local development; also supports write-failure
//! injection so the pipeline's storage-failure path can be exercised.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;

use super::{object_key, ArtifactStore, StoreError, StoreResult, StoredArtifact};

/// Artifact store holding objects in a process-local map.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    objects: Mutex<HashMap<String, Bytes>>,
    fail_writes: bool,
}

impl MemoryArtifactStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose every write fails.
    pub fn failing() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            fail_writes: true,
        }
    }

    /// Fetch a stored object by key.
    pub async fn object(&self, key: &str) -> Option<Bytes> {
        self.objects.lock().await.get(key).cloned()
    }

    /// Number of stored objects.
    pub async fn object_count(&self) -> usize {
        self.objects.lock().await.len()
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn store(&self, filename: &str, bytes: Bytes) -> StoreResult<StoredArtifact> {
        if self.fail_writes {
            return Err(StoreError::write_failed("memory store configured to fail"));
        }

        let key = object_key(filename);
        let size = bytes.len() as u64;
        let url = format!("memory://{key}");

        self.objects.lock().await.insert(key.clone(), bytes);

        Ok(StoredArtifact { key, url, size })
    }
}
