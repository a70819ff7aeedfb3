//! In-memory metadata repository.
//!
//! Backs tests and local development; also supports insert-failure
//! injection so the dangling-artifact path can be exercised.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    ArtifactRecord, ArtifactRepository, NewArtifact, RepositoryError, RepositoryResult,
};

/// Metadata repository holding records in a process-local vector.
#[derive(Debug, Default)]
pub struct MemoryArtifactRepository {
    records: Mutex<Vec<ArtifactRecord>>,
    fail_inserts: bool,
}

impl MemoryArtifactRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository whose every insert fails.
    pub fn failing_inserts() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail_inserts: true,
        }
    }

    /// Number of stored records.
    pub async fn record_count(&self) -> usize {
        self.records.lock().await.len()
    }
}

#[async_trait]
impl ArtifactRepository for MemoryArtifactRepository {
    async fn insert(&self, new: NewArtifact) -> RepositoryResult<ArtifactRecord> {
        if self.fail_inserts {
            return Err(RepositoryError::backend(std::io::Error::other(
                "memory repository configured to fail inserts",
            )));
        }

        let record = ArtifactRecord {
            id: Uuid::new_v4(),
            filename: new.filename,
            url: new.url,
            size: new.size,
            created_at: Utc::now(),
        };

        self.records.lock().await.push(record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> RepositoryResult<ArtifactRecord> {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound { id })
    }

    async fn list(&self) -> RepositoryResult<Vec<ArtifactRecord>> {
        let mut records = self.records.lock().await.clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}
