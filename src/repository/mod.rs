//! Metadata repository clients.
//!
//! Persists one [`ArtifactRecord`] per successful merge and answers
//! point lookups and most-recent-first listings. Backends are swappable:
//! production uses PostgreSQL, tests use an in-memory vector.

pub mod memory;
pub mod postgres;

pub use memory::MemoryArtifactRepository;
pub use postgres::PgArtifactRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur while reading or writing artifact records.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("no artifact record for id {id}")]
    NotFound { id: Uuid },

    #[error("repository backend error: {source}")]
    Backend {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl RepositoryError {
    /// Create a backend error from any error type.
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            source: Box::new(error),
        }
    }
}

/// Fields of a record about to be created.
#[derive(Debug, Clone)]
pub struct NewArtifact {
    /// Filename the artifact was stored under.
    pub filename: String,

    /// Retrieval URL of the stored bytes.
    pub url: String,

    /// Exact byte length of the stored artifact.
    pub size: u64,
}

/// A persisted artifact record.
///
/// Created exactly once per successful merge and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    /// Opaque unique identifier.
    pub id: Uuid,

    /// Filename the artifact was stored under.
    pub filename: String,

    /// Retrieval URL of the stored bytes.
    pub url: String,

    /// Exact byte length of the stored artifact.
    pub size: u64,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Store of artifact records, queryable by identifier and listable by
/// creation time.
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    /// Create exactly one record for a stored artifact.
    async fn insert(&self, new: NewArtifact) -> RepositoryResult<ArtifactRecord>;

    /// Fetch a record by identifier.
    async fn get(&self, id: Uuid) -> RepositoryResult<ArtifactRecord>;

    /// List all records, most recent first.
    async fn list(&self) -> RepositoryResult<Vec<ArtifactRecord>>;
}
