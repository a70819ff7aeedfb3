//! Artifact store clients.
//!
//! The merge pipeline hands the composed artifact to a [`ArtifactStore`]
//! and receives a retrieval URL back. Backends are swappable: production
//! uses an S3-compatible bucket, tests use an in-memory map.

pub mod memory;
pub mod s3;

pub use memory::MemoryArtifactStore;
pub use s3::S3ArtifactStore;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while writing to the artifact store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage write did not complete: {reason}")]
    WriteFailed { reason: String },

    #[error("storage backend error: {source}")]
    Backend {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StoreError {
    /// Create a write-failed error.
    pub fn write_failed<S: Into<String>>(reason: S) -> Self {
        Self::WriteFailed {
            reason: reason.into(),
        }
    }

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

/// A durably stored artifact.
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    /// Object key within the bucket or namespace.
    pub key: String,

    /// Public retrieval URL for the stored bytes.
    pub url: String,

    /// Number of bytes written.
    pub size: u64,
}

/// Durable byte-blob storage for merged artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store the artifact bytes under the given filename.
    ///
    /// Consumes the buffer; after a successful return the store owns the
    /// durable copy and the pipeline retains no reference.
    async fn store(&self, filename: &str, bytes: Bytes) -> StoreResult<StoredArtifact>;
}

/// Object key for a merged artifact: the `merged/` prefix groups outputs
/// apart from any other bucket content.
pub(crate) fn object_key(filename: &str) -> String {
    format!("merged/{filename}")
}
