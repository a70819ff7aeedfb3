//! Artifact retrieval service.
//!
//! Read-only access to previously created artifacts; reads independently
//! from the metadata repository and never touches the artifact store.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::Result;
use crate::repository::{ArtifactRecord, ArtifactRepository};

/// Read-side facade over the metadata repository.
#[derive(Clone)]
pub struct RetrievalService {
    repository: Arc<dyn ArtifactRepository>,
}

impl RetrievalService {
    /// Create a retrieval service over a repository handle.
    pub fn new(repository: Arc<dyn ArtifactRepository>) -> Self {
        Self { repository }
    }

    /// Fetch the record for an artifact identifier.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StitchError::NotFound`] if no record exists for
    /// the identifier, or a repository error on backend failure.
    pub async fn retrieve(&self, id: Uuid) -> Result<ArtifactRecord> {
        Ok(self.repository.get(id).await?)
    }

    /// List all artifact records, most recent first.
    pub async fn list_all(&self) -> Result<Vec<ArtifactRecord>> {
        Ok(self.repository.list().await?)
    }
}
