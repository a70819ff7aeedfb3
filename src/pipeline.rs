//! Merge request orchestration.
//!
//! One [`MergePipeline::run`] call carries a request through the full
//! stage sequence: `Received → Validated → Composing → Stored → Persisted
//! → Completed`. Any failure aborts forward progress; no stage is
//! re-entered and no retries are attempted. Each request is an independent
//! pipeline instance; the store and repository handles are shared
//! immutably.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::compose::{ComposeStats, Composer};
use crate::config::ServiceConfig;
use crate::error::{Result, StitchError};
use crate::receiver::{UploadReceiver, UploadedFile};
use crate::repository::{ArtifactRecord, ArtifactRepository, NewArtifact};
use crate::store::ArtifactStore;

/// Stages a merge request moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Validated,
    Composing,
    Stored,
    Persisted,
    Completed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::Composing => "composing",
            Self::Stored => "stored",
            Self::Persisted => "persisted",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Outcome of a completed merge request.
#[derive(Debug)]
pub struct MergeReceipt {
    /// The persisted artifact record.
    pub record: ArtifactRecord,

    /// Statistics from the compose stage.
    pub statistics: ComposeStats,
}

/// Per-request merge orchestrator.
///
/// Carries configuration and backend handles explicitly so concurrent
/// requests share no mutable state.
pub struct MergePipeline {
    receiver: UploadReceiver,
    composer: Composer,
    store: Arc<dyn ArtifactStore>,
    repository: Arc<dyn ArtifactRepository>,
}

impl MergePipeline {
    /// Build a pipeline from configuration and backend handles.
    pub fn new(
        config: &ServiceConfig,
        store: Arc<dyn ArtifactStore>,
        repository: Arc<dyn ArtifactRepository>,
    ) -> Self {
        Self {
            receiver: UploadReceiver::new(config.limits.clone()),
            composer: Composer::new(config.effective_parse_jobs()),
            store,
            repository,
        }
    }

    /// Run one merge request to completion.
    ///
    /// # Errors
    ///
    /// Propagates the first failing stage's error. Validation failures
    /// never reach the composer; parse and composition failures never
    /// reach the store; a store failure prevents any insert. An insert
    /// failure after a successful store is surfaced as
    /// [`StitchError::DanglingArtifact`].
    pub async fn run(&self, candidates: Vec<UploadedFile>) -> Result<MergeReceipt> {
        info!(stage = %Stage::Received, files = candidates.len(), "merge request received");

        let request = self.receiver.accept(candidates)?;
        info!(stage = %Stage::Validated, files = request.len(), "upload set validated");

        info!(stage = %Stage::Composing, "composing output document");
        let composed = self.composer.compose(request).await?;
        let artifact = composed.artifact;
        let statistics = composed.statistics;

        let filename = artifact.filename.clone();
        let size = artifact.size;
        let stored = self.store.store(&filename, artifact.bytes).await?;
        info!(stage = %Stage::Stored, %filename, size, "artifact stored");

        let record = self
            .repository
            .insert(NewArtifact {
                filename: filename.clone(),
                url: stored.url.clone(),
                size,
            })
            .await
            .map_err(|e| {
                warn!(%filename, "artifact stored but record insert failed");
                StitchError::dangling_artifact(&filename, &stored.url, e.to_string())
            })?;
        info!(stage = %Stage::Persisted, id = %record.id, "record persisted");

        info!(
            stage = %Stage::Completed,
            id = %record.id,
            pages = statistics.total_pages,
            "merge completed"
        );
        Ok(MergeReceipt { record, statistics })
    }
}
