//! HTTP surface for pdfstitch.
//!
//! Three routes over the core services:
//! - `POST /merge` — multipart upload, one part per file, part names
//!   `files[<order>]` carrying the caller-declared order index
//! - `GET /artifacts/{id}` — one artifact record
//! - `GET /artifacts` — all records, most recent first
//!
//! Errors render as JSON bodies with a stable `code` and a human-readable
//! `message`; the dangling-artifact partial failure additionally carries
//! the stored filename and URL.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::error::{Result, StitchError};
use crate::pipeline::MergePipeline;
use crate::receiver::UploadedFile;
use crate::repository::{ArtifactRecord, ArtifactRepository};
use crate::retrieval::RetrievalService;
use crate::store::ArtifactStore;

/// Shared per-process state; everything request-scoped lives inside the
/// pipeline call.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<MergePipeline>,
    retrieval: RetrievalService,
    body_limit: usize,
}

impl AppState {
    /// Wire the application state from configuration and backend handles.
    pub fn new(
        config: &ServiceConfig,
        store: Arc<dyn ArtifactStore>,
        repository: Arc<dyn ArtifactRepository>,
    ) -> Self {
        Self {
            pipeline: Arc::new(MergePipeline::new(config, store, Arc::clone(&repository))),
            retrieval: RetrievalService::new(repository),
            body_limit: config.max_request_bytes(),
        }
    }
}

/// Success body of `POST /merge`.
#[derive(Debug, Serialize)]
pub struct MergeResponse {
    pub id: Uuid,
    pub filename: String,
    pub url: String,
    pub size: u64,
}

impl From<ArtifactRecord> for MergeResponse {
    fn from(record: ArtifactRecord) -> Self {
        Self {
            id: record.id,
            filename: record.filename,
            url: record.url,
            size: record.size,
        }
    }
}

impl IntoResponse for StitchError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut body = json!({
            "code": self.error_code(),
            "message": self.to_string(),
        });

        // Partial failure: the blob exists, hand the caller what it needs
        // to recover it.
        if let Self::DanglingArtifact { filename, url, .. } = &self {
            body["filename"] = json!(filename);
            body["url"] = json!(url);
        }

        (status, Json(body)).into_response()
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.body_limit;

    Router::new()
        .route("/merge", post(merge))
        .route("/artifacts", get(list_artifacts))
        .route("/artifacts/{id}", get(get_artifact))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

/// Bind and serve the router until shutdown.
pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "pdfstitch listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn merge(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MergeResponse>> {
    let files = collect_files(&mut multipart).await?;
    let receipt = state.pipeline.run(files).await?;
    Ok(Json(receipt.record.into()))
}

async fn get_artifact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ArtifactRecord>> {
    // An identifier that is not a UUID cannot name any record.
    let uuid = Uuid::parse_str(&id).map_err(|_| StitchError::not_found(&id))?;
    let record = state.retrieval.retrieve(uuid).await?;
    Ok(Json(record))
}

async fn list_artifacts(State(state): State<AppState>) -> Result<Json<Vec<ArtifactRecord>>> {
    let records = state.retrieval.list_all().await?;
    Ok(Json(records))
}

/// Drain the multipart body into uploaded files.
///
/// Every part must be named `files[<order>]`; anything else is a
/// malformed upload. Buffers are owned by the returned files and travel
/// into the pipeline.
async fn collect_files(multipart: &mut Multipart) -> Result<Vec<UploadedFile>> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| StitchError::malformed_upload(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        let Some(index) = order_index_from_name(&name) else {
            return Err(StitchError::malformed_upload(format!(
                "unexpected field '{name}'; file parts must be named files[<order>]"
            )));
        };

        let display_name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("upload-{index}.pdf"));

        let media_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let content = field.bytes().await.map_err(|e| {
            StitchError::malformed_upload(format!("failed to read part '{name}': {e}"))
        })?;

        files.push(UploadedFile::new(content, media_type, display_name, index));
    }

    Ok(files)
}

/// Extract the order index from a part name like `files[3]`.
fn order_index_from_name(name: &str) -> Option<u32> {
    name.strip_prefix("files[")?
        .strip_suffix(']')?
        .parse()
        .ok()
}
