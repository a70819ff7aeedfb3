//! pdfstitchd - Merge uploaded PDF documents into a single durable artifact.
//!
//! Service binary: wires the S3-compatible artifact store and the
//! PostgreSQL metadata repository from environment configuration and
//! serves the HTTP surface.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pdfstitch::config::{ServiceArgs, ServiceConfig};
use pdfstitch::repository::PgArtifactRepository;
use pdfstitch::server::{serve, AppState};
use pdfstitch::store::S3ArtifactStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = ServiceArgs::parse();
    let config = ServiceConfig::from_args(&args)?;

    info!("{} v{}", pdfstitch::NAME, pdfstitch::VERSION);

    let store = S3ArtifactStore::connect(
        &args.storage_bucket,
        args.storage_endpoint.as_deref(),
        &args.storage_public_url,
    )
    .await;

    let repository = PgArtifactRepository::connect(&args.database_url)
        .await
        .context("failed to connect to the metadata repository")?;
    repository
        .ensure_schema()
        .await
        .context("failed to prepare the metadata schema")?;

    let state = AppState::new(&config, Arc::new(store), Arc::new(repository));

    serve(state, config.port).await
}
