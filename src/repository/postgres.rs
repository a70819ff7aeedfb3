//! PostgreSQL metadata repository adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    ArtifactRecord, ArtifactRepository, NewArtifact, RepositoryError, RepositoryResult,
};

/// Row shape of the `merged_artifacts` table.
#[derive(Debug, sqlx::FromRow)]
struct ArtifactRow {
    id: Uuid,
    filename: String,
    url: String,
    size: i64,
    created_at: DateTime<Utc>,
}

impl From<ArtifactRow> for ArtifactRecord {
    fn from(row: ArtifactRow) -> Self {
        Self {
            id: row.id,
            filename: row.filename,
            url: row.url,
            size: row.size.max(0) as u64,
            created_at: row.created_at,
        }
    }
}

/// Metadata repository backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgArtifactRepository {
    pool: PgPool,
}

impl PgArtifactRepository {
    /// Create a repository over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database with a small pool.
    pub async fn connect(database_url: &str) -> RepositoryResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(RepositoryError::backend)?;

        Ok(Self::new(pool))
    }

    /// Create the record table if it does not exist yet.
    pub async fn ensure_schema(&self) -> RepositoryResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS merged_artifacts (
                id UUID PRIMARY KEY,
                filename TEXT NOT NULL,
                url TEXT NOT NULL,
                size BIGINT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::backend)?;

        Ok(())
    }
}

#[async_trait]
impl ArtifactRepository for PgArtifactRepository {
    async fn insert(&self, new: NewArtifact) -> RepositoryResult<ArtifactRecord> {
        let row: ArtifactRow = sqlx::query_as(
            "INSERT INTO merged_artifacts (id, filename, url, size, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, filename, url, size, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&new.filename)
        .bind(&new.url)
        .bind(new.size as i64)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::backend)?;

        Ok(row.into())
    }

    async fn get(&self, id: Uuid) -> RepositoryResult<ArtifactRecord> {
        let row: Option<ArtifactRow> = sqlx::query_as(
            "SELECT id, filename, url, size, created_at
             FROM merged_artifacts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::backend)?;

        row.map(Into::into)
            .ok_or(RepositoryError::NotFound { id })
    }

    async fn list(&self) -> RepositoryResult<Vec<ArtifactRecord>> {
        let rows: Vec<ArtifactRow> = sqlx::query_as(
            "SELECT id, filename, url, size, created_at
             FROM merged_artifacts ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::backend)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
