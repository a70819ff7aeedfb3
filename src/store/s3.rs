//! S3-compatible artifact store adapter.
//!
//! Works against AWS S3 or any S3-compatible endpoint (the original
//! deployment served a hosted bucket with public object URLs). Objects are
//! written under the `merged/` prefix with the PDF content type and an
//! hour of cache control.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;

use super::{object_key, ArtifactStore, StoreError, StoreResult, StoredArtifact};

/// Artifact store backed by an S3-compatible bucket.
pub struct S3ArtifactStore {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3ArtifactStore {
    /// Create a store over an existing client.
    ///
    /// `public_base_url` is the externally reachable base under which
    /// object keys resolve; the retrieval URL is `<base>/<key>`.
    pub fn new(
        client: Client,
        bucket: impl Into<String>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Connect using ambient credentials, optionally against a custom
    /// endpoint.
    ///
    /// Path-style addressing is forced when an endpoint is supplied, which
    /// is what most S3-compatible services expect.
    pub async fn connect(
        bucket: impl Into<String>,
        endpoint: Option<&str>,
        public_base_url: impl Into<String>,
    ) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(endpoint) = endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if endpoint.is_some() {
            builder = builder.force_path_style(true);
        }
        let client = Client::from_conf(builder.build());

        Self::new(client, bucket, public_base_url)
    }

    /// Build the public retrieval URL for an object key.
    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn store(&self, filename: &str, bytes: Bytes) -> StoreResult<StoredArtifact> {
        let key = object_key(filename);
        let size = bytes.len() as u64;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type("application/pdf")
            .cache_control("max-age=3600")
            .body(ByteStream::from(bytes.to_vec()))
            .send()
            .await
            .map_err(StoreError::backend)?;

        let url = self.public_url(&key);
        Ok(StoredArtifact { key, url, size })
    }
}
