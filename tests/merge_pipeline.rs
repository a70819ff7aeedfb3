//! End-to-end tests for the merge pipeline over in-memory backends.
//!
//! These exercise the full stage sequence — validation, composition,
//! storage, persistence — and every abort path in between.

mod common;

use std::sync::Arc;

use pdfstitch::config::ServiceConfig;
use pdfstitch::error::StitchError;
use pdfstitch::pipeline::MergePipeline;
use pdfstitch::repository::{ArtifactRepository, MemoryArtifactRepository};
use pdfstitch::retrieval::RetrievalService;
use pdfstitch::store::{ArtifactStore, MemoryArtifactStore};

use common::{memory_pipeline, page_markers, tagged_pdf_bytes, upload};

#[tokio::test]
async fn test_merge_sums_page_counts() {
    let (pipeline, store, repository) = memory_pipeline();

    let receipt = pipeline
        .run(vec![
            upload("a.pdf", tagged_pdf_bytes(1, 3), 0),
            upload("b.pdf", tagged_pdf_bytes(2, 2), 1),
        ])
        .await
        .unwrap();

    assert_eq!(receipt.statistics.total_pages, 5);
    assert_eq!(receipt.statistics.files_merged, 2);
    assert_eq!(store.object_count().await, 1);
    assert_eq!(repository.record_count().await, 1);
}

#[tokio::test]
async fn test_persisted_size_matches_stored_bytes() {
    let (pipeline, store, _repository) = memory_pipeline();

    let receipt = pipeline
        .run(vec![
            upload("a.pdf", tagged_pdf_bytes(1, 1), 0),
            upload("b.pdf", tagged_pdf_bytes(2, 1), 1),
        ])
        .await
        .unwrap();

    let key = format!("merged/{}", receipt.record.filename);
    let stored = store.object(&key).await.expect("stored object exists");

    assert_eq!(receipt.record.size, stored.len() as u64);
    assert_eq!(receipt.record.url, format!("memory://{key}"));
}

#[tokio::test]
async fn test_merge_order_follows_order_index() {
    let (pipeline, store, _repository) = memory_pipeline();

    // A (3 pages) before B (2 pages)
    let receipt = pipeline
        .run(vec![
            upload("a.pdf", tagged_pdf_bytes(1, 3), 0),
            upload("b.pdf", tagged_pdf_bytes(2, 2), 1),
        ])
        .await
        .unwrap();

    let key = format!("merged/{}", receipt.record.filename);
    let stored = store.object(&key).await.unwrap();
    assert_eq!(page_markers(&stored), vec![101, 102, 103, 201, 202]);
}

#[tokio::test]
async fn test_merge_order_reversed_indices() {
    let (pipeline, store, _repository) = memory_pipeline();

    // Same inputs, B declared first
    let receipt = pipeline
        .run(vec![
            upload("a.pdf", tagged_pdf_bytes(1, 3), 1),
            upload("b.pdf", tagged_pdf_bytes(2, 2), 0),
        ])
        .await
        .unwrap();

    let key = format!("merged/{}", receipt.record.filename);
    let stored = store.object(&key).await.unwrap();
    assert_eq!(page_markers(&stored), vec![201, 202, 101, 102, 103]);
}

#[tokio::test]
async fn test_too_few_files_touches_no_backend() {
    let (pipeline, store, repository) = memory_pipeline();

    let result = pipeline
        .run(vec![upload("only.pdf", tagged_pdf_bytes(1, 1), 0)])
        .await;

    assert!(matches!(result, Err(StitchError::TooFewFiles { .. })));
    assert_eq!(store.object_count().await, 0);
    assert_eq!(repository.record_count().await, 0);
}

#[tokio::test]
async fn test_corrupt_source_aborts_atomically() {
    let (pipeline, store, repository) = memory_pipeline();

    let result = pipeline
        .run(vec![
            upload("a.pdf", tagged_pdf_bytes(1, 2), 0),
            upload("b.pdf", b"definitely not a pdf".to_vec(), 1),
        ])
        .await;

    match result.unwrap_err() {
        StitchError::Parse { filename, .. } => assert_eq!(filename, "b.pdf"),
        other => panic!("expected Parse error, got {other:?}"),
    }

    // Atomicity: nothing stored, nothing recorded, nothing listed.
    assert_eq!(store.object_count().await, 0);
    assert_eq!(repository.record_count().await, 0);
    let listing = repository.list().await.unwrap();
    assert!(listing.is_empty());
}

#[tokio::test]
async fn test_store_failure_prevents_record() {
    let store = Arc::new(MemoryArtifactStore::failing());
    let repository = Arc::new(MemoryArtifactRepository::new());
    let pipeline = MergePipeline::new(
        &ServiceConfig::default(),
        store.clone() as Arc<dyn ArtifactStore>,
        repository.clone() as Arc<dyn ArtifactRepository>,
    );

    let result = pipeline
        .run(vec![
            upload("a.pdf", tagged_pdf_bytes(1, 1), 0),
            upload("b.pdf", tagged_pdf_bytes(2, 1), 1),
        ])
        .await;

    assert!(matches!(result, Err(StitchError::Storage { .. })));
    assert_eq!(repository.record_count().await, 0);
}

#[tokio::test]
async fn test_insert_failure_surfaces_dangling_artifact() {
    let store = Arc::new(MemoryArtifactStore::new());
    let repository = Arc::new(MemoryArtifactRepository::failing_inserts());
    let pipeline = MergePipeline::new(
        &ServiceConfig::default(),
        store.clone() as Arc<dyn ArtifactStore>,
        repository.clone() as Arc<dyn ArtifactRepository>,
    );

    let result = pipeline
        .run(vec![
            upload("a.pdf", tagged_pdf_bytes(1, 1), 0),
            upload("b.pdf", tagged_pdf_bytes(2, 1), 1),
        ])
        .await;

    let err = result.unwrap_err();
    assert!(err.is_partial_failure());
    match &err {
        StitchError::DanglingArtifact { filename, url, .. } => {
            // The blob exists under exactly the reported location.
            let key = format!("merged/{filename}");
            assert_eq!(url, &format!("memory://{key}"));
            assert!(store.object(&key).await.is_some());
        }
        other => panic!("expected DanglingArtifact, got {other:?}"),
    }

    // But no record is discoverable.
    assert_eq!(repository.record_count().await, 0);
}

#[tokio::test]
async fn test_retrieval_round_trip() {
    let (pipeline, _store, repository) = memory_pipeline();
    let retrieval = RetrievalService::new(repository.clone() as Arc<dyn ArtifactRepository>);

    let receipt = pipeline
        .run(vec![
            upload("a.pdf", tagged_pdf_bytes(1, 1), 0),
            upload("b.pdf", tagged_pdf_bytes(2, 1), 1),
        ])
        .await
        .unwrap();

    let fetched = retrieval.retrieve(receipt.record.id).await.unwrap();
    assert_eq!(fetched.filename, receipt.record.filename);
    assert_eq!(fetched.url, receipt.record.url);
    assert_eq!(fetched.size, receipt.record.size);

    let unknown = retrieval.retrieve(uuid::Uuid::new_v4()).await;
    assert!(matches!(unknown, Err(StitchError::NotFound { .. })));
}

#[tokio::test]
async fn test_listing_is_most_recent_first() {
    let (pipeline, _store, repository) = memory_pipeline();
    let retrieval = RetrievalService::new(repository.clone() as Arc<dyn ArtifactRepository>);

    let first = pipeline
        .run(vec![
            upload("a.pdf", tagged_pdf_bytes(1, 1), 0),
            upload("b.pdf", tagged_pdf_bytes(2, 1), 1),
        ])
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = pipeline
        .run(vec![
            upload("c.pdf", tagged_pdf_bytes(3, 1), 0),
            upload("d.pdf", tagged_pdf_bytes(4, 1), 1),
        ])
        .await
        .unwrap();

    let records = retrieval.list_all().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, second.record.id);
    assert_eq!(records[1].id, first.record.id);
}

#[tokio::test]
async fn test_twenty_file_request_merges() {
    let (pipeline, _store, repository) = memory_pipeline();

    let files = (0..20u32)
        .map(|i| upload(&format!("f{i}.pdf"), tagged_pdf_bytes(i as i64 + 1, 1), i))
        .collect();

    let receipt = pipeline.run(files).await.unwrap();
    assert_eq!(receipt.statistics.total_pages, 20);
    assert_eq!(repository.record_count().await, 1);
}
