//! Shared helpers for the integration tests.
//!
//! PDF fixtures are built in memory: page `p` of a document tagged `t`
//! carries a MediaBox width of `t * 100 + p`, so the page order of a
//! merged output can be read back and asserted exactly.

#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;
use lopdf::{dictionary, Document, Object};

use pdfstitch::config::ServiceConfig;
use pdfstitch::pipeline::MergePipeline;
use pdfstitch::receiver::UploadedFile;
use pdfstitch::repository::{ArtifactRepository, MemoryArtifactRepository};
use pdfstitch::store::{ArtifactStore, MemoryArtifactStore};

/// Build a PDF with `pages` pages whose MediaBox widths encode
/// `tag * 100 + page_number`.
pub fn tagged_pdf_bytes(tag: i64, pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (1..=pages as i64)
        .map(|p| {
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), (tag * 100 + p).into(), 792.into()],
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Read back the MediaBox width markers of a PDF, in page order.
pub fn page_markers(bytes: &[u8]) -> Vec<i64> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let dict = doc.get_object(page_id).unwrap().as_dict().unwrap();
            let arr = dict.get(b"MediaBox").unwrap().as_array().unwrap();
            arr[2].as_i64().unwrap()
        })
        .collect()
}

/// An uploaded PDF file with the given order index.
pub fn upload(name: &str, content: Vec<u8>, index: u32) -> UploadedFile {
    UploadedFile::new(Bytes::from(content), "application/pdf", name, index)
}

/// A pipeline over fresh in-memory backends, returned alongside the
/// backend handles for white-box assertions.
pub fn memory_pipeline() -> (
    MergePipeline,
    Arc<MemoryArtifactStore>,
    Arc<MemoryArtifactRepository>,
) {
    let store = Arc::new(MemoryArtifactStore::new());
    let repository = Arc::new(MemoryArtifactRepository::new());
    let pipeline = MergePipeline::new(
        &ServiceConfig::default(),
        store.clone() as Arc<dyn ArtifactStore>,
        repository.clone() as Arc<dyn ArtifactRepository>,
    );
    (pipeline, store, repository)
}
