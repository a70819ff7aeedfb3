//! Core document merge implementation.
//!
//! This module implements the merge algorithm that concatenates multiple
//! parsed PDF documents into a single output document, preserving each
//! source's internal page order.

use std::time::{Duration, Instant};

use bytes::Bytes;
use chrono::Utc;
use lopdf::{Document, Object, ObjectId};

use crate::error::{Result, StitchError};
use crate::io::{serialize_document, DocumentReader, ParsedSource};
use crate::receiver::MergeRequest;

/// Statistics about a compose operation.
#[derive(Debug, Clone)]
pub struct ComposeStats {
    /// Number of source documents merged.
    pub files_merged: usize,

    /// Total number of pages in the output.
    pub total_pages: usize,

    /// Combined size of the source uploads in bytes.
    pub input_bytes: u64,

    /// Time spent parsing sources.
    pub parse_time: Duration,

    /// Total time for the compose operation.
    pub compose_time: Duration,
}

/// The composed output artifact.
///
/// Exists only if every source parsed and serialization succeeded; a
/// failed compose produces no artifact at all.
#[derive(Debug, Clone)]
pub struct MergedArtifact {
    /// The concatenated document bytes.
    pub bytes: Bytes,

    /// Derived output filename.
    pub filename: String,

    /// Total page count (sum of source page counts).
    pub page_count: usize,

    /// Size of the serialized output in bytes.
    pub size: u64,
}

/// Result of a compose operation.
#[derive(Debug)]
pub struct ComposeResult {
    /// The composed artifact.
    pub artifact: MergedArtifact,

    /// Statistics about the compose.
    pub statistics: ComposeStats,
}

/// Merge engine that concatenates validated upload sets.
pub struct Composer {
    /// Parser for source buffers.
    reader: DocumentReader,

    /// Number of parallel parse workers.
    parse_jobs: usize,
}

impl Composer {
    /// Create a composer with the given parse worker count.
    pub fn new(parse_jobs: usize) -> Self {
        Self {
            reader: DocumentReader::new(),
            parse_jobs: parse_jobs.max(1),
        }
    }

    /// Compose a normalized merge request into a single artifact.
    ///
    /// Sources are parsed (possibly concurrently), concatenated in
    /// ascending order-index order with each source's internal page order
    /// unchanged, then serialized once. Any parse failure aborts the whole
    /// operation before an artifact exists.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Any source fails to parse ([`StitchError::Parse`])
    /// - Page-tree stitching or serialization fails
    ///   ([`StitchError::Composition`])
    pub async fn compose(&self, request: MergeRequest) -> Result<ComposeResult> {
        let compose_start = Instant::now();

        let parse_start = Instant::now();
        let sources = self
            .reader
            .parse_all(request.into_files(), self.parse_jobs)
            .await?;
        let parse_time = parse_start.elapsed();

        let files_merged = sources.len();
        let input_bytes: u64 = sources.iter().map(|s| s.byte_size).sum();

        let merged = Self::append_documents(sources)?;
        let total_pages = merged.get_pages().len();

        let bytes = serialize_document(merged).await?;
        let size = bytes.len() as u64;

        let artifact = MergedArtifact {
            bytes: Bytes::from(bytes),
            filename: derived_filename(),
            page_count: total_pages,
            size,
        };

        Ok(ComposeResult {
            artifact,
            statistics: ComposeStats {
                files_merged,
                total_pages,
                input_bytes,
                parse_time,
                compose_time: compose_start.elapsed(),
            },
        })
    }

    /// Concatenate parsed sources into one document.
    ///
    /// Sources must already be in ascending order-index order; the first
    /// document becomes the base and every subsequent document's pages are
    /// appended to its page tree.
    fn append_documents(sources: Vec<ParsedSource>) -> Result<Document> {
        let mut iter = sources.into_iter();
        let first = iter
            .next()
            .ok_or_else(|| StitchError::composition_failed("no sources to merge"))?;

        let mut merged = first.document;
        let mut max_id = merged.max_id;

        for source in iter {
            let mut doc = source.document;

            // Renumber objects to avoid ID conflicts
            doc.renumber_objects_with(max_id + 1);
            max_id = doc.max_id;

            // Page references, in the source's internal order
            let doc_pages: Vec<ObjectId> = doc.get_pages().into_values().collect();

            merged.objects.extend(doc.objects);

            Self::append_pages_to_tree(&mut merged, &doc_pages)?;
        }

        Ok(merged)
    }

    /// Append pages to the merged document's page tree.
    fn append_pages_to_tree(merged: &mut Document, page_ids: &[ObjectId]) -> Result<()> {
        let catalog = merged.catalog_mut().map_err(|e| {
            StitchError::composition_failed(format!("failed to get catalog: {e}"))
        })?;

        let pages_id = catalog
            .get(b"Pages")
            .and_then(|p| p.as_reference())
            .map_err(|e| {
                StitchError::composition_failed(format!("failed to get pages reference: {e}"))
            })?;

        let pages_dict = merged.get_object_mut(pages_id).map_err(|e| {
            StitchError::composition_failed(format!("failed to get pages object: {e}"))
        })?;

        if let Object::Dictionary(dict) = pages_dict {
            let kids = dict.get_mut(b"Kids").map_err(|_| {
                StitchError::composition_failed("pages dictionary missing Kids array")
            })?;

            if let Object::Array(kids_array) = kids {
                for &page_id in page_ids {
                    kids_array.push(Object::Reference(page_id));
                }
            } else {
                return Err(StitchError::composition_failed("Kids is not an array"));
            }

            let current_count = dict.get(b"Count").and_then(|c| c.as_i64()).unwrap_or(0);
            dict.set("Count", Object::Integer(current_count + page_ids.len() as i64));
        } else {
            return Err(StitchError::composition_failed(
                "pages object is not a dictionary",
            ));
        }

        Ok(())
    }
}

/// Derive the output filename from the current time, millisecond
/// resolution.
fn derived_filename() -> String {
    format!("merged-{}.pdf", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MergeLimits;
    use crate::receiver::{UploadReceiver, UploadedFile};
    use lopdf::dictionary;

    /// Build a PDF whose pages carry distinguishable MediaBox widths:
    /// page `p` of document `tag` gets width `tag * 100 + p`.
    fn tagged_pdf_bytes(tag: i64, pages: usize) -> Vec<u8> {
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

    fn upload(name: &str, content: Vec<u8>, index: u32) -> UploadedFile {
        UploadedFile::new(Bytes::from(content), "application/pdf", name, index)
    }

    fn request(files: Vec<UploadedFile>) -> MergeRequest {
        UploadReceiver::new(MergeLimits::default())
            .accept(files)
            .unwrap()
    }

    /// Read back the MediaBox width markers of the merged output, in page
    /// order.
    fn page_markers(bytes: &[u8]) -> Vec<i64> {
        let doc = Document::load_mem(bytes).unwrap();
        let pages = doc.get_pages();
        pages
            .values()
            .map(|&page_id| {
                let page = doc.get_object(page_id).unwrap();
                let dict = page.as_dict().unwrap();
                let mediabox = dict.get(b"MediaBox").unwrap();
                let arr = mediabox.as_array().unwrap();
                arr[2].as_i64().unwrap()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_compose_sums_page_counts() {
        let composer = Composer::new(2);
        let result = composer
            .compose(request(vec![
                upload("a.pdf", tagged_pdf_bytes(1, 3), 0),
                upload("b.pdf", tagged_pdf_bytes(2, 2), 1),
            ]))
            .await
            .unwrap();

        assert_eq!(result.artifact.page_count, 5);
        assert_eq!(result.statistics.files_merged, 2);
        assert_eq!(result.statistics.total_pages, 5);
        assert_eq!(result.artifact.size, result.artifact.bytes.len() as u64);
        assert!(result.artifact.filename.starts_with("merged-"));
        assert!(result.artifact.filename.ends_with(".pdf"));
    }

    #[tokio::test]
    async fn test_compose_preserves_declared_order() {
        let composer = Composer::new(2);

        // A (3 pages) then B (2 pages)
        let forward = composer
            .compose(request(vec![
                upload("a.pdf", tagged_pdf_bytes(1, 3), 0),
                upload("b.pdf", tagged_pdf_bytes(2, 2), 1),
            ]))
            .await
            .unwrap();
        assert_eq!(
            page_markers(&forward.artifact.bytes),
            vec![101, 102, 103, 201, 202]
        );

        // Same inputs, order reversed
        let reversed = composer
            .compose(request(vec![
                upload("a.pdf", tagged_pdf_bytes(1, 3), 1),
                upload("b.pdf", tagged_pdf_bytes(2, 2), 0),
            ]))
            .await
            .unwrap();
        assert_eq!(
            page_markers(&reversed.artifact.bytes),
            vec![201, 202, 101, 102, 103]
        );
    }

    #[tokio::test]
    async fn test_compose_aborts_on_corrupt_source() {
        let composer = Composer::new(2);
        let result = composer
            .compose(request(vec![
                upload("a.pdf", tagged_pdf_bytes(1, 1), 0),
                upload("b.pdf", b"corrupt bytes".to_vec(), 1),
            ]))
            .await;

        match result.unwrap_err() {
            StitchError::Parse { filename, .. } => assert_eq!(filename, "b.pdf"),
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_compose_aborts_regardless_of_failing_index() {
        let composer = Composer::new(4);
        for bad_index in 0..3u32 {
            let files: Vec<UploadedFile> = (0..3u32)
                .map(|i| {
                    let content = if i == bad_index {
                        b"garbage".to_vec()
                    } else {
                        tagged_pdf_bytes(i as i64 + 1, 1)
                    };
                    upload(&format!("f{i}.pdf"), content, i)
                })
                .collect();

            let result = composer.compose(request(files)).await;
            assert!(
                matches!(result, Err(StitchError::Parse { .. })),
                "corrupt source at index {bad_index} must abort the merge"
            );
        }
    }

    #[tokio::test]
    async fn test_compose_output_reloads_as_pdf() {
        let composer = Composer::new(2);
        let result = composer
            .compose(request(vec![
                upload("a.pdf", tagged_pdf_bytes(1, 2), 0),
                upload("b.pdf", tagged_pdf_bytes(2, 2), 1),
            ]))
            .await
            .unwrap();

        let reloaded = Document::load_mem(&result.artifact.bytes).unwrap();
        assert_eq!(reloaded.get_pages().len(), 4);
    }
}
