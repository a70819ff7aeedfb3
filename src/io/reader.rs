//! Parsing of uploaded PDF buffers.
//!
//! This module turns raw upload bytes into page-addressable documents with
//! support for:
//! - Sequential and parallel parsing
//! - A deterministic ordering pass keyed by order index
//! - Early rejection of page-less documents
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::io::DocumentReader;
//! use pdfstitch::receiver::UploadedFile;
//!
//! # async fn example(files: Vec<UploadedFile>) -> Result<(), Box<dyn std::error::Error>> {
//! let reader = DocumentReader::new();
//! let sources = reader.parse_all(files, 4).await?;
//! println!("Parsed {} documents", sources.len());
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use tokio::task;

use crate::error::{Result, StitchError};
use crate::receiver::UploadedFile;

/// A parsed source document, ready for concatenation.
#[derive(Debug)]
pub struct ParsedSource {
    /// The parsed PDF document.
    pub document: Document,

    /// Original display name of the upload.
    pub display_name: String,

    /// Normalized order index of the upload within the request.
    pub order_index: u32,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Size of the raw upload in bytes.
    pub byte_size: u64,
}

/// Parser for uploaded PDF buffers.
#[derive(Debug, Clone)]
pub struct DocumentReader {
    /// Whether to reject documents without pages.
    verify: bool,
}

impl DocumentReader {
    /// Create a new reader with default settings.
    pub fn new() -> Self {
        Self { verify: true }
    }

    /// Create a reader that skips the page-count check.
    pub fn without_verification() -> Self {
        Self { verify: false }
    }

    /// Parse a single uploaded file.
    ///
    /// The upload buffer is consumed; once parsing finishes (or fails) the
    /// raw bytes are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::Parse`] naming the file if the bytes are not
    /// a readable PDF or the document has no pages.
    pub async fn parse(&self, file: UploadedFile) -> Result<ParsedSource> {
        let UploadedFile {
            content,
            display_name,
            order_index,
            size,
            ..
        } = file;

        let verify = self.verify;
        let name_for_task = display_name.clone();

        // lopdf parsing is CPU-bound; keep it off the async workers.
        let document = task::spawn_blocking(move || {
            Document::load_mem(&content)
                .map_err(|e| StitchError::parse_failed(&name_for_task, e.to_string()))
        })
        .await
        .map_err(|e| StitchError::composition_failed(format!("parse task failed: {e}")))??;

        let page_count = document.get_pages().len();
        if verify && page_count == 0 {
            return Err(StitchError::parse_failed(&display_name, "PDF has no pages"));
        }

        Ok(ParsedSource {
            document,
            display_name,
            order_index,
            page_count,
            byte_size: size,
        })
    }

    /// Parse all uploaded files of a request.
    ///
    /// Parsing runs concurrently on up to `workers` blocking tasks, but the
    /// returned sources are re-sorted by position after all parses complete,
    /// so the output order never depends on parse scheduling. The first
    /// failure in order-index order aborts the whole batch.
    ///
    /// # Arguments
    ///
    /// * `files` - Uploaded files, already normalized to ascending order
    /// * `workers` - Number of parallel workers (typically CPU core count)
    pub async fn parse_all(
        &self,
        files: Vec<UploadedFile>,
        workers: usize,
    ) -> Result<Vec<ParsedSource>> {
        use futures::stream::{self, StreamExt};

        let workers = workers.max(1);

        let tasks = files.into_iter().enumerate().map(|(idx, file)| {
            let reader = self.clone();
            async move {
                let result = reader.parse(file).await;
                (idx, result)
            }
        });

        let mut indexed: Vec<(usize, Result<ParsedSource>)> = stream::iter(tasks)
            .buffer_unordered(workers)
            .collect::<Vec<_>>()
            .await;

        // Deterministic ordering pass: completion order is scheduling noise.
        indexed.sort_by_key(|(idx, _)| *idx);

        indexed.into_iter().map(|(_, result)| result).collect()
    }
}

impl Default for DocumentReader {
    fn default() -> Self {
        Self::new()
    }
}
