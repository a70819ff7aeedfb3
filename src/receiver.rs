//! Upload validation for pdfstitch.
//!
//! This module checks an incoming file set against the configured bounds
//! before any composition work happens. It performs:
//! - File count window checks
//! - Media type checks
//! - Per-file size checks
//! - Order index normalization
//!
//! # Examples
//!
//! ```
//! use bytes::Bytes;
//! use pdfstitch::config::MergeLimits;
//! use pdfstitch::receiver::{UploadReceiver, UploadedFile};
//!
//! let receiver = UploadReceiver::new(MergeLimits::default());
//! let files = vec![
//!     UploadedFile::new(Bytes::from_static(b"%PDF-"), "application/pdf", "b.pdf", 1),
//!     UploadedFile::new(Bytes::from_static(b"%PDF-"), "application/pdf", "a.pdf", 0),
//! ];
//! let request = receiver.accept(files).unwrap();
//! assert_eq!(request.files()[0].display_name, "a.pdf");
//! ```

use bytes::Bytes;

use crate::config::{MergeLimits, MIN_FILE_COUNT};
use crate::error::{Result, StitchError};

/// One uploaded file, as it arrived at request ingress.
///
/// The buffer is exclusively owned by the request pipeline; it is consumed
/// by the composer and dropped on every exit path.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Raw byte content.
    pub content: Bytes,

    /// Declared media type.
    pub media_type: String,

    /// Original display name.
    pub display_name: String,

    /// Size in bytes.
    pub size: u64,

    /// Caller-declared order index.
    pub order_index: u32,
}

impl UploadedFile {
    /// Create an uploaded file from its parts; size is taken from the
    /// buffer, not trusted from the caller.
    pub fn new(
        content: Bytes,
        media_type: impl Into<String>,
        display_name: impl Into<String>,
        order_index: u32,
    ) -> Self {
        let size = content.len() as u64;
        Self {
            content,
            media_type: media_type.into(),
            display_name: display_name.into(),
            size,
            order_index,
        }
    }
}

/// A validated, normalized merge request.
///
/// Files are sorted by caller order index and re-indexed densely over
/// [0, N); downstream stages rely on that invariant.
#[derive(Debug)]
pub struct MergeRequest {
    files: Vec<UploadedFile>,
}

impl MergeRequest {
    /// The normalized file list, ascending by order index.
    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    /// Number of files in the request.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the request holds no files. Cannot be true for a request
    /// produced by [`UploadReceiver::accept`].
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Consume the request, yielding the normalized files.
    pub fn into_files(self) -> Vec<UploadedFile> {
        self.files
    }
}

/// Validator for incoming upload sets.
#[derive(Debug, Clone)]
pub struct UploadReceiver {
    limits: MergeLimits,
}

impl UploadReceiver {
    /// Create a receiver enforcing the given limits.
    pub fn new(limits: MergeLimits) -> Self {
        Self { limits }
    }

    /// Validate a candidate upload set and produce a normalized request.
    ///
    /// Caller-declared order indices may be sparse; they are resolved to a
    /// dense ascending sequence. Duplicates are rejected.
    ///
    /// # Errors
    ///
    /// Returns a validation error if:
    /// - Fewer than 2 or more than the configured maximum files are present
    /// - Any file declares a media type other than the accepted one
    /// - Any file exceeds the per-file size bound
    /// - Two files declare the same order index
    pub fn accept(&self, mut candidates: Vec<UploadedFile>) -> Result<MergeRequest> {
        if candidates.len() < MIN_FILE_COUNT {
            return Err(StitchError::TooFewFiles {
                count: candidates.len(),
                min: MIN_FILE_COUNT,
            });
        }

        if candidates.len() > self.limits.max_file_count {
            return Err(StitchError::TooManyFiles {
                count: candidates.len(),
                max: self.limits.max_file_count,
            });
        }

        for file in &candidates {
            if file.media_type != self.limits.accepted_media_type {
                return Err(StitchError::unsupported_media_type(
                    &file.display_name,
                    &file.media_type,
                ));
            }

            if file.size > self.limits.max_file_bytes {
                return Err(StitchError::FileTooLarge {
                    filename: file.display_name.clone(),
                    size: file.size,
                    max: self.limits.max_file_bytes,
                });
            }
        }

        candidates.sort_by_key(|f| f.order_index);

        for pair in candidates.windows(2) {
            if pair[0].order_index == pair[1].order_index {
                return Err(StitchError::DuplicateOrderIndex {
                    index: pair[0].order_index,
                });
            }
        }

        // Resolve sparse caller indices to a dense ascending sequence.
        for (position, file) in candidates.iter_mut().enumerate() {
            file.order_index = position as u32;
        }

        Ok(MergeRequest { files: candidates })
    }
}
