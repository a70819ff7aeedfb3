//! Error types for pdfstitch.
//!
//! This module defines all error types that can occur while handling a merge
//! request. Errors carry enough context to identify the failing file (for
//! parse errors) or the failing stage (for storage/repository errors)
//! without exposing backend credentials or endpoints.
//!
//! # Error Categories
//!
//! - **Validation Errors**: the upload set is rejected before composition
//! - **Parse Errors**: a source document could not be read
//! - **Composition Errors**: the merge itself failed
//! - **Storage / Repository Errors**: an external backend failed
//! - **Dangling Artifact**: the blob was stored but its record was not

use std::fmt;

use crate::repository::RepositoryError;
use crate::store::StoreError;

/// Result type alias for pdfstitch operations.
pub type Result<T> = std::result::Result<T, StitchError>;

/// Main error type for pdfstitch operations.
#[derive(Debug)]
pub enum StitchError {
    /// Fewer than the minimum number of files were uploaded.
    TooFewFiles {
        /// Number of files actually present.
        count: usize,
        /// Minimum accepted count.
        min: usize,
    },

    /// More files than the configured maximum were uploaded.
    TooManyFiles {
        /// Number of files actually present.
        count: usize,
        /// Configured maximum.
        max: usize,
    },

    /// A file declared a media type other than the accepted one.
    UnsupportedMediaType {
        /// Display name of the offending file.
        filename: String,
        /// The declared media type.
        media_type: String,
    },

    /// A file exceeds the per-file size bound.
    FileTooLarge {
        /// Display name of the offending file.
        filename: String,
        /// Actual size in bytes.
        size: u64,
        /// Configured bound in bytes.
        max: u64,
    },

    /// Two files declared the same order index.
    DuplicateOrderIndex {
        /// The repeated index.
        index: u32,
    },

    /// The multipart body itself could not be understood.
    MalformedUpload {
        /// Details about what was wrong with the request body.
        message: String,
    },

    /// A source document could not be parsed; the merge was aborted.
    Parse {
        /// Display name of the offending file.
        filename: String,
        /// Details from the document parser.
        details: String,
    },

    /// The merge engine failed internally; no artifact was produced.
    Composition {
        /// Description of what went wrong.
        reason: String,
    },

    /// The artifact store rejected or failed the write.
    Storage {
        /// Details about the failure, free of credentials.
        details: String,
    },

    /// The metadata repository failed on a read or on an insert that was
    /// attempted before any blob was stored.
    Repository {
        /// Details about the failure, free of credentials.
        details: String,
    },

    /// The blob was durably stored but its metadata insert failed. The
    /// artifact exists at `url` yet will not appear in any listing.
    DanglingArtifact {
        /// Filename the blob was stored under.
        filename: String,
        /// Retrieval URL of the stored blob.
        url: String,
        /// Details from the repository failure.
        details: String,
    },

    /// No artifact record exists for the requested identifier.
    NotFound {
        /// The identifier as supplied by the caller.
        id: String,
    },
}

impl fmt::Display for StitchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewFiles { count, min } => {
                write!(f, "At least {min} files are required, got {count}")
            }
            Self::TooManyFiles { count, max } => {
                write!(f, "At most {max} files are accepted, got {count}")
            }
            Self::UnsupportedMediaType {
                filename,
                media_type,
            } => {
                write!(f, "File '{filename}' has unsupported media type '{media_type}'")
            }
            Self::FileTooLarge { filename, size, max } => {
                write!(
                    f,
                    "File '{filename}' is {size} bytes, exceeding the {max} byte limit"
                )
            }
            Self::DuplicateOrderIndex { index } => {
                write!(f, "Order index {index} was declared more than once")
            }
            Self::MalformedUpload { message } => {
                write!(f, "Malformed upload: {message}")
            }
            Self::Parse { filename, details } => {
                write!(f, "Failed to parse '{filename}': {details}")
            }
            Self::Composition { reason } => {
                write!(f, "Composition failed: {reason}")
            }
            Self::Storage { details } => {
                write!(f, "Artifact storage failed: {details}")
            }
            Self::Repository { details } => {
                write!(f, "Metadata repository failed: {details}")
            }
            Self::DanglingArtifact { filename, .. } => {
                write!(
                    f,
                    "Artifact '{filename}' was stored but its record could not be saved; \
                     it will not appear in listings"
                )
            }
            Self::NotFound { id } => {
                write!(f, "No artifact found for id '{id}'")
            }
        }
    }
}

impl std::error::Error for StitchError {}

impl From<StoreError> for StitchError {
    fn from(err: StoreError) -> Self {
        Self::Storage {
            details: err.to_string(),
        }
    }
}

impl From<RepositoryError> for StitchError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { id } => Self::NotFound { id: id.to_string() },
            other => Self::Repository {
                details: other.to_string(),
            },
        }
    }
}

impl StitchError {
    /// Create an UnsupportedMediaType error.
    pub fn unsupported_media_type(
        filename: impl Into<String>,
        media_type: impl Into<String>,
    ) -> Self {
        Self::UnsupportedMediaType {
            filename: filename.into(),
            media_type: media_type.into(),
        }
    }

    /// Create a MalformedUpload error.
    pub fn malformed_upload(message: impl Into<String>) -> Self {
        Self::MalformedUpload {
            message: message.into(),
        }
    }

    /// Create a Parse error.
    pub fn parse_failed(filename: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Parse {
            filename: filename.into(),
            details: details.into(),
        }
    }

    /// Create a Composition error.
    pub fn composition_failed(reason: impl Into<String>) -> Self {
        Self::Composition {
            reason: reason.into(),
        }
    }

    /// Create a DanglingArtifact error from a post-store repository failure.
    pub fn dangling_artifact(
        filename: impl Into<String>,
        url: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::DanglingArtifact {
            filename: filename.into(),
            url: url.into(),
            details: details.into(),
        }
    }

    /// Create a NotFound error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Check if this error is a request-validation rejection.
    ///
    /// Validation rejections happen before composition; nothing downstream
    /// of the receiver ran.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::TooFewFiles { .. }
                | Self::TooManyFiles { .. }
                | Self::UnsupportedMediaType { .. }
                | Self::FileTooLarge { .. }
                | Self::DuplicateOrderIndex { .. }
                | Self::MalformedUpload { .. }
        )
    }

    /// Check if this error left durable state behind.
    ///
    /// True only for the dangling-artifact partial failure, where a blob
    /// exists with no retrievable record.
    pub fn is_partial_failure(&self) -> bool {
        matches!(self, Self::DanglingArtifact { .. })
    }

    /// Get the stable machine-readable code for this error.
    ///
    /// Codes are part of the API contract and never change meaning.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TooFewFiles { .. } => "too_few_files",
            Self::TooManyFiles { .. } => "too_many_files",
            Self::UnsupportedMediaType { .. } => "unsupported_media_type",
            Self::FileTooLarge { .. } => "file_too_large",
            Self::DuplicateOrderIndex { .. } => "duplicate_order_index",
            Self::MalformedUpload { .. } => "malformed_upload",
            Self::Parse { .. } => "unparsable_document",
            Self::Composition { .. } => "composition_failed",
            Self::Storage { .. } => "storage_failed",
            Self::Repository { .. } => "repository_failed",
            Self::DanglingArtifact { .. } => "dangling_artifact",
            Self::NotFound { .. } => "not_found",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::TooFewFiles { .. } => 400,
            Self::TooManyFiles { .. } => 400,
            Self::UnsupportedMediaType { .. } => 415,
            Self::FileTooLarge { .. } => 413,
            Self::DuplicateOrderIndex { .. } => 400,
            Self::MalformedUpload { .. } => 400,
            Self::Parse { .. } => 422,
            Self::Composition { .. } => 500,
            Self::Storage { .. } => 502,
            Self::Repository { .. } => 502,
            Self::DanglingArtifact { .. } => 500,
            Self::NotFound { .. } => 404,
        }
    }
}
