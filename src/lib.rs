//! pdfstitch - Merge uploaded PDF documents into a single durable artifact.
//!
//! This library implements a merge orchestration pipeline: it validates an
//! uploaded file set, concatenates the documents in a caller-declared
//! order, stores the output durably, and persists a retrievable record.
//! It supports:
//!
//! - Atomic all-or-nothing merging
//! - Order preservation by explicit per-file index
//! - Parallel source parsing
//! - Swappable storage and repository backends
//! - Comprehensive error handling with stable error codes
//!
//! # Examples
//!
//! ## Running a merge through the pipeline
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use pdfstitch::config::ServiceConfig;
//! use pdfstitch::pipeline::MergePipeline;
//! use pdfstitch::receiver::UploadedFile;
//! use pdfstitch::repository::MemoryArtifactRepository;
//! use pdfstitch::store::MemoryArtifactStore;
//!
//! # async fn example(files: Vec<UploadedFile>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServiceConfig::default();
//! let pipeline = MergePipeline::new(
//!     &config,
//!     Arc::new(MemoryArtifactStore::new()),
//!     Arc::new(MemoryArtifactRepository::new()),
//! );
//!
//! let receipt = pipeline.run(files).await?;
//! println!("Merged artifact available at {}", receipt.record.url);
//! # Ok(())
//! # }
//! ```
//!
//! ## Using Individual Components
//!
//! ```no_run
//! use pdfstitch::compose::Composer;
//! use pdfstitch::config::MergeLimits;
//! use pdfstitch::receiver::{UploadReceiver, UploadedFile};
//!
//! # async fn example(files: Vec<UploadedFile>) -> Result<(), Box<dyn std::error::Error>> {
//! // Validate and normalize the upload set
//! let receiver = UploadReceiver::new(MergeLimits::default());
//! let request = receiver.accept(files)?;
//!
//! // Compose the output document
//! let composer = Composer::new(4);
//! let result = composer.compose(request).await?;
//! println!("Output has {} pages", result.artifact.page_count);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod compose;
pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod receiver;
pub mod repository;
pub mod retrieval;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use config::ServiceConfig;
pub use error::{Result, StitchError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
