//! Document composition for pdfstitch.
//!
//! This module provides the core merge functionality with:
//! - Document concatenation in caller-declared order
//! - Internal page order preservation
//! - Atomic all-or-nothing output
//! - Parallel source parsing
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::compose::Composer;
//! use pdfstitch::receiver::MergeRequest;
//!
//! # async fn example(request: MergeRequest) -> Result<(), Box<dyn std::error::Error>> {
//! let composer = Composer::new(4);
//! let result = composer.compose(request).await?;
//! println!(
//!     "Composed {} pages into {}",
//!     result.artifact.page_count, result.artifact.filename
//! );
//! # Ok(())
//! # }
//! ```

pub mod composer;

pub use composer::{ComposeResult, ComposeStats, Composer, MergedArtifact};
