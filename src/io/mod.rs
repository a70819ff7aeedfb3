//! Document I/O for pdfstitch.
//!
//! This module handles the byte-level boundary of the merge engine:
//! - Parsing uploaded byte buffers into PDF documents
//! - Parallel parsing with a deterministic ordering pass
//! - Serializing the merged document into a single byte buffer
//!
//! Nothing here touches the filesystem; uploads arrive in memory and the
//! merged artifact leaves in memory.

pub mod reader;
pub mod writer;

pub use reader::{DocumentReader, ParsedSource};
pub use writer::serialize_document;
