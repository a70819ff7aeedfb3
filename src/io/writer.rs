//! Serialization of the merged document.
//!
//! The merged PDF never touches local disk; it is serialized once into a
//! byte buffer and handed to the artifact store. Compression and object
//! renumbering happen here, on the blocking pool.

use lopdf::Document;
use tokio::task;

use crate::error::{Result, StitchError};

/// Serialize a document into a single byte buffer.
///
/// Applies compression and renumbers objects for a consistent layout
/// before writing.
///
/// # Errors
///
/// Returns [`StitchError::Composition`] if lopdf fails to serialize the
/// document.
///
/// # Examples
///
/// ```no_run
/// # use lopdf::Document;
/// # use pdfstitch::io::serialize_document;
/// # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = serialize_document(doc).await?;
/// println!("Serialized {} bytes", bytes.len());
/// # Ok(())
/// # }
/// ```
pub async fn serialize_document(mut doc: Document) -> Result<Vec<u8>> {
    task::spawn_blocking(move || {
        doc.compress();
        doc.renumber_objects();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| StitchError::composition_failed(format!("serialization failed: {e}")))?;

        Ok::<_, StitchError>(buffer)
    })
    .await
    .map_err(|e| StitchError::composition_failed(format!("serialization task failed: {e}")))?
}
