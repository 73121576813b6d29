//! Streaming output API: emit a finished PDF as a sequence of chunks.
//!
//! ## Why stream?
//!
//! HTTP clients start writing the download to disk as soon as the first
//! chunk arrives, and the transport applies back-pressure per chunk instead
//! of holding one large buffer in flight. The document itself is always
//! rendered completely first (see [`crate::generate`]), so a stream never
//! carries a truncated PDF.

use crate::config::RenderConfig;
use crate::error::MemorialError;
use crate::generate::generate;
use crate::model::DocumentRequest;
use futures::stream;
use std::io;
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::debug;

/// Size of each emitted chunk.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// A boxed stream of PDF byte chunks.
pub type PdfByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, io::Error>> + Send>>;

/// Split finished PDF bytes into [`CHUNK_SIZE`] pieces.
pub fn pdf_byte_stream(pdf: Vec<u8>) -> PdfByteStream {
    let chunks: Vec<Result<Vec<u8>, io::Error>> = if pdf.is_empty() {
        Vec::new()
    } else {
        pdf.chunks(CHUNK_SIZE).map(|c| Ok(c.to_vec())).collect()
    };
    debug!("Streaming {} bytes in {} chunks", pdf.len(), chunks.len());
    Box::pin(stream::iter(chunks))
}

/// Render a document and return its bytes as a chunk stream.
///
/// # Returns
/// - `Ok(PdfByteStream)` — the complete document, chunked
/// - `Err(MemorialError)` — the render failed; nothing was produced
///
/// # Example
/// ```rust,no_run
/// use memorial_pdf::{generate_stream, DocumentRequest, RenderConfig};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut chunks = generate_stream(DocumentRequest::default(), &RenderConfig::default()).await?;
/// let mut total = 0;
/// while let Some(chunk) = chunks.next().await {
///     total += chunk?.len();
/// }
/// println!("{total} bytes");
/// # Ok(())
/// # }
/// ```
pub async fn generate_stream(
    request: DocumentRequest,
    config: &RenderConfig,
) -> Result<PdfByteStream, MemorialError> {
    let output = generate(request, config).await?;
    Ok(pdf_byte_stream(output.pdf))
}
