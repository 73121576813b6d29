//! Document assembly and the eager (full-document) entry points.
//!
//! ## Why render everything before returning?
//!
//! A PDF is only valid once its cross-reference table is written, and a
//! drawing failure half way through must never reach the client as a
//! truncated file. [`render_document`] therefore builds the whole document
//! in memory and returns either complete bytes or an error. Use
//! [`crate::stream`] to send the finished bytes in chunks.
//!
//! ## Why spawn_blocking?
//!
//! Decoding photos, resampling them and deflating page streams is CPU work
//! measured in tens of milliseconds per page. [`generate`] moves it onto
//! Tokio's blocking pool so the async workers keep serving other requests.

use crate::config::RenderConfig;
use crate::error::MemorialError;
use crate::model::{DocumentRequest, DEFAULT_TITLE};
use crate::output::{ImageOutcome, MemorialOutput, PageKind, PageReport, RenderStats};
use crate::phrases;
use crate::pipeline::closing::draw_closing;
use crate::pipeline::cover::draw_cover;
use crate::pipeline::entry::{draw_entry, EntryFields};
use crate::pipeline::layout::RenderContext;
use crate::pipeline::normalize::normalize_field;
use chrono::{Local, Utc};
use pdf_canvas::{Document, DocumentInfo, DocumentOptions};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Render a memorial document: cover, one page per entry, closing page.
///
/// This is the blocking core used by every other entry point. It can be
/// called directly from synchronous code.
///
/// # Errors
/// - [`MemorialError::Cancelled`] if the configured token fires between pages
/// - [`MemorialError::Render`] if the drawing layer rejected an operation
///
/// Missing or broken photos are **not** errors; see
/// [`PageReport::asset_error`].
pub fn render_document(
    request: &DocumentRequest,
    config: &RenderConfig,
) -> Result<MemorialOutput, MemorialError> {
    let start = Instant::now();
    let ctx = RenderContext::a4_landscape(config.page_margin);
    let total_pages = request.page_count();
    let entry_count = request.entries.len();

    let title =
        normalize_field(request.title.as_deref()).unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let generated_at = match request.generated_at {
        Some(ts) => ts.wall_clock(config.utc_offset),
        None => match config.utc_offset {
            Some(offset) => Utc::now().with_timezone(&offset).naive_local(),
            None => Local::now().naive_local(),
        },
    };

    info!(
        "Rendering memorial '{}' with {} entries ({} pages)",
        title, entry_count, total_pages
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_render_start(total_pages);
    }

    let mut doc = Document::new(DocumentOptions {
        size: ctx.page_size(),
        margin: ctx.margin,
        compress: config.compress,
        info: DocumentInfo {
            title: Some(title.clone()),
            creator: Some(phrases::CREATOR.to_string()),
            producer: Some(concat!("memorial-pdf ", env!("CARGO_PKG_VERSION")).to_string()),
        },
    });
    let mut pages = Vec::with_capacity(total_pages);

    // ── Cover ────────────────────────────────────────────────────────────
    page_start(config, 1, total_pages)?;
    draw_cover(&mut doc, &ctx, &title, &phrases::format_date(generated_at));
    pages.push(PageReport::new(1, PageKind::Cover));
    page_complete(config, 1, total_pages);

    // ── Entries ──────────────────────────────────────────────────────────
    for (i, entry) in request.entries.iter().enumerate() {
        let page_num = i + 2;
        page_start(config, page_num, total_pages)?;

        let fields = EntryFields::resolve(entry, config);
        let report = draw_entry(&mut doc, &ctx, fields, i + 1, entry_count);

        if let (Some(err), Some(cb)) = (&report.asset_error, &config.progress_callback) {
            cb.on_asset_fallback(page_num, &err.to_string());
        }
        pages.push(report);
        page_complete(config, page_num, total_pages);
    }

    // ── Closing ──────────────────────────────────────────────────────────
    page_start(config, total_pages, total_pages)?;
    draw_closing(&mut doc, &ctx);
    pages.push(PageReport::new(total_pages, PageKind::Closing));
    page_complete(config, total_pages, total_pages);

    let pdf = doc.finish()?;

    let stats = RenderStats {
        total_pages,
        entry_pages: entry_count,
        images_embedded: count_images(&pages, |o| matches!(o, ImageOutcome::Embedded { .. })),
        placeholders: count_images(&pages, |o| !matches!(o, ImageOutcome::Embedded { .. })),
        truncated_messages: pages
            .iter()
            .filter(|p| p.message.is_some_and(|m| m.truncated))
            .count(),
        pdf_bytes: pdf.len(),
        duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "Memorial complete: {} pages, {} bytes, {}ms",
        stats.total_pages, stats.pdf_bytes, stats.duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_render_complete(total_pages, pdf.len());
    }

    Ok(MemorialOutput { pdf, pages, stats })
}

/// Render on Tokio's blocking pool.
///
/// # Example
/// ```rust,no_run
/// use memorial_pdf::{generate, DocumentRequest, MemorialEntry, RenderConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let request = DocumentRequest::new(vec![MemorialEntry {
///     file: Some("/uploads/abuela.jpg".into()),
///     title: Some("La abuela".into()),
///     ..MemorialEntry::default()
/// }]);
/// let output = generate(request, &RenderConfig::default()).await?;
/// std::fs::write("memorial.pdf", &output.pdf)?;
/// # Ok(())
/// # }
/// ```
pub async fn generate(
    request: DocumentRequest,
    config: &RenderConfig,
) -> Result<MemorialOutput, MemorialError> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || render_document(&request, &config))
        .await
        .map_err(|e| MemorialError::Internal(format!("Render task panicked: {}", e)))?
}

/// Render and write the PDF directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn generate_to_file(
    request: DocumentRequest,
    output_path: impl AsRef<Path>,
    config: &RenderConfig,
) -> Result<RenderStats, MemorialError> {
    let output = generate(request, config).await?;
    let path = output_path.as_ref();
    let write_err = |e| MemorialError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, &output.pdf)
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

    debug!("Wrote {} bytes to {}", output.pdf.len(), path.display());
    Ok(output.stats)
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    request: DocumentRequest,
    config: &RenderConfig,
) -> Result<MemorialOutput, MemorialError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| MemorialError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate(request, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn page_start(config: &RenderConfig, page: usize, total: usize) -> Result<(), MemorialError> {
    if config.is_cancelled() {
        info!("Render cancelled before page {}/{}", page, total);
        return Err(MemorialError::Cancelled { page });
    }
    if let Some(ref cb) = config.progress_callback {
        cb.on_page_start(page, total);
    }
    Ok(())
}

fn page_complete(config: &RenderConfig, page: usize, total: usize) {
    if let Some(ref cb) = config.progress_callback {
        cb.on_page_complete(page, total);
    }
}

fn count_images(pages: &[PageReport], pred: impl Fn(&ImageOutcome) -> bool) -> usize {
    pages
        .iter()
        .filter_map(|p| p.image.as_ref())
        .filter(|o| pred(o))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MemorialEntry, Timestamp};
    use crate::progress::RenderProgressCallback;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    fn raw_config() -> RenderConfig {
        RenderConfig::builder()
            .assets_root(std::env::temp_dir().join("memorial-generate-tests-none"))
            .compress(false)
            .utc_offset(chrono::FixedOffset::east_opt(0).unwrap())
            .build()
            .unwrap()
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn empty_request_yields_cover_and_closing() {
        let out = render_document(&DocumentRequest::default(), &raw_config()).unwrap();
        assert_eq!(out.pages.len(), 2);
        assert_eq!(out.pages[0].kind, PageKind::Cover);
        assert_eq!(out.pages[1].kind, PageKind::Closing);
        assert_eq!(out.stats.total_pages, 2);
        assert!(contains(&out.pdf, b"(Memorial de Recuerdos) Tj"));
    }

    #[test]
    fn entries_get_sequential_footers() {
        let request = DocumentRequest::new(vec![MemorialEntry::default(); 3]);
        let out = render_document(&request, &raw_config()).unwrap();
        assert_eq!(out.pages.len(), 5);
        for k in 1..=3 {
            let label = format!("({k} de 3) Tj");
            assert!(contains(&out.pdf, label.as_bytes()), "missing {label}");
            assert_eq!(out.pages[k].page_num, k + 1);
        }
        assert_eq!(out.stats.placeholders, 3);
    }

    #[test]
    fn generated_at_drives_cover_date() {
        let request = DocumentRequest::default()
            .with_title("Familia Pérez")
            .with_generated_at(Timestamp::parse("2026-10-16T12:00:00Z").unwrap());
        let out = render_document(&request, &raw_config()).unwrap();
        assert!(contains(&out.pdf, b"(16 de octubre de 2026) Tj"));
    }

    #[test]
    fn cancelled_token_aborts_before_first_page() {
        let token = CancellationToken::new();
        token.cancel();
        let config = RenderConfig::builder().cancellation(token).build().unwrap();
        let err = render_document(&DocumentRequest::default(), &config).unwrap_err();
        assert!(matches!(err, MemorialError::Cancelled { page: 1 }));
    }

    struct CancelAfter {
        token: CancellationToken,
        after: usize,
        seen: AtomicUsize,
    }

    impl RenderProgressCallback for CancelAfter {
        fn on_page_complete(&self, _page_num: usize, _total_pages: usize) {
            if self.seen.fetch_add(1, Ordering::SeqCst) + 1 == self.after {
                self.token.cancel();
            }
        }
    }

    #[test]
    fn cancellation_between_pages_stops_the_render() {
        let token = CancellationToken::new();
        let cb = Arc::new(CancelAfter {
            token: token.clone(),
            after: 2,
            seen: AtomicUsize::new(0),
        });
        let config = RenderConfig::builder()
            .cancellation(token)
            .progress_callback(cb.clone())
            .build()
            .unwrap();
        let request = DocumentRequest::new(vec![MemorialEntry::default(); 4]);
        let err = render_document(&request, &config).unwrap_err();
        assert!(matches!(err, MemorialError::Cancelled { page: 3 }));
        assert_eq!(cb.seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn generate_runs_off_the_async_thread() {
        let request = DocumentRequest::new(vec![MemorialEntry::default()]);
        let out = generate(request, &RenderConfig::default()).await.unwrap();
        assert!(out.pdf.starts_with(b"%PDF-"));
        assert_eq!(out.stats.total_pages, 3);
    }
}
