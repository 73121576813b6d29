//! Progress-callback trait for per-page render events.
//!
//! Inject an [`Arc<dyn RenderProgressCallback>`] via
//! [`crate::config::RenderConfigBuilder::progress_callback`] to receive
//! events as the assembler draws each page.
//!
//! # Why callbacks instead of channels?
//!
//! Rendering runs on a blocking worker thread. A callback lets the host
//! forward events wherever it likes (a terminal progress bar, a log line, a
//! channel back to an async task) without the library choosing a transport.
//!
//! # Example
//!
//! ```rust
//! use memorial_pdf::{RenderConfig, RenderProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     pages: AtomicUsize,
//! }
//!
//! impl RenderProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, _page_num: usize, _total_pages: usize) {
//!         self.pages.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { pages: AtomicUsize::new(0) });
//!
//! let config = RenderConfig::builder()
//!     .progress_callback(counter as Arc<dyn RenderProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the document assembler as it draws each page.
///
/// Pages are drawn sequentially on a single worker thread, so events arrive
/// in page order. Implementations must still be `Send + Sync` because the
/// callback is shared between the async caller and that thread.
pub trait RenderProgressCallback: Send + Sync {
    /// Called once before the cover page is drawn.
    ///
    /// # Arguments
    /// * `total_pages` — entries + 2 (cover and closing page)
    fn on_render_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called before a page is drawn.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number in the output document
    /// * `total_pages` — total pages in the document
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called after a page has been drawn.
    fn on_page_complete(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when an entry's photo could not be used and the placeholder was
    /// drawn instead.
    ///
    /// # Arguments
    /// * `page_num` — 1-indexed page number of the entry page
    /// * `error`    — human-readable reason
    fn on_asset_fallback(&self, page_num: usize, error: &str) {
        let _ = (page_num, error);
    }

    /// Called once after the document has been serialised.
    ///
    /// # Arguments
    /// * `total_pages` — pages in the finished document
    /// * `bytes`       — size of the PDF in bytes
    fn on_render_complete(&self, total_pages: usize, bytes: usize) {
        let _ = (total_pages, bytes);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl RenderProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::RenderConfig`].
pub type ProgressCallback = Arc<dyn RenderProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        total: AtomicUsize,
        starts: AtomicUsize,
        completes: AtomicUsize,
        fallbacks: AtomicUsize,
        bytes: AtomicUsize,
    }

    impl RenderProgressCallback for TrackingCallback {
        fn on_render_start(&self, total_pages: usize) {
            self.total.store(total_pages, Ordering::SeqCst);
        }

        fn on_page_start(&self, _page_num: usize, _total_pages: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_complete(&self, _page_num: usize, _total_pages: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_asset_fallback(&self, _page_num: usize, _error: &str) {
            self.fallbacks.fetch_add(1, Ordering::SeqCst);
        }

        fn on_render_complete(&self, _total_pages: usize, bytes: usize) {
            self.bytes.store(bytes, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_render_start(4);
        cb.on_page_start(1, 4);
        cb.on_page_complete(1, 4);
        cb.on_asset_fallback(2, "missing");
        cb.on_render_complete(4, 1024);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_render_start(3);
        for page in 1..=3 {
            tracker.on_page_start(page, 3);
            tracker.on_page_complete(page, 3);
        }
        tracker.on_asset_fallback(2, "Asset 'x.jpg' not found");
        tracker.on_render_complete(3, 2048);

        assert_eq!(tracker.total.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.fallbacks.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.bytes.load(Ordering::SeqCst), 2048);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_render_start(2);
        cb.on_page_complete(1, 2);
    }
}
