//! # memorial-pdf
//!
//! Generate decorative memorial PDF books from a list of photo entries.
//!
//! ## Why this crate?
//!
//! Families collect photos and short messages for a remembrance and want a
//! single printable keepsake. This crate turns that list into an A4
//! landscape document: a framed cover, one page per memory with the photo
//! beside its title, message and date, and a closing page. It ships as a
//! library, an HTTP service a web form can post to, and a CLI.
//!
//! ## Pipeline Overview
//!
//! ```text
//! JSON request
//!  │
//!  ├─ 1. Parse      validate `data`, lenient timestamps, empty → absent
//!  ├─ 2. Normalise  NFC, strip emoji/symbols, collapse whitespace
//!  ├─ 3. Cover      gradient, frames, title, rosette, date
//!  ├─ 4. Entries    photo (or placeholder) + quoted message, "n de N"
//!  ├─ 5. Closing    heart, headline, farewell, floral corners
//!  └─ 6. Output     complete PDF bytes + per-page reports
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use memorial_pdf::{generate, DocumentRequest, MemorialEntry, RenderConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request = DocumentRequest::new(vec![MemorialEntry {
//!         file: Some("/uploads/playa.jpg".into()),
//!         title: Some("Verano en la playa".into()),
//!         message: Some("Siempre con nosotros.".into()),
//!         ..MemorialEntry::default()
//!     }])
//!     .with_title("Familia García");
//!
//!     let config = RenderConfig::builder().assets_root("public").build()?;
//!     let output = generate(request, &config).await?;
//!     std::fs::write("memorial.pdf", &output.pdf)?;
//!     eprintln!("{} pages, {} placeholders",
//!         output.stats.total_pages, output.stats.placeholders);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `memorial-pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! memorial-pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod model;
pub mod output;
pub mod phrases;
pub mod pipeline;
pub mod progress;
pub mod server;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{RenderConfig, RenderConfigBuilder, ServerConfig};
pub use error::{AssetError, MemorialError};
pub use generate::{generate, generate_sync, generate_to_file, render_document};
pub use model::{DocumentRequest, MemorialEntry, Timestamp, DEFAULT_TITLE};
pub use output::{ImageOutcome, MemorialOutput, MessageLayout, PageKind, PageReport, RenderStats};
pub use pipeline::normalize::normalize;
pub use progress::{NoopProgressCallback, ProgressCallback, RenderProgressCallback};
pub use server::{router, run_server};
pub use stream::{generate_stream, pdf_byte_stream, PdfByteStream};
