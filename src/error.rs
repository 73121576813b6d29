//! Error types for the memorial-pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`MemorialError`] — **Fatal**: the document cannot be produced at all
//!   (malformed request, drawing failure, cancelled render). Returned as
//!   `Err(MemorialError)` from the top-level `generate*` functions and mapped
//!   to an HTTP status by the server.
//!
//! * [`AssetError`] — **Non-fatal**: one entry's photo could not be used
//!   (missing file, unreadable, not an image). The page still renders with a
//!   placeholder; the error is stored in [`crate::output::PageReport`] so
//!   callers can see what was substituted.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the memorial-pdf library.
#[derive(Debug, Error)]
pub enum MemorialError {
    // ── Request errors ────────────────────────────────────────────────────
    /// The request body is missing `data`, or `data` is not an array.
    #[error("Datos del memorial requeridos")]
    MissingEntries,

    /// The request is structurally valid but one field has the wrong shape.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // ── Render errors ─────────────────────────────────────────────────────
    /// The drawing layer rejected an operation. No partial document is
    /// returned.
    #[error("PDF rendering failed: {0}")]
    Render(#[from] pdf_canvas::CanvasError),

    /// The render was cancelled before it completed (client went away).
    #[error("Render cancelled before page {page}")]
    Cancelled { page: usize },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP listener could not be bound or the server loop failed.
    #[error("Server error: {0}")]
    Server(#[source] std::io::Error),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. the blocking render task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MemorialError {
    /// True when the failure was caused by the caller's input rather than by
    /// the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            MemorialError::MissingEntries | MemorialError::InvalidRequest(_)
        )
    }
}

/// A non-fatal error for one entry's photo.
///
/// The entry page is still produced, with the placeholder illustration in
/// place of the photo.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum AssetError {
    /// The reference escapes the assets root (absolute path or `..`).
    #[error("Asset path '{file}' is not allowed")]
    InvalidPath { file: String },

    /// Nothing exists at the resolved path.
    #[error("Asset '{file}' not found")]
    NotFound { file: String },

    /// The file exists but could not be read.
    #[error("Asset '{file}' could not be read: {detail}")]
    Unreadable { file: String, detail: String },

    /// The bytes are not a supported image (PNG or JPEG).
    #[error("Asset '{file}' is not a decodable image: {detail}")]
    Undecodable { file: String, detail: String },
}
