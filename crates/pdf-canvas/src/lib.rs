//! # pdf-canvas
//!
//! A small, stateful drawing surface on top of [`pdf_writer`].
//!
//! `pdf_writer` is deliberately low level: object references, content
//! operators, and a bottom-left origin. Page layouts written by hand are far
//! easier to read in the coordinate system designers use, so this crate
//! provides:
//!
//! - a top-left origin with `y` growing downwards,
//! - chainable path building and painting ([`Document::rect`],
//!   [`Document::circle`], [`Document::bezier_curve_to`], ...),
//! - fill opacity through shared `ExtGState` resources,
//! - wrapped, aligned, height-clamped text in the base-14 Helvetica faces
//!   with exact AFM metrics ([`text::layout`]),
//! - RGB(A) raster images with soft masks.
//!
//! ```rust
//! use pdf_canvas::{Color, Document, DocumentOptions, Font, TextOptions};
//!
//! let mut doc = Document::new(DocumentOptions::default());
//! doc.fill_color(Color::hex(0x2d3748))
//!     .rect(40.0, 40.0, 200.0, 100.0)
//!     .fill();
//! doc.text("Hola", 50.0, 50.0, &TextOptions::new(Font::HelveticaBold, 18.0));
//! let bytes = doc.finish().unwrap();
//! assert!(bytes.starts_with(b"%PDF"));
//! ```
//!
//! ## Why a sticky error?
//!
//! Layout code issues hundreds of drawing calls. Threading a `Result` through
//! each one buries the layout; instead the first invalid call is recorded and
//! returned once from [`Document::finish`].

mod document;
pub mod encoding;
mod error;
pub mod geometry;
pub mod text;

pub use document::{Document, DocumentInfo, DocumentOptions, ImageId};
pub use error::CanvasError;
pub use geometry::{Color, PageSize, Rect};
pub use text::{Align, Font, TextLayout, TextOptions};
