use thiserror::Error;

/// Failures surfaced by [`Document::finish`](crate::Document::finish) or
/// [`Document::embed_image`](crate::Document::embed_image).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CanvasError {
    #[error("non-finite coordinate passed to `{op}`")]
    NonFiniteGeometry { op: &'static str },

    #[error("image has zero width or height")]
    EmptyImage,

    #[error("invalid font size {size}")]
    InvalidFontSize { size: f32 },
}
