//! Shared palette and decorative drawing helpers.
//!
//! Every page uses the same slate/grey palette; the helpers here draw the
//! pieces that recur across pages (banded gradients, frames, circles). The
//! page renderers compose them and own all positioning.

use pdf_canvas::{Color, Document, Rect};

// ── Palette ──────────────────────────────────────────────────────────────────

pub const SLATE_900: Color = Color::hex(0x2d3748);
pub const SLATE_700: Color = Color::hex(0x4a5568);
pub const SLATE_500: Color = Color::hex(0x718096);
pub const SLATE_400: Color = Color::hex(0xa0aec0);
pub const SLATE_300: Color = Color::hex(0xcbd5e0);
pub const SLATE_200: Color = Color::hex(0xe2e8f0);
pub const SLATE_50: Color = Color::hex(0xf7fafc);
pub const GOLD: Color = Color::hex(0xffd93d);
pub const HEART_RED: Color = Color::hex(0xe53e3e);

/// Draw `steps` horizontal bands covering `area` top to bottom, band `i`
/// filled with `color` at `opacity(i)`. Opacity is reset to 1 afterwards.
pub fn banded_gradient(
    doc: &mut Document,
    area: Rect,
    steps: usize,
    color: Color,
    opacity: impl Fn(usize) -> f32,
) {
    let band = area.height / steps as f32;
    doc.fill_color(color);
    for i in 0..steps {
        doc.fill_opacity(opacity(i).max(0.0))
            .rect(area.x, area.y + i as f32 * band, area.width, band)
            .fill();
    }
    doc.fill_opacity(1.0);
}

/// Stroke a rectangle outline.
pub fn frame(doc: &mut Document, area: Rect, color: Color, width: f32) {
    doc.stroke_color(color)
        .line_width(width)
        .rect(area.x, area.y, area.width, area.height)
        .stroke();
}

/// Fill a circle.
pub fn disc(doc: &mut Document, cx: f32, cy: f32, radius: f32, color: Color) {
    doc.fill_color(color).circle(cx, cy, radius).fill();
}

/// Stroke a straight segment.
pub fn rule(doc: &mut Document, from: (f32, f32), to: (f32, f32), color: Color, width: f32) {
    doc.stroke_color(color)
        .line_width(width)
        .move_to(from.0, from.1)
        .line_to(to.0, to.1)
        .stroke();
}

/// Fill `count` circles of `radius` evenly spaced on a ring of `distance`
/// around `(cx, cy)`, starting at angle zero.
pub fn petals(
    doc: &mut Document,
    (cx, cy): (f32, f32),
    count: usize,
    distance: f32,
    radius: f32,
    color: Color,
) {
    doc.fill_color(color);
    let step = std::f32::consts::TAU / count as f32;
    for i in 0..count {
        let angle = i as f32 * step;
        doc.circle(cx + angle.cos() * distance, cy + angle.sin() * distance, radius)
            .fill();
    }
}

/// Concentric filled circles, drawn largest first.
pub fn concentric(doc: &mut Document, (cx, cy): (f32, f32), rings: &[(f32, Color)]) {
    for &(radius, color) in rings {
        disc(doc, cx, cy, radius, color);
    }
}
