//! Closing page: heart, headline, farewell and floral corners.

use super::layout::RenderContext;
use super::ornaments::{
    banded_gradient, disc, frame, petals, GOLD, HEART_RED, SLATE_200, SLATE_700, SLATE_900,
};
use crate::phrases;
use pdf_canvas::{Align, Document, Font, Rect, TextOptions};

const GRADIENT_STEPS: usize = 40;
const FLORAL_INSET: f32 = 80.0;

/// Append the closing page.
pub fn draw_closing(doc: &mut Document, ctx: &RenderContext) {
    doc.add_page();
    let (w, h) = (ctx.page_width, ctx.page_height);
    let (cx, cy) = (ctx.center_x(), ctx.center_y());

    banded_gradient(doc, Rect::new(0.0, 0.0, w, h), GRADIENT_STEPS, SLATE_700, |i| {
        0.05 - i as f32 * 0.001
    });
    frame(doc, ctx.content().inset(20.0), SLATE_900, 2.0);

    heart(doc, cx, cy - 50.0);

    doc.fill_color(SLATE_900);
    doc.text(
        phrases::CLOSING_HEADLINE,
        ctx.margin,
        cy + 20.0,
        &TextOptions::new(Font::HelveticaBold, 28.0)
            .width(ctx.content_width)
            .align(Align::Center),
    );

    doc.fill_color(SLATE_700);
    doc.text(
        phrases::CLOSING_MESSAGE,
        ctx.margin,
        cy + 70.0,
        &TextOptions::new(Font::HelveticaOblique, 16.0)
            .width(ctx.content_width)
            .align(Align::Center)
            .line_gap(5.0),
    );

    for (x, y) in [
        (FLORAL_INSET, FLORAL_INSET),
        (w - FLORAL_INSET, FLORAL_INSET),
        (FLORAL_INSET, h - FLORAL_INSET),
        (w - FLORAL_INSET, h - FLORAL_INSET),
    ] {
        doc.fill_opacity(0.7);
        petals(doc, (x, y), 6, 12.0, 8.0, SLATE_200);
        doc.fill_opacity(1.0);
        disc(doc, x, y, 5.0, GOLD);
    }
}

/// Two lobes and a point, as four cubic segments, at 80 % opacity.
fn heart(doc: &mut Document, cx: f32, cy: f32) {
    doc.fill_color(HEART_RED)
        .fill_opacity(0.8)
        .move_to(cx, cy + 20.0)
        .bezier_curve_to(cx - 30.0, cy - 10.0, cx - 30.0, cy - 30.0, cx - 15.0, cy - 30.0)
        .bezier_curve_to(cx - 7.0, cy - 30.0, cx, cy - 22.0, cx, cy - 15.0)
        .bezier_curve_to(cx, cy - 22.0, cx + 7.0, cy - 30.0, cx + 15.0, cy - 30.0)
        .bezier_curve_to(cx + 30.0, cy - 30.0, cx + 30.0, cy - 10.0, cx, cy + 20.0)
        .fill()
        .fill_opacity(1.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf_canvas::DocumentOptions;

    #[test]
    fn closing_appends_one_page_with_headline() {
        let ctx = RenderContext::a4_landscape(40.0);
        let mut doc = Document::new(DocumentOptions {
            size: ctx.page_size(),
            margin: ctx.margin,
            compress: false,
            ..DocumentOptions::default()
        });
        draw_closing(&mut doc, &ctx);
        assert_eq!(doc.page_count(), 2);
        let bytes = doc.finish().unwrap();
        let needle = b"(Siempre en Nuestros Corazones) Tj";
        assert!(bytes.windows(needle.len()).any(|w| w == needle));
        assert!(bytes.windows(5).any(|w| w == b"/CA 0"));
    }
}
