//! Cover page: framed title with rosette, subtitle, phrase and date.

use super::layout::RenderContext;
use super::ornaments::{
    self, banded_gradient, frame, petals, SLATE_200, SLATE_400, SLATE_500, SLATE_700, SLATE_900,
};
use crate::phrases;
use pdf_canvas::{Align, Document, Font, Rect, TextOptions};

const GRADIENT_STEPS: usize = 30;
const CORNER_INSET: f32 = 50.0;
const CORNER_ARM: f32 = 30.0;

/// Draw the cover on the document's current page.
///
/// `title` must already be normalised and non-empty; `date_label` is the
/// formatted generation date.
pub fn draw_cover(doc: &mut Document, ctx: &RenderContext, title: &str, date_label: &str) {
    let (w, h) = (ctx.page_width, ctx.page_height);
    let (cx, cy) = (ctx.center_x(), ctx.center_y());

    banded_gradient(doc, Rect::new(0.0, 0.0, w, h), GRADIENT_STEPS, SLATE_700, |i| {
        0.08 - i as f32 * 0.002
    });

    frame(doc, Rect::new(0.0, 0.0, w, h).inset(20.0), SLATE_900, 3.0);
    frame(doc, Rect::new(0.0, 0.0, w, h).inset(35.0), SLATE_700, 1.5);
    corner_marks(doc, ctx);

    doc.fill_color(SLATE_900);
    doc.text(
        title,
        ctx.margin,
        cy - 80.0,
        &TextOptions::new(Font::HelveticaBold, 36.0)
            .width(ctx.content_width)
            .align(Align::Center),
    );

    let line_y = cy - 30.0;
    ornaments::rule(doc, (cx - 150.0, line_y), (cx - 40.0, line_y), SLATE_700, 2.0);
    ornaments::rule(doc, (cx + 40.0, line_y), (cx + 150.0, line_y), SLATE_700, 2.0);
    rosette(doc, cx, line_y);

    doc.fill_color(SLATE_700);
    doc.text(
        phrases::COVER_SUBTITLE,
        ctx.margin,
        line_y + 40.0,
        &TextOptions::new(Font::HelveticaOblique, 18.0)
            .width(ctx.content_width)
            .align(Align::Center),
    );

    doc.fill_color(SLATE_500);
    doc.text(
        phrases::COVER_PHRASE,
        ctx.margin,
        line_y + 80.0,
        &TextOptions::new(Font::Helvetica, 14.0)
            .width(ctx.content_width)
            .align(Align::Center)
            .line_gap(2.0),
    );

    doc.fill_color(SLATE_400);
    doc.text(
        date_label,
        ctx.margin,
        h - 80.0,
        &TextOptions::new(Font::Helvetica, 12.0)
            .width(ctx.content_width)
            .align(Align::Center),
    );
}

/// L-shaped marks in each corner, arms pointing inwards.
fn corner_marks(doc: &mut Document, ctx: &RenderContext) {
    let (w, h) = (ctx.page_width, ctx.page_height);
    let corners = [
        (CORNER_INSET, CORNER_INSET, 1.0, 1.0),
        (w - CORNER_INSET, CORNER_INSET, -1.0, 1.0),
        (CORNER_INSET, h - CORNER_INSET, 1.0, -1.0),
        (w - CORNER_INSET, h - CORNER_INSET, -1.0, -1.0),
    ];
    doc.stroke_color(SLATE_400).line_width(2.0);
    for (x, y, dx, dy) in corners {
        doc.move_to(x, y)
            .line_to(x + dx * CORNER_ARM, y)
            .move_to(x, y)
            .line_to(x, y + dy * CORNER_ARM)
            .stroke();
    }
}

/// Three concentric circles ringed by eight small petals, 45° apart.
fn rosette(doc: &mut Document, cx: f32, cy: f32) {
    ornaments::concentric(doc, (cx, cy), &[(15.0, SLATE_500), (10.0, SLATE_400)]);
    petals(doc, (cx, cy), 8, 8.0, 3.0, SLATE_200);
    ornaments::disc(doc, cx, cy, 3.0, SLATE_500);
}
