//! Entry page: framed photo (or placeholder) beside a text panel.
//!
//! ## Field resolution
//!
//! Every optional field of a [`MemorialEntry`] is resolved exactly once into
//! an [`EntryFields`] before drawing starts: text is normalised and empty
//! results dropped, the photo is loaded (or the failure recorded), and the
//! timestamp formatted. The drawing code then only branches on `Option`s and
//! never touches the file system or the raw request.

use super::assets;
use super::layout::{EntryRegions, RenderContext};
use super::normalize::normalize_field;
use super::ornaments::{
    self, banded_gradient, frame, GOLD, SLATE_200, SLATE_300, SLATE_400, SLATE_50, SLATE_500,
    SLATE_700, SLATE_900,
};
use crate::config::RenderConfig;
use crate::error::AssetError;
use crate::model::MemorialEntry;
use crate::output::{ImageOutcome, MessageLayout, PageKind, PageReport};
use crate::phrases;
use image::DynamicImage;
use pdf_canvas::{Align, Color, Document, Font, Rect, TextOptions};
use tracing::{debug, warn};

const MESSAGE_FONT_SIZE: f32 = 11.0;
const MESSAGE_LINE_GAP: f32 = 4.0;

/// Photo state after resolution.
#[derive(Debug)]
pub enum Photo {
    Loaded(DynamicImage),
    Absent,
    Failed(AssetError),
}

/// An entry with every optional field resolved.
#[derive(Debug)]
pub struct EntryFields {
    pub title: Option<String>,
    pub message: Option<String>,
    pub date_label: Option<String>,
    pub photo: Photo,
}

impl EntryFields {
    pub fn resolve(entry: &MemorialEntry, config: &RenderConfig) -> Self {
        let photo = match entry.file.as_deref() {
            None => Photo::Absent,
            Some(file) => {
                match assets::load_image(&config.assets_root, file, config.max_image_pixels) {
                    Ok(img) => Photo::Loaded(img),
                    Err(e) => Photo::Failed(e),
                }
            }
        };
        Self {
            title: normalize_field(entry.title.as_deref()),
            message: normalize_field(entry.message.as_deref()),
            date_label: entry
                .created_at
                .map(|ts| phrases::format_date_time(ts.wall_clock(config.utc_offset))),
            photo,
        }
    }
}

/// Append one page for entry `index` (1-based) of `total`.
///
/// Photo problems never fail the page: the placeholder is drawn and the
/// reason recorded in the returned report.
pub fn draw_entry(
    doc: &mut Document,
    ctx: &RenderContext,
    fields: EntryFields,
    index: usize,
    total: usize,
) -> PageReport {
    doc.add_page();
    let mut report = PageReport::new(doc.page_count(), PageKind::Entry { index, total });
    let regions = ctx.entry_regions();

    doc.fill_color(SLATE_50)
        .fill_opacity(0.3)
        .rect(0.0, 0.0, ctx.page_width, ctx.page_height)
        .fill()
        .fill_opacity(1.0);
    frame(doc, ctx.content(), SLATE_200, 2.0);

    let footer = phrases::page_indicator(index, total);
    doc.fill_color(SLATE_700);
    doc.text(
        &footer,
        ctx.page_width - 120.0,
        ctx.margin + 15.0,
        &TextOptions::new(Font::Helvetica, 12.0),
    );
    report.footer = Some(footer);

    let image = regions.image;
    frame(doc, image.inset(-10.0), SLATE_300, 3.0);
    frame(doc, image.inset(-5.0), SLATE_200, 1.0);

    let outcome = match fields.photo {
        Photo::Loaded(img) => match doc.embed_image(&img) {
            Ok(id) => {
                doc.draw_image_fit(id, image);
                ImageOutcome::Embedded {
                    width: id.width,
                    height: id.height,
                }
            }
            Err(e) => {
                warn!("Page {}: photo could not be embedded: {}", report.page_num, e);
                placeholder(doc, image);
                ImageOutcome::Fallback
            }
        },
        Photo::Absent => {
            placeholder(doc, image);
            ImageOutcome::Absent
        }
        Photo::Failed(err) => {
            warn!("Page {}: {}; drawing placeholder", report.page_num, err);
            placeholder(doc, image);
            report.asset_error = Some(err);
            ImageOutcome::Fallback
        }
    };
    report.image = Some(outcome);

    report.message = text_panel(
        doc,
        &regions,
        fields.title.as_deref(),
        fields.message.as_deref(),
        fields.date_label.as_deref(),
    );

    ornaments::concentric(
        doc,
        (ctx.page_width - 60.0, ctx.page_height - 60.0),
        &[(15.0, SLATE_200), (10.0, SLATE_300), (5.0, SLATE_400)],
    );

    debug!(
        "Entry page {} drawn ({} de {}, image {:?})",
        report.page_num, index, total, outcome
    );
    report
}

fn text_panel(
    doc: &mut Document,
    regions: &EntryRegions,
    title: Option<&str>,
    message: Option<&str>,
    date_label: Option<&str>,
) -> Option<MessageLayout> {
    let t = regions.text;
    let panel = Rect::new(t.x - 15.0, t.y - 15.0, t.width + 30.0, t.height + 30.0);
    doc.fill_color(SLATE_50)
        .rect(panel.x, panel.y, panel.width, panel.height)
        .fill();
    frame(doc, panel, SLATE_300, 2.0);

    if let Some(title) = title {
        doc.fill_color(SLATE_900);
        doc.text(
            title,
            t.x,
            t.y + 20.0,
            &TextOptions::new(Font::HelveticaBold, 16.0)
                .width(t.width)
                .align(Align::Center),
        );
    }

    ornaments::rule(
        doc,
        (t.x + 15.0, t.y + 55.0),
        (t.right() - 15.0, t.y + 55.0),
        SLATE_400,
        1.0,
    );

    let layout = message.map(|message| message_block(doc, regions, message));

    if let Some(date) = date_label {
        doc.fill_color(SLATE_500);
        doc.text(
            date,
            t.x,
            t.y + t.height - 30.0,
            &TextOptions::new(Font::HelveticaOblique, 10.0)
                .width(t.width)
                .align(Align::Center),
        );
    }

    layout
}

/// Message inside a white quoted panel, clamped to the space between the
/// title rule and the date line.
fn message_block(doc: &mut Document, regions: &EntryRegions, message: &str) -> MessageLayout {
    let t = regions.text;
    let top = t.y + EntryRegions::MESSAGE_TOP;
    let text_x = t.x + 25.0;

    let base = TextOptions::new(Font::Helvetica, MESSAGE_FONT_SIZE)
        .width(t.width - 40.0)
        .align(Align::Justify)
        .line_gap(MESSAGE_LINE_GAP);
    let natural_height = doc.height_of_string(message, &base, text_x);
    let panel_height = natural_height.min(regions.message_max_height());

    let inner = Rect::new(t.x + 8.0, top - 10.0, t.width - 16.0, panel_height + 20.0);
    doc.fill_color(Color::WHITE)
        .rect(inner.x, inner.y, inner.width, inner.height)
        .fill();
    frame(doc, inner, SLATE_200, 1.0);

    let quote = TextOptions::new(Font::HelveticaBold, 18.0);
    doc.fill_color(SLATE_400);
    doc.text(phrases::OPEN_QUOTE, t.x + 15.0, top - 5.0, &quote);

    doc.fill_color(SLATE_700);
    let laid = doc.text(
        message,
        text_x,
        top + 5.0,
        &base.height(panel_height).ellipsis(true),
    );

    doc.fill_color(SLATE_400);
    doc.text(
        phrases::CLOSE_QUOTE,
        t.right() - 25.0,
        top + panel_height - 15.0,
        &quote,
    );

    MessageLayout {
        natural_height,
        panel_height,
        truncated: laid.truncated,
        lines: laid.lines.len(),
    }
}

/// Soft banded backdrop with a framed "photo" icon: circle, picture frame,
/// sun and mountain.
pub fn placeholder(doc: &mut Document, area: Rect) {
    banded_gradient(doc, area, 20, SLATE_200, |i| 0.1 + i as f32 / 20.0 * 0.1);
    frame(doc, area.inset(20.0), SLATE_300, 2.0);

    let size = 80.0_f32.min(area.width * 0.3).min(area.height * 0.3);
    let x = area.x + (area.width - size) / 2.0;
    let y = area.y + (area.height - size) / 2.0;
    let (cx, cy) = (x + size / 2.0, y + size / 2.0);

    ornaments::disc(doc, cx, cy, size / 2.0, SLATE_50);
    doc.stroke_color(SLATE_300)
        .line_width(2.0)
        .circle(cx, cy, size / 2.0)
        .stroke();

    frame(
        doc,
        Rect::new(x + 15.0, y + 15.0, size - 30.0, (size - 30.0) * 0.7),
        SLATE_400,
        3.0,
    );
    ornaments::disc(doc, x + 25.0, y + 25.0, 8.0, GOLD);
    doc.fill_color(SLATE_300)
        .polygon(&[
            (x + 15.0, y + size - 15.0),
            (x + 40.0, y + 40.0),
            (x + 65.0, y + size - 15.0),
        ])
        .fill();
}
