//! The stateful document builder.
//!
//! [`Document`] mirrors the path-then-paint model of PDF itself: build a path
//! with [`rect`](Document::rect), [`circle`](Document::circle),
//! [`move_to`](Document::move_to)/[`line_to`](Document::line_to)/
//! [`bezier_curve_to`](Document::bezier_curve_to), then paint it with
//! [`fill`](Document::fill) or [`stroke`](Document::stroke). All coordinates
//! use a top-left origin with `y` growing downwards; the flip to PDF user
//! space happens here and nowhere else.
//!
//! Drawing calls never return errors. The first invalid call (non-finite
//! coordinate, bad font size) is remembered and returned by
//! [`finish`](Document::finish), so callers get a single failure point and a
//! half-valid document is never produced.

use std::collections::HashMap;

use image::DynamicImage;
use pdf_writer::{Content, Filter, Name, Pdf, Rect as PdfRect, Ref, Str, TextStr};

use crate::encoding;
use crate::error::CanvasError;
use crate::geometry::{Color, PageSize, Rect};
use crate::text::{self, Align, Font, TextLayout, TextOptions};

/// Bézier control-point factor for approximating a quarter circle.
const KAPPA: f32 = 0.552_284_8;

/// Metadata written to the document information dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
}

/// Construction options for a [`Document`].
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentOptions {
    pub size: PageSize,
    /// Right margin used when a text box has no explicit width.
    pub margin: f32,
    /// Deflate page content streams. Disable to inspect raw operators.
    pub compress: bool,
    pub info: DocumentInfo,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margin: 72.0,
            compress: true,
            info: DocumentInfo::default(),
        }
    }
}

/// Handle to an image embedded with [`Document::embed_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageId {
    index: usize,
    pub width: u32,
    pub height: u32,
}

/// A multi-page PDF under construction. The first page exists from the start.
pub struct Document {
    pdf: Pdf,
    next_id: i32,
    options: DocumentOptions,
    catalog_id: Ref,
    page_tree_id: Ref,
    fonts: Vec<(Font, Ref)>,
    finished_pages: Vec<Content>,
    current: Content,
    /// Fill alpha in 1/1000 steps → ExtGState resource name and object.
    alphas: HashMap<u16, (String, Ref)>,
    images: Vec<(String, Ref)>,
    error: Option<CanvasError>,
}

impl Document {
    pub fn new(options: DocumentOptions) -> Self {
        let mut doc = Self {
            pdf: Pdf::new(),
            next_id: 1,
            options,
            catalog_id: Ref::new(1),
            page_tree_id: Ref::new(1),
            fonts: Vec::new(),
            finished_pages: Vec::new(),
            current: Content::new(),
            alphas: HashMap::new(),
            images: Vec::new(),
            error: None,
        };
        doc.catalog_id = doc.alloc();
        doc.page_tree_id = doc.alloc();
        for font in Font::ALL {
            let id = doc.alloc();
            doc.pdf
                .type1_font(id)
                .base_font(Name(font.base_name().as_bytes()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
            doc.fonts.push((font, id));
        }
        doc
    }

    fn alloc(&mut self) -> Ref {
        let id = Ref::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn fail(&mut self, err: CanvasError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    fn check(&mut self, op: &'static str, values: &[f32]) -> bool {
        if values.iter().all(|v| v.is_finite()) {
            true
        } else {
            self.fail(CanvasError::NonFiniteGeometry { op });
            false
        }
    }

    /// Convert a top-left `y` into PDF user space.
    fn flip(&self, y: f32) -> f32 {
        self.options.size.height - y
    }

    // ── Pages ───────────────────────────────────────────────────────────────

    /// Close the current page and start a new blank one.
    pub fn add_page(&mut self) -> &mut Self {
        let done = std::mem::replace(&mut self.current, Content::new());
        self.finished_pages.push(done);
        self
    }

    pub fn page_count(&self) -> usize {
        self.finished_pages.len() + 1
    }

    pub fn width(&self) -> f32 {
        self.options.size.width
    }

    pub fn height(&self) -> f32 {
        self.options.size.height
    }

    pub fn margin(&self) -> f32 {
        self.options.margin
    }

    // ── Graphics state ──────────────────────────────────────────────────────

    pub fn fill_color(&mut self, color: Color) -> &mut Self {
        let (r, g, b) = color.components();
        self.current.set_fill_rgb(r, g, b);
        self
    }

    pub fn stroke_color(&mut self, color: Color) -> &mut Self {
        let (r, g, b) = color.components();
        self.current.set_stroke_rgb(r, g, b);
        self
    }

    pub fn line_width(&mut self, width: f32) -> &mut Self {
        if self.check("line_width", &[width]) {
            self.current.set_line_width(width.max(0.0));
        }
        self
    }

    /// Set the alpha used by subsequent fills (and text). Clamped to `0..=1`.
    pub fn fill_opacity(&mut self, alpha: f32) -> &mut Self {
        if !self.check("fill_opacity", &[alpha]) {
            return self;
        }
        let key = (alpha.clamp(0.0, 1.0) * 1000.0).round() as u16;
        if !self.alphas.contains_key(&key) {
            let id = self.alloc();
            let name = format!("GS{}", self.alphas.len() + 1);
            self.alphas.insert(key, (name, id));
        }
        if let Some((name, _)) = self.alphas.get(&key) {
            self.current.set_parameters(Name(name.as_bytes()));
        }
        self
    }

    // ── Path construction ───────────────────────────────────────────────────

    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        if self.check("move_to", &[x, y]) {
            let y = self.flip(y);
            self.current.move_to(x, y);
        }
        self
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        if self.check("line_to", &[x, y]) {
            let y = self.flip(y);
            self.current.line_to(x, y);
        }
        self
    }

    pub fn bezier_curve_to(
        &mut self,
        cp1x: f32,
        cp1y: f32,
        cp2x: f32,
        cp2y: f32,
        x: f32,
        y: f32,
    ) -> &mut Self {
        if self.check("bezier_curve_to", &[cp1x, cp1y, cp2x, cp2y, x, y]) {
            let (cp1y, cp2y, y) = (self.flip(cp1y), self.flip(cp2y), self.flip(y));
            self.current.cubic_to(cp1x, cp1y, cp2x, cp2y, x, y);
        }
        self
    }

    pub fn close_path(&mut self) -> &mut Self {
        self.current.close_path();
        self
    }

    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        if self.check("rect", &[x, y, width, height]) {
            let bottom = self.flip(y + height);
            self.current.rect(x, bottom, width, height);
        }
        self
    }

    /// Closed circle approximated by four cubic segments.
    pub fn circle(&mut self, cx: f32, cy: f32, radius: f32) -> &mut Self {
        if !self.check("circle", &[cx, cy, radius]) {
            return self;
        }
        let cy = self.flip(cy);
        let r = radius.abs();
        let k = KAPPA * r;
        let c = &mut self.current;
        c.move_to(cx + r, cy);
        c.cubic_to(cx + r, cy + k, cx + k, cy + r, cx, cy + r);
        c.cubic_to(cx - k, cy + r, cx - r, cy + k, cx - r, cy);
        c.cubic_to(cx - r, cy - k, cx - k, cy - r, cx, cy - r);
        c.cubic_to(cx + k, cy - r, cx + r, cy - k, cx + r, cy);
        c.close_path();
        self
    }

    /// Closed polygon through `points`. Fewer than two points is a no-op.
    pub fn polygon(&mut self, points: &[(f32, f32)]) -> &mut Self {
        let Some(((x0, y0), rest)) = points.split_first() else {
            return self;
        };
        if rest.is_empty() {
            return self;
        }
        self.move_to(*x0, *y0);
        for &(x, y) in rest {
            self.line_to(x, y);
        }
        self.close_path()
    }

    // ── Painting ────────────────────────────────────────────────────────────

    pub fn fill(&mut self) -> &mut Self {
        self.current.fill_nonzero();
        self
    }

    pub fn stroke(&mut self) -> &mut Self {
        self.current.stroke();
        self
    }

    // ── Text ────────────────────────────────────────────────────────────────

    fn box_width(&self, x: f32, opts: &TextOptions) -> f32 {
        opts.width
            .unwrap_or_else(|| self.options.size.width - self.options.margin - x)
            .max(0.0)
    }

    /// Height that [`text`](Self::text) would occupy with no height clamp.
    pub fn height_of_string(&self, content: &str, opts: &TextOptions, x: f32) -> f32 {
        let mut unclamped = opts.clone();
        unclamped.height = None;
        text::layout(content, &unclamped, self.box_width(x, opts)).height()
    }

    /// Lay out `content` in a box whose top-left corner is `(x, y)` and draw it
    /// with the current fill colour.
    pub fn text(&mut self, content: &str, x: f32, y: f32, opts: &TextOptions) -> TextLayout {
        let width = self.box_width(x, opts);
        let laid = text::layout(content, opts, width);

        if !(opts.size.is_finite() && opts.size > 0.0) {
            self.fail(CanvasError::InvalidFontSize { size: opts.size });
            return laid;
        }
        if !self.check("text", &[x, y, width, opts.line_gap]) || laid.lines.is_empty() {
            return laid;
        }

        let page_height = self.options.size.height;
        let ascent = opts.font.ascent(opts.size);
        let c = &mut self.current;
        c.begin_text();
        c.set_font(Name(opts.font.resource_name().as_bytes()), opts.size);
        for (i, line) in laid.lines.iter().enumerate() {
            let baseline = y + i as f32 * laid.line_advance + ascent;
            let slack = (width - line.width).max(0.0);
            let (dx, word_spacing) = match opts.align {
                Align::Left => (0.0, 0.0),
                Align::Center => (slack / 2.0, 0.0),
                Align::Right => (slack, 0.0),
                Align::Justify => {
                    let spaces = line.text.matches(' ').count();
                    if line.ends_paragraph || spaces == 0 {
                        (0.0, 0.0)
                    } else {
                        (0.0, slack / spaces as f32)
                    }
                }
            };
            c.set_word_spacing(word_spacing);
            c.set_text_matrix([1.0, 0.0, 0.0, 1.0, x + dx, page_height - baseline]);
            c.show(Str(&encoding::encode(&line.text)));
        }
        c.end_text();
        laid
    }

    // ── Images ──────────────────────────────────────────────────────────────

    /// Embed a raster image as a Flate-compressed RGB XObject, with an alpha
    /// soft mask when any pixel is translucent.
    pub fn embed_image(&mut self, image: &DynamicImage) -> Result<ImageId, CanvasError> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(CanvasError::EmptyImage);
        }
        let rgba = image.to_rgba8();
        let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);
        let rgb: Vec<u8> = rgba.pixels().flat_map(|p| [p.0[0], p.0[1], p.0[2]]).collect();
        let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb, 6);

        let mask_id = if has_alpha {
            let alpha: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
            let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&alpha, 6);
            let id = self.alloc();
            let mut mask = self.pdf.image_xobject(id, &compressed_alpha);
            mask.filter(Filter::FlateDecode);
            mask.width(width as i32);
            mask.height(height as i32);
            mask.color_space().device_gray();
            mask.bits_per_component(8);
            Some(id)
        } else {
            None
        };

        let id = self.alloc();
        let mut xobj = self.pdf.image_xobject(id, &compressed_rgb);
        xobj.filter(Filter::FlateDecode);
        xobj.width(width as i32);
        xobj.height(height as i32);
        xobj.color_space().device_rgb();
        xobj.bits_per_component(8);
        if let Some(mask_id) = mask_id {
            xobj.s_mask(mask_id);
        }
        drop(xobj);

        let index = self.images.len();
        self.images.push((format!("Im{}", index + 1), id));
        Ok(ImageId {
            index,
            width,
            height,
        })
    }

    /// Draw an embedded image scaled to fill `area` exactly.
    pub fn draw_image(&mut self, image: ImageId, area: Rect) -> &mut Self {
        if !area.is_finite() {
            self.fail(CanvasError::NonFiniteGeometry { op: "draw_image" });
            return self;
        }
        let Some((name, _)) = self.images.get(image.index) else {
            return self;
        };
        let bottom = self.options.size.height - area.bottom();
        let c = &mut self.current;
        c.save_state();
        c.transform([area.width, 0.0, 0.0, area.height, area.x, bottom]);
        c.x_object(Name(name.as_bytes()));
        c.restore_state();
        self
    }

    /// Draw an embedded image scaled to fit inside `area`, preserving its
    /// aspect ratio and centring it. Returns the rectangle actually covered.
    pub fn draw_image_fit(&mut self, image: ImageId, area: Rect) -> Rect {
        let placed = area.fit(image.width as f32, image.height as f32);
        self.draw_image(image, placed);
        placed
    }

    // ── Output ──────────────────────────────────────────────────────────────

    /// Serialise the document. Fails with the first error recorded by any
    /// drawing call.
    pub fn finish(mut self) -> Result<Vec<u8>, CanvasError> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }

        let last = std::mem::replace(&mut self.current, Content::new());
        let mut pages = std::mem::take(&mut self.finished_pages);
        pages.push(last);

        let page_ids: Vec<Ref> = (0..pages.len()).map(|_| self.alloc()).collect();
        let content_ids: Vec<Ref> = (0..pages.len()).map(|_| self.alloc()).collect();
        let info_id = self.alloc();

        for (content, id) in pages.into_iter().zip(&content_ids) {
            let raw = content.finish();
            if self.options.compress {
                let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&raw, 6);
                self.pdf.stream(*id, &compressed).filter(Filter::FlateDecode);
            } else {
                self.pdf.stream(*id, &raw);
            }
        }

        self.pdf.catalog(self.catalog_id).pages(self.page_tree_id);
        self.pdf
            .pages(self.page_tree_id)
            .kids(page_ids.iter().copied())
            .count(page_ids.len() as i32);

        let mut alphas: Vec<(u16, String, Ref)> = self
            .alphas
            .iter()
            .map(|(key, (name, id))| (*key, name.clone(), *id))
            .collect();
        alphas.sort_by(|a, b| a.1.cmp(&b.1));
        for (key, _, id) in &alphas {
            let alpha = *key as f32 / 1000.0;
            self.pdf
                .ext_graphics(*id)
                .non_stroking_alpha(alpha)
                .stroking_alpha(alpha);
        }

        let media_box = PdfRect::new(0.0, 0.0, self.options.size.width, self.options.size.height);
        for (page_id, content_id) in page_ids.iter().zip(&content_ids) {
            let mut page = self.pdf.page(*page_id);
            page.media_box(media_box)
                .parent(self.page_tree_id)
                .contents(*content_id);
            let mut resources = page.resources();
            {
                let mut fonts = resources.fonts();
                for (font, id) in &self.fonts {
                    fonts.pair(Name(font.resource_name().as_bytes()), *id);
                }
            }
            if !alphas.is_empty() {
                let mut states = resources.ext_g_states();
                for (_, name, id) in &alphas {
                    states.pair(Name(name.as_bytes()), *id);
                }
            }
            if !self.images.is_empty() {
                let mut xobjects = resources.x_objects();
                for (name, id) in &self.images {
                    xobjects.pair(Name(name.as_bytes()), *id);
                }
            }
        }

        let info = &self.options.info;
        let mut dict = self.pdf.document_info(info_id);
        if let Some(title) = &info.title {
            dict.title(TextStr(title));
        }
        if let Some(creator) = &info.creator {
            dict.creator(TextStr(creator));
        }
        if let Some(producer) = &info.producer {
            dict.producer(TextStr(producer));
        }
        drop(dict);

        Ok(self.pdf.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn raw_doc() -> Document {
        Document::new(DocumentOptions {
            size: PageSize::A4.landscape(),
            margin: 40.0,
            compress: false,
            info: DocumentInfo {
                title: Some("Prueba".into()),
                ..DocumentInfo::default()
            },
        })
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn page_objects(bytes: &[u8]) -> usize {
        bytes
            .windows(b"/Type /Page".len() + 1)
            .filter(|w| w.starts_with(b"/Type /Page") && w[w.len() - 1] != b's')
            .count()
    }

    #[test]
    fn new_document_has_one_page() {
        let doc = raw_doc();
        assert_eq!(doc.page_count(), 1);
        let bytes = doc.finish().unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(page_objects(&bytes), 1);
    }

    #[test]
    fn add_page_increments_count() {
        let mut doc = raw_doc();
        doc.add_page().add_page();
        assert_eq!(doc.page_count(), 3);
        let bytes = doc.finish().unwrap();
        assert_eq!(page_objects(&bytes), 3);
    }

    #[test]
    fn text_uses_winansi_type1_fonts() {
        let mut doc = raw_doc();
        doc.fill_color(Color::BLACK);
        doc.text("Hola mundo", 40.0, 40.0, &TextOptions::new(Font::Helvetica, 12.0));
        let bytes = doc.finish().unwrap();
        assert!(contains(&bytes, b"(Hola mundo) Tj"));
        assert!(contains(&bytes, b"/Helvetica-Bold"));
        assert!(contains(&bytes, b"/WinAnsiEncoding"));
    }

    #[test]
    fn opacity_creates_shared_ext_gstate() {
        let mut doc = raw_doc();
        doc.fill_opacity(0.5).rect(0.0, 0.0, 10.0, 10.0).fill();
        doc.fill_opacity(0.5).rect(0.0, 0.0, 10.0, 10.0).fill();
        doc.fill_opacity(1.0);
        let bytes = doc.finish().unwrap();
        assert!(contains(&bytes, b"/GS1 gs"));
        assert!(contains(&bytes, b"/GS2 gs"));
        assert!(!contains(&bytes, b"/GS3"));
        assert!(contains(&bytes, b"/CA 0.5"));
    }

    #[test]
    fn rect_is_flipped_into_pdf_space() {
        let mut doc = Document::new(DocumentOptions {
            size: PageSize {
                width: 600.0,
                height: 800.0,
            },
            compress: false,
            ..DocumentOptions::default()
        });
        doc.rect(10.0, 20.0, 30.0, 40.0).fill();
        let bytes = doc.finish().unwrap();
        assert!(contains(&bytes, b"10 740 30 40 re"));
    }

    #[test]
    fn non_finite_geometry_fails_at_finish() {
        let mut doc = raw_doc();
        doc.circle(f32::NAN, 10.0, 5.0).fill();
        doc.rect(0.0, 0.0, 1.0, 1.0).fill();
        let err = doc.finish().unwrap_err();
        assert!(matches!(err, CanvasError::NonFiniteGeometry { op: "circle" }));
    }

    #[test]
    fn zero_font_size_fails_at_finish() {
        let mut doc = raw_doc();
        doc.text("x", 0.0, 0.0, &TextOptions::new(Font::Helvetica, 0.0));
        assert!(matches!(
            doc.finish().unwrap_err(),
            CanvasError::InvalidFontSize { .. }
        ));
    }

    #[test]
    fn image_with_alpha_gets_soft_mask() {
        let mut doc = raw_doc();
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 2, Rgba([255, 0, 0, 128])));
        let id = doc.embed_image(&img).unwrap();
        let placed = doc.draw_image_fit(id, Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(placed.width, 100.0);
        assert_eq!(placed.height, 50.0);
        let bytes = doc.finish().unwrap();
        assert!(contains(&bytes, b"/SMask"));
        assert!(contains(&bytes, b"/Im1 Do"));
    }

    #[test]
    fn empty_image_is_rejected() {
        let mut doc = raw_doc();
        let img = DynamicImage::ImageRgba8(RgbaImage::new(0, 0));
        assert!(matches!(doc.embed_image(&img), Err(CanvasError::EmptyImage)));
    }

    #[test]
    fn default_text_width_runs_to_right_margin() {
        let doc = raw_doc();
        let opts = TextOptions::new(Font::Helvetica, 12.0);
        let one_line = doc.height_of_string("12 de 30", &opts, doc.width() - 120.0);
        assert!((one_line - Font::Helvetica.line_height(12.0)).abs() < 1e-4);
    }
}
