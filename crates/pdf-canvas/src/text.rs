//! Base-14 Helvetica metrics and paragraph layout.
//!
//! Widths come from the Adobe AFM files (units per 1000 em). Accented
//! letters share the advance of their base letter in every Helvetica face,
//! so only the base glyphs and the non-letter Latin-1 symbols are tabulated.
//!
//! Line metrics come from the font box: a line is
//! `(ascender − descender + gap) / 1000 × size` tall, the baseline sits
//! `ascender / 1000 × size` below the top of the line, and an optional extra
//! `line_gap` is added after every line.

use crate::encoding::encode_char;

/// The three Helvetica faces registered in every document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
}

impl Font {
    pub const ALL: [Font; 3] = [Font::Helvetica, Font::HelveticaBold, Font::HelveticaOblique];

    /// PostScript name written into the font dictionary.
    pub fn base_name(self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
            Font::HelveticaOblique => "Helvetica-Oblique",
        }
    }

    /// Resource key used inside page content streams.
    pub(crate) fn resource_name(self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
            Font::HelveticaOblique => "F3",
        }
    }

    fn is_bold(self) -> bool {
        matches!(self, Font::HelveticaBold)
    }

    /// Distance from the top of a line to its baseline.
    pub fn ascent(self, size: f32) -> f32 {
        718.0 / 1000.0 * size
    }

    /// Natural line height including the font's built-in gap.
    pub fn line_height(self, size: f32) -> f32 {
        let units = if self.is_bold() { 1190.0 } else { 1156.0 };
        units / 1000.0 * size
    }

    /// Advance width of one character in 1/1000 em.
    pub fn char_width(self, c: char) -> u16 {
        let table = if self.is_bold() { &BOLD_ASCII } else { &REGULAR_ASCII };
        let Some(code) = encode_char(c) else {
            return table[(b'?' - 0x20) as usize];
        };
        if (0x20..=0x7e).contains(&code) {
            return table[(code - 0x20) as usize];
        }
        if let Some(base) = base_letter(c) {
            return table[(base as u8 - 0x20) as usize];
        }
        symbol_width(c, self.is_bold()).unwrap_or(556)
    }

    /// Width of `text` at `size` points.
    pub fn text_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| self.char_width(c) as u32).sum();
        units as f32 / 1000.0 * size
    }
}

// ── AFM tables (0x20..=0x7E) ──────────────────────────────────────────────────

#[rustfmt::skip]
const REGULAR_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
const BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

/// Unaccented base of an accented WinAnsi letter.
fn base_letter(c: char) -> Option<char> {
    let base = match c {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'Ç' => 'C',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'Ñ' => 'N',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'Ý' | 'Ÿ' => 'Y',
        'Š' => 'S',
        'Ž' => 'Z',
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'š' => 's',
        'ž' => 'z',
        _ => return None,
    };
    Some(base)
}

fn symbol_width(c: char, bold: bool) -> Option<u16> {
    let (regular, heavy) = match c {
        '\u{a0}' => (278, 278),
        '¡' => (333, 333),
        '¦' => (260, 280),
        '¨' | '¯' | '´' | '¸' | '²' | '³' | '¹' | '\u{ad}' | 'ˆ' | '˜' => (333, 333),
        '©' | '®' => (737, 737),
        'ª' => (370, 370),
        'º' => (365, 365),
        '¬' | '±' | '×' | '÷' => (584, 584),
        '°' => (400, 400),
        'µ' => (556, 611),
        '¶' => (537, 556),
        '·' => (278, 278),
        '¼' | '½' | '¾' => (834, 834),
        '¿' => (611, 611),
        'Æ' | '…' | '‰' | 'Œ' | '—' | '™' => (1000, 1000),
        'æ' => (889, 889),
        'Ø' => (778, 778),
        'ø' => (611, 611),
        'Ð' => (722, 722),
        'ð' => (556, 611),
        'Þ' => (667, 667),
        'þ' => (556, 611),
        'ß' => (611, 611),
        'œ' => (944, 944),
        '‚' | '‘' | '’' => (222, 278),
        '„' | '“' | '”' => (333, 500),
        '‹' | '›' => (333, 333),
        '•' => (350, 350),
        _ => return None,
    };
    Some(if bold { heavy } else { regular })
}

// ── Layout ───────────────────────────────────────────────────────────────────

/// Horizontal alignment inside the layout box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
    /// Stretch inter-word spacing on every line except a paragraph's last.
    Justify,
}

/// How a block of text is laid out and drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOptions {
    pub font: Font,
    pub size: f32,
    /// Box width. `None` extends to the right page margin.
    pub width: Option<f32>,
    /// Box height. Lines that do not fit are dropped.
    pub height: Option<f32>,
    pub align: Align,
    /// Extra space added after every line.
    pub line_gap: f32,
    /// Replace the tail of the last visible line with `…` when lines are dropped.
    pub ellipsis: bool,
}

impl TextOptions {
    pub fn new(font: Font, size: f32) -> Self {
        Self {
            font,
            size,
            width: None,
            height: None,
            align: Align::Left,
            line_gap: 0.0,
            ellipsis: false,
        }
    }

    pub fn width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: f32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn line_gap(mut self, gap: f32) -> Self {
        self.line_gap = gap;
        self
    }

    pub fn ellipsis(mut self, on: bool) -> Self {
        self.ellipsis = on;
        self
    }

    /// Vertical distance between consecutive baselines.
    pub fn line_advance(&self) -> f32 {
        self.font.line_height(self.size) + self.line_gap
    }
}

/// One wrapped line.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    pub width: f32,
    /// Last line of its paragraph; never stretched by [`Align::Justify`].
    pub ends_paragraph: bool,
}

/// The result of laying out a block of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub lines: Vec<Line>,
    pub line_advance: f32,
    /// Box width the lines were wrapped to.
    pub width: f32,
    /// Lines were dropped to honour [`TextOptions::height`].
    pub truncated: bool,
}

impl TextLayout {
    pub fn height(&self) -> f32 {
        self.lines.len() as f32 * self.line_advance
    }
}

const EPS: f32 = 1e-3;

/// Greedy word wrap. Paragraphs are separated by `\n`; words longer than
/// `max_width` are broken between characters.
pub fn wrap(text: &str, font: Font, size: f32, max_width: f32) -> Vec<Line> {
    let space = font.text_width(" ", size);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_w = 0.0f32;

        for word in paragraph.split_whitespace() {
            let word_w = font.text_width(word, size);
            if !current.is_empty() {
                if current_w + space + word_w <= max_width + EPS {
                    current.push(' ');
                    current.push_str(word);
                    current_w += space + word_w;
                    continue;
                }
                lines.push(Line {
                    text: std::mem::take(&mut current),
                    width: current_w,
                    ends_paragraph: false,
                });
            }

            if word_w <= max_width + EPS {
                current.push_str(word);
                current_w = word_w;
            } else {
                let mut chunks = break_word(word, font, size, max_width);
                let (tail, tail_w) = chunks.pop().unwrap_or_default();
                lines.extend(chunks.into_iter().map(|(text, width)| Line {
                    text,
                    width,
                    ends_paragraph: false,
                }));
                current = tail;
                current_w = tail_w;
            }
        }

        lines.push(Line {
            text: current,
            width: current_w,
            ends_paragraph: true,
        });
    }

    lines
}

fn break_word(word: &str, font: Font, size: f32, max_width: f32) -> Vec<(String, f32)> {
    let mut chunks = Vec::new();
    let mut chunk = String::new();
    let mut chunk_w = 0.0f32;
    for c in word.chars() {
        let w = font.char_width(c) as f32 / 1000.0 * size;
        if !chunk.is_empty() && chunk_w + w > max_width + EPS {
            chunks.push((std::mem::take(&mut chunk), chunk_w));
            chunk_w = 0.0;
        }
        chunk.push(c);
        chunk_w += w;
    }
    chunks.push((chunk, chunk_w));
    chunks
}

/// Wrap `text` into a box `width` wide, applying the height clamp and
/// ellipsis from `opts`.
pub fn layout(text: &str, opts: &TextOptions, width: f32) -> TextLayout {
    let advance = opts.line_advance();
    let mut lines = wrap(text, opts.font, opts.size, width);
    let mut truncated = false;

    if let Some(height) = opts.height {
        let max_lines = if advance > 0.0 {
            ((height + opts.line_gap) / advance + EPS).floor().max(0.0) as usize
        } else {
            lines.len()
        };
        if lines.len() > max_lines {
            truncated = true;
            lines.truncate(max_lines);
            if opts.ellipsis {
                if let Some(last) = lines.last_mut() {
                    *last = with_ellipsis(last, opts.font, opts.size, width);
                }
            }
        }
    }

    TextLayout {
        lines,
        line_advance: advance,
        width,
        truncated,
    }
}

fn with_ellipsis(line: &Line, font: Font, size: f32, max_width: f32) -> Line {
    const ELLIPSIS: char = '…';
    let ellipsis_w = font.text_width("…", size);
    let mut text = line.text.trim_end().to_string();
    while !text.is_empty() && font.text_width(&text, size) + ellipsis_w > max_width + EPS {
        text.pop();
        let trimmed = text.trim_end().len();
        text.truncate(trimmed);
    }
    text.push(ELLIPSIS);
    Line {
        width: font.text_width(&text, size),
        text,
        ends_paragraph: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accented_letters_share_base_width() {
        for font in Font::ALL {
            assert_eq!(font.char_width('é'), font.char_width('e'));
            assert_eq!(font.char_width('Ñ'), font.char_width('N'));
            assert_eq!(font.char_width('ü'), font.char_width('u'));
        }
    }

    #[test]
    fn unmappable_glyph_measures_as_replacement() {
        assert_eq!(Font::Helvetica.char_width('♥'), Font::Helvetica.char_width('?'));
    }

    #[test]
    fn text_width_scales_with_size() {
        let w10 = Font::Helvetica.text_width("Hola", 10.0);
        let w20 = Font::Helvetica.text_width("Hola", 20.0);
        assert!((w20 - 2.0 * w10).abs() < 1e-4);
        // H(722) o(556) l(222) a(556) = 2056 units
        assert!((w10 - 20.56).abs() < 1e-4);
    }

    #[test]
    fn bold_is_wider_than_regular() {
        let text = "Siempre en Nuestros Corazones";
        assert!(Font::HelveticaBold.text_width(text, 12.0) > Font::Helvetica.text_width(text, 12.0));
    }

    #[test]
    fn wrap_respects_width() {
        let text = "uno dos tres cuatro cinco seis siete ocho nueve diez";
        let lines = wrap(text, Font::Helvetica, 11.0, 80.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.width <= 80.0 + EPS, "{line:?}");
        }
        assert!(lines.last().unwrap().ends_paragraph);
        assert!(!lines[0].ends_paragraph);
        let rejoined: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(rejoined.join(" "), text);
    }

    #[test]
    fn newline_starts_a_new_paragraph() {
        let lines = wrap("primera\nsegunda", Font::Helvetica, 16.0, 500.0);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.ends_paragraph));
    }

    #[test]
    fn long_word_is_broken() {
        let word = "a".repeat(200);
        let lines = wrap(&word, Font::Helvetica, 12.0, 50.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.width <= 50.0 + EPS));
        let total: usize = lines.iter().map(|l| l.text.len()).sum();
        assert_eq!(total, 200);
    }

    #[test]
    fn empty_text_yields_one_empty_line() {
        let lines = wrap("", Font::Helvetica, 12.0, 100.0);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].text.is_empty());
    }

    #[test]
    fn height_clamp_truncates_with_ellipsis() {
        let text = "palabra ".repeat(200);
        let opts = TextOptions::new(Font::Helvetica, 11.0)
            .line_gap(4.0)
            .height(60.0)
            .ellipsis(true);
        let laid = layout(&text, &opts, 120.0);
        assert!(laid.truncated);
        assert!(laid.height() <= 60.0 + opts.line_gap + EPS);
        let last = laid.lines.last().unwrap();
        assert!(last.text.ends_with('…'), "{last:?}");
        assert!(last.width <= 120.0 + EPS);
    }

    #[test]
    fn exact_height_keeps_every_line() {
        let opts = TextOptions::new(Font::Helvetica, 11.0).line_gap(4.0);
        let natural = layout("uno dos tres cuatro cinco seis siete", &opts, 60.0);
        let clamped = layout(
            "uno dos tres cuatro cinco seis siete",
            &opts.clone().height(natural.height()),
            60.0,
        );
        assert!(!clamped.truncated);
        assert_eq!(clamped.lines, natural.lines);
    }
}
