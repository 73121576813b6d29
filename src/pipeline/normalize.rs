//! Text normalisation: deterministic cleanup of user-supplied strings.
//!
//! ## Why is normalisation necessary?
//!
//! Titles and messages come from browser forms and phone keyboards. They may
//! contain decomposed accents (`e` + U+0301), emoji that the base-14 PDF
//! fonts cannot draw, private-use glyphs from vendor keyboards, and stray
//! line breaks. Drawing any of those produces tofu or `?` boxes, so every
//! string passes through [`normalize`] before it reaches a page.
//!
//! ## Rule Order
//!
//! 1. Replace the mojibake sequence `%Ð` with `♥`
//! 2. Unicode NFC composition
//! 3. Strip pictographic emoji blocks
//! 4. Strip dingbats, private use, and the remaining supplementary symbol blocks
//! 5. Collapse whitespace runs to one space and trim
//!
//! Stripping can bring a `%` next to a `Ð`, or a combining mark next to its
//! base letter, so the rules repeat until the text stops changing. That makes
//! `normalize(normalize(s)) == normalize(s)` hold for every input.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Upper bound on rule rounds; real inputs settle in one or two.
const MAX_ROUNDS: usize = 8;

/// Clean a user string for drawing.
pub fn normalize(input: &str) -> String {
    let mut current = apply_rules(input);
    for _ in 1..MAX_ROUNDS {
        let next = apply_rules(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Normalise an optional field, treating an empty result as absent.
pub fn normalize_field(input: Option<&str>) -> Option<String> {
    input.map(normalize).filter(|s| !s.is_empty())
}

fn apply_rules(input: &str) -> String {
    let s = replace_heart_mojibake(input);
    let s = compose(&s);
    let s = strip_emoji(&s);
    let s = strip_symbols(&s);
    collapse_whitespace(&s)
}

// ── Rule 1: %Ð → ♥ ───────────────────────────────────────────────────────────

fn replace_heart_mojibake(input: &str) -> String {
    input.replace("%Ð", "♥")
}

// ── Rule 2: NFC ──────────────────────────────────────────────────────────────

fn compose(input: &str) -> String {
    input.nfc().collect()
}

// ── Rule 3: Pictographic emoji ───────────────────────────────────────────────

static RE_EMOJI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"[\x{1F600}-\x{1F64F}\x{1F300}-\x{1F5FF}\x{1F680}-\x{1F6FF}",
        r"\x{1F1E0}-\x{1F1FF}\x{1F700}-\x{1F77F}\x{1F780}-\x{1F7FF}",
        r"\x{1F800}-\x{1F8FF}\x{1F900}-\x{1F9FF}\x{1FA00}-\x{1FA6F}",
        r"\x{1FA70}-\x{1FAFF}]",
    ))
    .expect("emoji pattern is valid")
});

fn strip_emoji(input: &str) -> String {
    RE_EMOJI.replace_all(input, "").into_owned()
}

// ── Rule 4: Dingbats, private use, supplementary symbols ─────────────────────

static RE_SYMBOLS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{2700}-\x{27BF}\x{E000}-\x{F8FF}\x{1F000}-\x{1F7FF}\x{1F910}-\x{1F9FF}]")
        .expect("symbol pattern is valid")
});

fn strip_symbols(input: &str) -> String {
    RE_SYMBOLS.replace_all(input, "").into_owned()
}

// ── Rule 5: Whitespace ───────────────────────────────────────────────────────

static RE_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

fn collapse_whitespace(input: &str) -> String {
    RE_WHITESPACE.replace_all(input, " ").trim().to_string()
}
