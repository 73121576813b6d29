//! WinAnsiEncoding for the base-14 Type 1 fonts.
//!
//! The standard Helvetica faces carry no Unicode cmap, so text must be
//! emitted as single-byte codes. WinAnsi covers ASCII, Latin-1 and the
//! typographic punctuation in 0x80–0x9F, which is every accented Latin
//! letter a Spanish or Portuguese text needs.

/// Byte emitted for characters with no WinAnsi code point.
pub const REPLACEMENT: u8 = b'?';

/// Map one character to its WinAnsi code, if it has one.
pub fn encode_char(c: char) -> Option<u8> {
    let cp = c as u32;
    match cp {
        0x20..=0x7e | 0xa0..=0xff => Some(cp as u8),
        _ => match c {
            '€' => Some(0x80),
            '‚' => Some(0x82),
            'ƒ' => Some(0x83),
            '„' => Some(0x84),
            '…' => Some(0x85),
            '†' => Some(0x86),
            '‡' => Some(0x87),
            'ˆ' => Some(0x88),
            '‰' => Some(0x89),
            'Š' => Some(0x8a),
            '‹' => Some(0x8b),
            'Œ' => Some(0x8c),
            'Ž' => Some(0x8e),
            '‘' => Some(0x91),
            '’' => Some(0x92),
            '“' => Some(0x93),
            '”' => Some(0x94),
            '•' => Some(0x95),
            '–' => Some(0x96),
            '—' => Some(0x97),
            '˜' => Some(0x98),
            '™' => Some(0x99),
            'š' => Some(0x9a),
            '›' => Some(0x9b),
            'œ' => Some(0x9c),
            'ž' => Some(0x9e),
            'Ÿ' => Some(0x9f),
            '\t' => Some(b' '),
            _ => None,
        },
    }
}

/// Encode a string, substituting [`REPLACEMENT`] for unmappable characters.
pub fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\t')
        .map(|c| encode_char(c).unwrap_or(REPLACEMENT))
        .collect()
}
