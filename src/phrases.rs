//! Fixed Spanish copy and date formatting for the rendered pages.
//!
//! Page renderers and tests import the same constants, so tests can search
//! the PDF for the exact text drawn.

use chrono::{Datelike, NaiveDateTime, Timelike};

/// Italic line under the cover title.
pub const COVER_SUBTITLE: &str = "En Memoria Eterna";

/// Commemorative phrase on the cover.
pub const COVER_PHRASE: &str =
    "Los recuerdos son el tesoro más preciado que guardamos en el corazón";

/// Bold headline of the closing page.
pub const CLOSING_HEADLINE: &str = "Siempre en Nuestros Corazones";

/// Two-line farewell under the closing headline.
pub const CLOSING_MESSAGE: &str = "Los recuerdos son eternos y el amor nunca muere.\nVives para siempre en cada sonrisa que nos regalaste.";

/// Written to the PDF `Creator` field.
pub const CREATOR: &str = "Memorial PDF Generator";

/// Opening and closing quotation glyphs around an entry message.
pub const OPEN_QUOTE: &str = "\u{201c}";
pub const CLOSE_QUOTE: &str = "\u{201d}";

const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// `"{n} de {total}"`, the entry-page footer label.
pub fn page_indicator(n: usize, total: usize) -> String {
    format!("{n} de {total}")
}

/// Long-form date, e.g. `16 de octubre de 2026`.
pub fn format_date(at: NaiveDateTime) -> String {
    let month = MONTHS[at.month0() as usize];
    format!("{} de {} de {}", at.day(), month, at.year())
}

/// Long-form date with 24-hour time, e.g. `16 de octubre de 2026, 14:05`.
pub fn format_date_time(at: NaiveDateTime) -> String {
    format!(
        "{}, {:02}:{:02}",
        format_date(at),
        at.hour(),
        at.minute()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, 0))
            .unwrap()
    }

    #[test]
    fn long_date_uses_spanish_month_names() {
        assert_eq!(format_date(at(2026, 10, 16, 0, 0)), "16 de octubre de 2026");
        assert_eq!(format_date(at(2024, 1, 5, 0, 0)), "5 de enero de 2024");
        assert_eq!(format_date(at(2024, 12, 31, 0, 0)), "31 de diciembre de 2024");
    }

    #[test]
    fn date_time_pads_hours_and_minutes() {
        assert_eq!(
            format_date_time(at(2026, 10, 16, 14, 5)),
            "16 de octubre de 2026, 14:05"
        );
        assert_eq!(
            format_date_time(at(2024, 3, 1, 7, 0)),
            "1 de marzo de 2024, 07:00"
        );
    }

    #[test]
    fn indicator_format() {
        assert_eq!(page_indicator(1, 3), "1 de 3");
    }
}
