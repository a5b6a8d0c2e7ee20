//! Localized numeral normalization.
//!
//! Form fields may accept Persian (Extended Arabic-Indic) digits. Numeric
//! parsing only understands ASCII, so raw input goes through [`normalize`]
//! first.

/// Persian digit glyphs, indexed by their value.
const PERSIAN_DIGITS: [char; 10] = ['۰', '۱', '۲', '۳', '۴', '۵', '۶', '۷', '۸', '۹'];

/// Replace every Persian digit glyph with its ASCII digit.
///
/// All other characters pass through unchanged; any input is valid.
pub fn normalize(text: &str) -> String {
    text.chars().map(normalize_char).collect()
}

fn normalize_char(c: char) -> char {
    match PERSIAN_DIGITS.iter().position(|&d| d == c) {
        // position < 10, so the digit always exists
        Some(value) => char::from(b'0' + value as u8),
        None => c,
    }
}
