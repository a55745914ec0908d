//! Identifier digit normalization
//!
//! Both incoming queries and the identifier column of every cohort pass
//! through [`normalize_digits`], so the two sides of a comparison always use
//! the same canonical form.

/// Zero code points of the decimal digit scripts we translate to ASCII.
///
/// Each script encodes 0-9 as ten consecutive code points.
const DIGIT_ZEROS: &[u32] = &[
    0x0660, // Arabic-Indic
    0x06F0, // Extended Arabic-Indic (Persian, Urdu)
    0x07C0, // NKo
    0x0966, // Devanagari
    0x09E6, // Bengali
    0x0E50, // Thai
    0xFF10, // Fullwidth
];

/// Translate a single decimal digit glyph of any supported script to ASCII.
///
/// Returns `None` for anything that is not a decimal digit.
pub fn ascii_digit(c: char) -> Option<char> {
    if c.is_ascii_digit() {
        return Some(c);
    }

    let code = c as u32;
    DIGIT_ZEROS.iter().find_map(|&zero| {
        let offset = code.checked_sub(zero)?;
        if offset < 10 {
            char::from_digit(offset, 10)
        } else {
            None
        }
    })
}

/// Replace non-Latin digit glyphs with ASCII digits, leaving all other
/// characters untouched.
pub fn translate_digits(text: &str) -> String {
    text.chars().map(|c| ascii_digit(c).unwrap_or(c)).collect()
}

/// Canonicalize text into a pure ASCII digit string.
///
/// - Non-Latin decimal digits are translated to ASCII first
/// - Every non-digit character is dropped
/// - Trailing zeros are trimmed; a value made only of zeros becomes `"0"`
/// - Empty (or digit-free) input stays empty
///
/// Trailing zero trimming absorbs the `.0` suffix spreadsheets attach to
/// numeric identifiers, which otherwise survives as an extra `0` once the
/// dot is dropped.
///
/// # Examples
///
/// ```
/// use exam_common::normalize_digits;
///
/// assert_eq!(normalize_digits("512340"), "51234");
/// assert_eq!(normalize_digits("٠٥١٢٣٤"), "051234");
/// assert_eq!(normalize_digits(" 51-23 4 "), "51234");
/// assert_eq!(normalize_digits("000"), "0");
/// assert_eq!(normalize_digits("abc"), "");
/// ```
pub fn normalize_digits(text: &str) -> String {
    let digits: String = text.chars().filter_map(ascii_digit).collect();
    if digits.is_empty() {
        return digits;
    }

    let trimmed = digits.trim_end_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
