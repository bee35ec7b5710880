//! Text cleanup applied to OCR strings before they become tokens.
//!
//! OCR engines occasionally return Hangul as decomposed jamo, sometimes with
//! spaces between the pieces. Title and field keywords are compared by exact
//! equality, so tokens are recomposed to NFC syllables first.

use unicode_normalization::UnicodeNormalization;

fn is_hangul_jamo(c: char) -> bool {
    matches!(
        c as u32,
        0x1100..=0x11FF | // Hangul Jamo
        0x3130..=0x318F | // Hangul Compatibility Jamo
        0xA960..=0xA97F | // Hangul Jamo Extended-A
        0xD7B0..=0xD7FF   // Hangul Jamo Extended-B
    )
}

fn is_conjoining_jamo(c: char) -> bool {
    matches!(c as u32, 0x1100..=0x11FF | 0xA960..=0xA97F | 0xD7B0..=0xD7FF)
}

fn remove_intra_jamo_whitespace(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());

    for (i, c) in chars.iter().enumerate() {
        if c.is_whitespace() {
            let prev = chars[..i].iter().rev().find(|ch| !ch.is_whitespace());
            let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
            let between_jamos = prev
                .zip(next)
                .map(|(p, n)| is_hangul_jamo(*p) && is_hangul_jamo(*n))
                .unwrap_or(false);
            if between_jamos {
                continue;
            }
        }
        result.push(*c);
    }

    result
}

/// Recomposes decomposed Hangul into syllables; other text passes through NFC.
pub fn compose_hangul(text: &str) -> String {
    if !text.chars().any(is_conjoining_jamo) {
        return text.nfc().collect();
    }
    remove_intra_jamo_whitespace(text).nfc().collect()
}

/// Removes ASCII spaces only; other whitespace is left to `trim`.
pub fn strip_spaces(text: &str) -> String {
    text.replace(' ', "")
}

/// Token-ready form of an OCR string: recomposed, spaces removed.
pub fn clean_token_text(text: &str) -> String {
    strip_spaces(&compose_hangul(text))
}
