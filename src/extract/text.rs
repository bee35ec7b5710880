use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::core::error::Result;
use crate::core::geometry::BBox;
use crate::core::model::{OcrPage, PlacedToken, Token, TokenStream};
use crate::core::text::{compose_hangul, strip_spaces};
use crate::extract::synthesis::{insert_date_unit_blanks, insert_empty_seal_blanks};
use crate::extract::TokenExtractor;

/// Glyph printed in checkbox-style blanks.
pub const BLANK_GLYPH: char = '□';

static LIST_MARKER_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.$").expect("Invalid list marker regex"));

static LIST_MARKER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+\.)\s*(.*)$").expect("Invalid list marker prefix regex"));

static KEYWORD_DELIMITERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":|\(인\)|\(서명\)").expect("Invalid keyword delimiter regex"));

/// A piece of a field before it is placed on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    Blank,
}

impl Part {
    fn char_len(&self) -> usize {
        match self {
            Part::Text(text) => text.chars().count(),
            Part::Blank => 0,
        }
    }
}

/// Splits `"12. 성명"` into the list marker and the rest.
pub fn split_list_marker(text: &str) -> Option<(&str, &str)> {
    let captures = LIST_MARKER_PREFIX.captures(text)?;
    let marker = captures.get(1)?.as_str();
    let rest = captures.get(2).map(|m| m.as_str()).unwrap_or("");
    Some((marker, rest))
}

/// Splits on `:`, `(인)`, `(서명)`, keeping each delimiter as its own piece.
pub fn split_keywords(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut cursor = 0;
    for found in KEYWORD_DELIMITERS.find_iter(text) {
        pieces.push(&text[cursor..found.start()]);
        pieces.push(found.as_str());
        cursor = found.end();
    }
    pieces.push(&text[cursor..]);
    pieces.retain(|piece| !piece.is_empty());
    pieces
}

/// Replaces every blank glyph with [`Part::Blank`], keeping the text around it.
pub fn split_blank_glyphs(text: &str) -> Vec<Part> {
    let mut parts = Vec::new();
    let mut buffer = String::new();
    for ch in text.chars() {
        if ch == BLANK_GLYPH {
            if !buffer.is_empty() {
                parts.push(Part::Text(std::mem::take(&mut buffer)));
            }
            parts.push(Part::Blank);
        } else {
            buffer.push(ch);
        }
    }
    if !buffer.is_empty() {
        parts.push(Part::Text(buffer));
    }
    parts
}

/// Runs the marker, keyword and glyph splits over one field's text.
pub fn split_field_text(text: &str) -> Vec<Part> {
    let segments: Vec<&str> = match split_list_marker(text) {
        Some((marker, rest)) => vec![marker, rest],
        None => vec![text],
    };
    segments
        .into_iter()
        .flat_map(split_keywords)
        .flat_map(split_blank_glyphs)
        .collect()
}

/// Tiles `bbox` left to right across `parts`.
///
/// Text parts share the width left after fixed-width blanks in proportion to
/// their character count, truncated toward zero. With no text left to divide,
/// each text part is given the whole remaining width.
pub fn distribute_widths(bbox: &BBox, parts: &[Part], blank_width: i32) -> Vec<BBox> {
    let blanks = parts.iter().filter(|part| **part == Part::Blank).count() as i32;
    let remaining_width = (bbox.width() - blank_width * blanks).max(0);
    let total_len: usize = parts.iter().map(Part::char_len).sum();

    let mut cursor = bbox.x0;
    parts
        .iter()
        .map(|part| {
            let width = match part {
                Part::Blank => blank_width,
                Part::Text(_) if total_len == 0 => remaining_width,
                Part::Text(_) => {
                    (part.char_len() as f64 / total_len as f64 * f64::from(remaining_width)) as i32
                }
            };
            let placed = BBox::new(cursor, bbox.y0, cursor + width, bbox.y1).clamped();
            cursor += width;
            placed
        })
        .collect()
}

/// Emits free-text fields outside tables as split, reading-ordered tokens.
#[derive(Debug, Clone, Default)]
pub struct TextTokenExtractor {
    config: PipelineConfig,
}

impl TextTokenExtractor {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    fn field_tokens(&self, text: &str, bbox: &BBox) -> Vec<PlacedToken> {
        let parts = split_field_text(text);
        let boxes = distribute_widths(bbox, &parts, self.config.inline_blank_width);
        parts
            .into_iter()
            .zip(boxes)
            .filter_map(|(part, placed)| match part {
                Part::Blank => Some(PlacedToken::blank(placed)),
                Part::Text(text) => {
                    let cleaned = strip_spaces(&text);
                    (!cleaned.is_empty()).then(|| PlacedToken::new(Token::Text(cleaned), placed))
                }
            })
            .collect()
    }
}

impl TokenExtractor for TextTokenExtractor {
    fn extract(&self, page: &OcrPage<'_>) -> Result<TokenStream> {
        let table_regions = page.table_regions()?;
        let mut stream = TokenStream::default();
        let mut skipped = 0usize;

        for field in page.fields {
            let bbox = page.normalize(&field.bounding_poly)?;
            let text = compose_hangul(&field.infer_text);
            let in_table = table_regions.iter().any(|region| region.contains(&bbox));
            if in_table || LIST_MARKER_ONLY.is_match(text.trim()) {
                skipped += 1;
                continue;
            }
            for entry in self.field_tokens(&text, &bbox) {
                stream.push(entry);
            }
        }

        let tolerance = self.config.text_row_tolerance;
        let ordered = stream.into_reading_order(tolerance);
        let with_seals = insert_empty_seal_blanks(ordered, &self.config);
        let with_dates = insert_date_unit_blanks(with_seals, &self.config);
        let stream = with_dates.into_reading_order(tolerance);

        debug!(
            fields = page.fields.len(),
            skipped,
            tokens = stream.len(),
            "extracted text tokens"
        );
        Ok(stream)
    }
}
