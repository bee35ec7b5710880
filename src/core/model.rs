use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::error::{Error, Result};
use crate::core::geometry::{normalize_bbox, BBox, LineGroups, Vertex};

/// Wire spelling of [`Token::Blank`].
pub const BLANK_TOKEN: &str = "[BLANK]";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOcrDocument {
    #[serde(default)]
    pub images: Vec<OcrImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrImage {
    #[serde(default)]
    pub converted_image_info: Option<ImageInfo>,
    #[serde(default)]
    pub fields: Vec<OcrField>,
    #[serde(default)]
    pub tables: Vec<OcrTable>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingPoly {
    #[serde(default)]
    pub vertices: Vec<Vertex>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrField {
    #[serde(default)]
    pub infer_text: String,
    pub bounding_poly: BoundingPoly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrTable {
    pub bounding_poly: BoundingPoly,
    #[serde(default)]
    pub cells: Vec<OcrCell>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrCell {
    pub bounding_poly: BoundingPoly,
    #[serde(default)]
    pub cell_text_lines: Vec<CellTextLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellTextLine {
    #[serde(default)]
    pub cell_words: Vec<CellWord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellWord {
    #[serde(default)]
    pub infer_text: String,
}

/// Validated view of the single page a request carries.
#[derive(Debug, Clone, Copy)]
pub struct OcrPage<'a> {
    pub width: u32,
    pub height: u32,
    pub fields: &'a [OcrField],
    pub tables: &'a [OcrTable],
}

impl RawOcrDocument {
    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// The first image of the payload, with its dimensions checked.
    pub fn page(&self) -> Result<OcrPage<'_>> {
        let image = self
            .images
            .first()
            .ok_or_else(|| Error::validation("OCR payload contains no images"))?;
        if self.images.len() > 1 {
            warn!(images = self.images.len(), "only the first OCR image is processed");
        }
        let info = image
            .converted_image_info
            .ok_or_else(|| Error::validation("OCR image is missing convertedImageInfo"))?;
        if info.width == 0 || info.height == 0 {
            return Err(Error::validation(format!(
                "OCR image has empty dimensions {}x{}",
                info.width, info.height
            )));
        }
        Ok(OcrPage {
            width: info.width,
            height: info.height,
            fields: &image.fields,
            tables: &image.tables,
        })
    }
}

impl OcrPage<'_> {
    pub fn normalize(&self, poly: &BoundingPoly) -> Result<BBox> {
        normalize_bbox(&poly.vertices, self.width, self.height)
    }

    /// Normalized outer boxes of every table on the page.
    pub fn table_regions(&self) -> Result<Vec<BBox>> {
        self.tables
            .iter()
            .map(|table| self.normalize(&table.bounding_poly))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Token {
    Text(String),
    /// A fillable field that was detected but carries no content.
    Blank,
}

impl Token {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value == BLANK_TOKEN {
            Token::Blank
        } else {
            Token::Text(value)
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Token::Blank)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Token::Text(text) => Some(text),
            Token::Blank => None,
        }
    }

    pub fn is(&self, text: &str) -> bool {
        self.as_text() == Some(text)
    }

    /// Non-empty and made only of ASCII digits.
    pub fn is_numeric(&self) -> bool {
        self.as_text()
            .map(|text| !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()))
            .unwrap_or(false)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Token::Text(text) => text,
            Token::Blank => BLANK_TOKEN,
        }
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Token::text(value)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Token::text(value)
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        match token {
            Token::Text(text) => text,
            Token::Blank => BLANK_TOKEN.to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedToken {
    pub token: Token,
    pub bbox: BBox,
}

impl PlacedToken {
    pub fn new(token: impl Into<Token>, bbox: BBox) -> Self {
        Self {
            token: token.into(),
            bbox,
        }
    }

    pub fn blank(bbox: BBox) -> Self {
        Self {
            token: Token::Blank,
            bbox,
        }
    }
}

/// Reading-ordered (token, box) pairs for one page.
///
/// On the wire this is the co-indexed `{"tokens": [...], "bboxes": [...]}` pair
/// of arrays consumed by the labeling model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TokenStreamWire", into = "TokenStreamWire")]
pub struct TokenStream {
    entries: Vec<PlacedToken>,
}

#[derive(Serialize, Deserialize)]
struct TokenStreamWire {
    tokens: Vec<Token>,
    bboxes: Vec<BBox>,
}

impl TryFrom<TokenStreamWire> for TokenStream {
    type Error = Error;

    fn try_from(wire: TokenStreamWire) -> Result<Self> {
        TokenStream::from_parts(wire.tokens, wire.bboxes)
    }
}

impl From<TokenStream> for TokenStreamWire {
    fn from(stream: TokenStream) -> Self {
        let (tokens, bboxes) = stream.into_parts();
        Self { tokens, bboxes }
    }
}

impl TokenStream {
    pub fn new(entries: Vec<PlacedToken>) -> Self {
        Self { entries }
    }

    pub fn from_parts(tokens: Vec<Token>, bboxes: Vec<BBox>) -> Result<Self> {
        if tokens.len() != bboxes.len() {
            return Err(Error::validation(format!(
                "token stream has {} tokens but {} bboxes",
                tokens.len(),
                bboxes.len()
            )));
        }
        Ok(Self {
            entries: tokens
                .into_iter()
                .zip(bboxes)
                .map(|(token, bbox)| PlacedToken { token, bbox })
                .collect(),
        })
    }

    pub fn into_parts(self) -> (Vec<Token>, Vec<BBox>) {
        self.entries
            .into_iter()
            .map(|entry| (entry.token, entry.bbox))
            .unzip()
    }

    pub fn entries(&self) -> &[PlacedToken] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<PlacedToken> {
        self.entries
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.entries.iter().map(|entry| &entry.token)
    }

    pub fn bboxes(&self) -> impl Iterator<Item = &BBox> {
        self.entries.iter().map(|entry| &entry.bbox)
    }

    pub fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.token.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: PlacedToken) {
        self.entries.push(entry);
    }

    pub fn line_groups(&self, tolerance: i32) -> LineGroups {
        LineGroups::from_boxes(self.bboxes(), tolerance)
    }

    /// Stable sort by `(line representative y, x0)` using first-match line groups.
    pub fn into_reading_order(self, tolerance: i32) -> Self {
        let groups = self.line_groups(tolerance);
        let mut keyed: Vec<(i32, PlacedToken)> = self
            .entries
            .into_iter()
            .enumerate()
            .map(|(idx, entry)| (groups.representative(idx), entry))
            .collect();
        keyed.sort_by_key(|(line_y, entry)| (*line_y, entry.bbox.x0));
        Self {
            entries: keyed.into_iter().map(|(_, entry)| entry).collect(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl FromIterator<PlacedToken> for TokenStream {
    fn from_iter<T: IntoIterator<Item = PlacedToken>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for TokenStream {
    type Item = PlacedToken;
    type IntoIter = std::vec::IntoIter<PlacedToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
