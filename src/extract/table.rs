use tracing::debug;

use crate::core::error::Result;
use crate::core::model::{OcrCell, OcrPage, PlacedToken, Token, TokenStream};
use crate::core::text::{clean_token_text, compose_hangul};
use crate::extract::TokenExtractor;

/// Cell contents treated as printed noise rather than filled-in values.
pub const IGNORED_CELL_TEXTS: &[&str] = &["만원", "만세", "=", "-", "점", "급", "cm", "kg"];

/// Emits one token per table cell, in table/cell enumeration order.
#[derive(Debug, Default)]
pub struct TableTokenExtractor;

impl TableTokenExtractor {
    pub fn new() -> Self {
        Self
    }

    fn cell_token(cell: &OcrCell) -> Token {
        let has_words = cell
            .cell_text_lines
            .iter()
            .any(|line| !line.cell_words.is_empty());
        if !has_words {
            return Token::Blank;
        }

        let joined: String = cell
            .cell_text_lines
            .iter()
            .flat_map(|line| line.cell_words.iter())
            .map(|word| word.infer_text.as_str())
            .collect();
        let text = compose_hangul(joined.trim());
        if text.is_empty() || IGNORED_CELL_TEXTS.contains(&text.as_str()) {
            return Token::Blank;
        }
        Token::text(clean_token_text(&text))
    }
}

impl TokenExtractor for TableTokenExtractor {
    fn extract(&self, page: &OcrPage<'_>) -> Result<TokenStream> {
        let mut stream = TokenStream::default();
        for table in page.tables {
            for cell in &table.cells {
                let bbox = page.normalize(&cell.bounding_poly)?;
                stream.push(PlacedToken::new(Self::cell_token(cell), bbox));
            }
        }
        debug!(
            tables = page.tables.len(),
            tokens = stream.len(),
            "extracted table tokens"
        );
        Ok(stream)
    }
}
