pub mod synthesis;
pub mod table;
pub mod text;

pub use table::TableTokenExtractor;
pub use text::TextTokenExtractor;

use crate::core::error::Result;
use crate::core::model::{OcrPage, TokenStream};

/// One source of tokens on an OCR page.
pub trait TokenExtractor {
    fn extract(&self, page: &OcrPage<'_>) -> Result<TokenStream>;
}
