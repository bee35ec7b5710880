pub mod keywords;
pub mod passes;

pub use keywords::{KeywordSet, LabelKeywordSpec};

use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::core::doc_type::{detect_from_tokens, DocType};
use crate::core::error::{Error, Result};
use crate::core::model::{RawOcrDocument, TokenStream};

/// A filtered stream ready to be stored as the editable template of a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub doc_type: DocType,
    pub stream: TokenStream,
}

/// Doctype-aware masking of a canonical token stream.
#[derive(Debug, Clone)]
pub struct TokenFilter<'a> {
    keywords: &'a LabelKeywordSpec,
    config: PipelineConfig,
}

impl<'a> TokenFilter<'a> {
    pub fn new(keywords: &'a LabelKeywordSpec, config: PipelineConfig) -> Self {
        Self { keywords, config }
    }

    pub fn filter(&self, stream: &TokenStream, document: &RawOcrDocument) -> Result<Template> {
        let doc_type = detect_from_tokens(stream.tokens()).ok_or(Error::UnrecognizedDocument)?;
        let allowed = self.keywords.allowed_fields(doc_type)?;
        let table_regions = document.page()?.table_regions()?;

        let date_digits = passes::date_line_digits(stream, self.config.filter_row_tolerance);
        let masked = passes::mask_tokens(stream, &date_digits, &table_regions, &allowed);
        debug!(
            pass = "mask",
            date_digits = date_digits.len(),
            blanks = count_blanks(&masked),
            "applied filter pass"
        );

        let merged = passes::merge_inline_blanks(&masked, &self.config);
        debug!(
            pass = "merge_inline_blanks",
            removed = masked.len() - merged.len(),
            "applied filter pass"
        );

        let collapsed = passes::collapse_seal_spans(&merged, &self.config);
        debug!(
            pass = "collapse_seal_spans",
            before = merged.len(),
            after = collapsed.len(),
            "applied filter pass"
        );

        info!(
            %doc_type,
            tokens = collapsed.len(),
            blanks = count_blanks(&collapsed),
            "built editable template"
        );
        Ok(Template {
            doc_type,
            stream: collapsed,
        })
    }
}

fn count_blanks(stream: &TokenStream) -> usize {
    stream.tokens().filter(|token| token.is_blank()).count()
}
