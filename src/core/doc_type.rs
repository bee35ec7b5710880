use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::model::{OcrPage, Token};
use crate::core::text::strip_spaces;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    Resume,
    Certificate,
    Consent,
    SelfIntro,
    Report,
}

/// Title keywords checked against each token, in priority order.
///
/// Both daily-report titles map to [`DocType::Report`].
pub const TITLE_KEYWORDS: &[(&str, DocType)] = &[
    ("이력서", DocType::Resume),
    ("재직증명서", DocType::Certificate),
    ("위임장", DocType::Consent),
    ("자기소개서", DocType::SelfIntro),
    ("일일업무보고서", DocType::Report),
    ("일일업무일지", DocType::Report),
];

impl DocType {
    pub const ALL: [DocType; 5] = [
        DocType::Resume,
        DocType::Certificate,
        DocType::Consent,
        DocType::SelfIntro,
        DocType::Report,
    ];

    /// Key used by the label keyword spec and the model cache.
    pub fn key(&self) -> &'static str {
        match self {
            DocType::Resume => "resume",
            DocType::Certificate => "certificate",
            DocType::Consent => "consent",
            DocType::SelfIntro => "self_intro",
            DocType::Report => "report",
        }
    }

    pub fn from_title(text: &str) -> Option<DocType> {
        TITLE_KEYWORDS
            .iter()
            .find(|(keyword, _)| *keyword == text)
            .map(|(_, doc_type)| *doc_type)
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DocType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocType::ALL
            .into_iter()
            .find(|doc_type| doc_type.key() == s)
            .ok_or_else(|| Error::validation(format!("unknown document type '{s}'")))
    }
}

/// Returns the doctype of the first token that exactly equals a title keyword.
pub fn detect_doc_type<'a, I>(tokens: I) -> Option<DocType>
where
    I: IntoIterator<Item = &'a str>,
{
    tokens.into_iter().find_map(DocType::from_title)
}

pub fn detect_from_tokens<'a, I>(tokens: I) -> Option<DocType>
where
    I: IntoIterator<Item = &'a Token>,
{
    detect_doc_type(tokens.into_iter().filter_map(Token::as_text))
}

/// Detects the doctype straight from raw field texts, spaces removed.
pub fn detect_from_fields(page: &OcrPage<'_>) -> Option<DocType> {
    page.fields
        .iter()
        .map(|field| strip_spaces(&field.infer_text))
        .find_map(|text| DocType::from_title(&text))
}
