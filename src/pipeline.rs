use std::path::Path;

use tracing::info;

use crate::config::PipelineConfig;
use crate::core::doc_type::detect_from_tokens;
use crate::core::error::{Error, Result};
use crate::core::model::{RawOcrDocument, TokenStream};
use crate::export::{Exporter, HtmlDebugExporter, JsonExporter, TextExporter};
use crate::extract::{TableTokenExtractor, TextTokenExtractor, TokenExtractor};
use crate::filter::{LabelKeywordSpec, Template, TokenFilter};
use crate::labeling::{LabeledDocument, TokenLabeler};
use crate::merge::{SimpleTokenMerger, TokenMerger};

/// Request-scoped token pipeline. Stages hand each other streams by value.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Canonical page stream: table and text tokens merged into reading order.
    pub fn build_tokens(&self, document: &RawOcrDocument) -> Result<TokenStream> {
        let page = document.page()?;
        let table = TableTokenExtractor::new().extract(&page)?;
        let text = TextTokenExtractor::new(self.config.clone()).extract(&page)?;
        let merger = SimpleTokenMerger::new(self.config.merge_row_tolerance);
        let merged = merger.merge(&table, &text);
        info!(tokens = merged.len(), "built page token stream");
        Ok(merged)
    }

    /// Editable template: the canonical stream run through the doctype filter.
    pub fn build_template(
        &self,
        document: &RawOcrDocument,
        keywords: &LabelKeywordSpec,
    ) -> Result<Template> {
        let tokens = self.build_tokens(document)?;
        TokenFilter::new(keywords, self.config.clone()).filter(&tokens, document)
    }

    /// Canonical stream handed to the labeling model for its detected doctype.
    pub fn label<L>(&self, document: &RawOcrDocument, labeler: &L) -> Result<LabeledDocument>
    where
        L: TokenLabeler + ?Sized,
    {
        let tokens = self.build_tokens(document)?;
        let doc_type = detect_from_tokens(tokens.tokens()).ok_or(Error::UnrecognizedDocument)?;
        labeler.label(doc_type, &tokens)
    }
}

/// Writes the JSON, text and HTML renderings of a stream under `output`.
///
/// The text rendering breaks rows at `config.filter_row_tolerance`.
pub fn export_stream(
    stream: &TokenStream,
    output: &Path,
    stem: &str,
    config: &PipelineConfig,
) -> anyhow::Result<()> {
    let json_exporter = JsonExporter::new(output.to_path_buf(), stem);
    json_exporter.export(stream)?;

    let text_exporter = TextExporter::new(output.to_path_buf(), stem)
        .with_row_tolerance(config.filter_row_tolerance);
    text_exporter.export(stream)?;

    let html_exporter = HtmlDebugExporter::new(output.to_path_buf(), stem);
    html_exporter.export(stream)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::doc_type::DocType;
    use crate::core::geometry::BBox;
    use crate::core::model::PlacedToken;

    fn document() -> RawOcrDocument {
        RawOcrDocument::from_json(
            r#"{"images":[{
                "convertedImageInfo":{"width":1000,"height":1000},
                "fields":[
                    {"inferText":"이력서","boundingPoly":{"vertices":[{"x":400,"y":20},{"x":600,"y":20},{"x":600,"y":60},{"x":400,"y":60}]}}
                ]
            }]}"#,
        )
        .unwrap()
    }

    struct EchoLabeler;

    impl TokenLabeler for EchoLabeler {
        fn label(&self, doc_type: DocType, stream: &TokenStream) -> Result<LabeledDocument> {
            let labels = vec!["O".to_string(); stream.len()];
            LabeledDocument::new(doc_type, stream.clone(), labels)
        }
    }

    #[test]
    fn labels_detected_doctype() {
        let labeled = Pipeline::default().label(&document(), &EchoLabeler).unwrap();
        assert_eq!(labeled.doctype, DocType::Resume);
        assert_eq!(labeled.tokens, vec!["이력서"]);
    }

    #[test]
    fn export_stream_writes_outputs() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let stream = TokenStream::new(vec![PlacedToken::new("성명", BBox::new(0, 0, 10, 10))]);

        export_stream(&stream, dir.path(), "tokens", &PipelineConfig::default())?;

        assert!(dir.path().join("tokens.json").exists());
        assert!(dir.path().join("tokens.txt").exists());
        assert!(dir.path().join("tokens.html").exists());
        Ok(())
    }

    #[test]
    fn text_rows_follow_filter_tolerance() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let stream = TokenStream::new(vec![
            PlacedToken::new("성명", BBox::new(0, 100, 50, 120)),
            PlacedToken::new("홍길동", BBox::new(60, 108, 150, 128)),
        ]);

        export_stream(&stream, dir.path(), "wide", &PipelineConfig::default())?;
        let wide = std::fs::read_to_string(dir.path().join("wide.txt"))?;
        assert_eq!(wide, "성명 홍길동\n");

        let narrow = PipelineConfig {
            filter_row_tolerance: 5,
            ..PipelineConfig::default()
        };
        export_stream(&stream, dir.path(), "narrow", &narrow)?;
        let narrow = std::fs::read_to_string(dir.path().join("narrow.txt"))?;
        assert_eq!(narrow, "성명\n홍길동\n");
        Ok(())
    }
}
