//! Contract with the token-classification model that labels a finished stream.
//!
//! The model itself lives outside this crate. What lives here is the shape of
//! its answer and a per-doctype cache for whatever handle the embedding service
//! loads for it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::doc_type::DocType;
use crate::core::error::{Error, Result};
use crate::core::geometry::BBox;
use crate::core::model::TokenStream;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledDocument {
    pub doctype: DocType,
    pub tokens: Vec<String>,
    pub bboxes: Vec<BBox>,
    pub labels: Vec<String>,
}

impl LabeledDocument {
    /// Pairs a stream with one label per token.
    pub fn new(doctype: DocType, stream: TokenStream, labels: Vec<String>) -> Result<Self> {
        if labels.len() != stream.len() {
            return Err(Error::validation(format!(
                "labeler returned {} labels for {} tokens",
                labels.len(),
                stream.len()
            )));
        }
        let (tokens, bboxes) = stream.into_parts();
        Ok(Self {
            doctype,
            tokens: tokens.into_iter().map(String::from).collect(),
            bboxes,
            labels,
        })
    }
}

pub trait TokenLabeler {
    fn label(&self, doc_type: DocType, stream: &TokenStream) -> Result<LabeledDocument>;
}

/// Lookup-or-load cache of model handles keyed by doctype.
///
/// Each doctype is loaded at most once per cache; a failed load is not cached.
#[derive(Debug)]
pub struct ModelCache<M> {
    models: Mutex<HashMap<DocType, Arc<M>>>,
}

impl<M> Default for ModelCache<M> {
    fn default() -> Self {
        Self {
            models: Mutex::new(HashMap::new()),
        }
    }
}

impl<M> ModelCache<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load<F>(&self, doc_type: DocType, load: F) -> Result<Arc<M>>
    where
        F: FnOnce(DocType) -> Result<M>,
    {
        let mut models = self.models.lock();
        if let Some(model) = models.get(&doc_type) {
            return Ok(Arc::clone(model));
        }
        info!(%doc_type, "loading labeling model");
        let model = Arc::new(load(doc_type)?);
        models.insert(doc_type, Arc::clone(&model));
        Ok(model)
    }

    pub fn is_loaded(&self, doc_type: DocType) -> bool {
        self.models.lock().contains_key(&doc_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::PlacedToken;
    use std::cell::Cell;

    #[test]
    fn loads_each_doctype_once() {
        let cache: ModelCache<String> = ModelCache::new();
        let loads = Cell::new(0);
        for _ in 0..3 {
            let model = cache
                .get_or_load(DocType::Resume, |doc_type| {
                    loads.set(loads.get() + 1);
                    Ok(format!("model-{doc_type}"))
                })
                .unwrap();
            assert_eq!(model.as_str(), "model-resume");
        }
        assert_eq!(loads.get(), 1);
        assert!(!cache.is_loaded(DocType::Report));
    }

    #[test]
    fn failed_loads_are_retried() {
        let cache: ModelCache<u8> = ModelCache::new();
        let err = cache.get_or_load(DocType::Consent, |_| Err(Error::configuration("missing model")));
        assert!(err.is_err());
        assert!(!cache.is_loaded(DocType::Consent));
        let model = cache.get_or_load(DocType::Consent, |_| Ok(7)).unwrap();
        assert_eq!(*model, 7);
    }

    #[test]
    fn labels_must_match_tokens() {
        let stream = TokenStream::new(vec![
            PlacedToken::new("성명", BBox::new(0, 0, 10, 10)),
            PlacedToken::blank(BBox::new(10, 0, 20, 10)),
        ]);
        assert!(LabeledDocument::new(DocType::Resume, stream.clone(), vec!["O".into()]).is_err());

        let labeled =
            LabeledDocument::new(DocType::Resume, stream, vec!["B-NAME".into(), "O".into()]).unwrap();
        assert_eq!(labeled.tokens, vec!["성명", "[BLANK]"]);
    }
}
