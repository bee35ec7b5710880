use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::doc_type::DocType;
use crate::core::error::{Error, Result};

/// Entry merged into every doctype's keyword sets.
pub const COMMON_ENTRY: &str = "common";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSet {
    #[serde(default)]
    pub field_keywords: BTreeMap<String, String>,
    #[serde(default)]
    pub group_keywords: BTreeMap<String, String>,
}

impl KeywordSet {
    fn names(&self) -> impl Iterator<Item = &String> {
        self.field_keywords.keys().chain(self.group_keywords.keys())
    }
}

/// Field vocabulary per doctype, keyed by [`DocType::key`] plus `common`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelKeywordSpec {
    entries: BTreeMap<String, KeywordSet>,
}

impl LabelKeywordSpec {
    pub fn new(entries: BTreeMap<String, KeywordSet>) -> Self {
        Self { entries }
    }

    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn entry(&self, name: &str) -> Result<&KeywordSet> {
        self.entries.get(name).ok_or_else(|| {
            Error::configuration(format!("label keyword spec has no '{name}' entry"))
        })
    }

    /// Field and group names allowed for `doc_type`, `common` included.
    pub fn allowed_fields(&self, doc_type: DocType) -> Result<HashSet<String>> {
        let own = self.entry(doc_type.key())?;
        let common = self.entry(COMMON_ENTRY)?;
        Ok(own.names().chain(common.names()).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = r#"{
        "resume": {
            "field_keywords": {"성명": "name", "주소": "address"},
            "group_keywords": {"학력사항": "education"}
        },
        "common": {
            "field_keywords": {"연락처": "phone"},
            "group_keywords": {}
        }
    }"#;

    #[test]
    fn merges_common_names() {
        let spec = LabelKeywordSpec::from_json(SPEC).unwrap();
        let allowed = spec.allowed_fields(DocType::Resume).unwrap();
        let mut names: Vec<_> = allowed.into_iter().collect();
        names.sort();
        assert_eq!(names, vec!["성명", "연락처", "주소", "학력사항"]);
    }

    #[test]
    fn missing_doctype_names_the_entry() {
        let spec = LabelKeywordSpec::from_json(SPEC).unwrap();
        let err = spec.allowed_fields(DocType::Report).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref msg) if msg.contains("'report'")));
    }

    #[test]
    fn missing_common_is_a_configuration_error() {
        let spec = LabelKeywordSpec::from_json(r#"{"resume": {}}"#).unwrap();
        let err = spec.allowed_fields(DocType::Resume).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref msg) if msg.contains("'common'")));
    }
}
