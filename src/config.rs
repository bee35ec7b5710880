use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};
use crate::core::geometry::COORD_SCALE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlankMergeScope {
    /// Merge adjacent blanks on every row.
    AllLines,
    /// Merge only on rows that also hold a 년/월/일 unit token.
    DateLines,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateBlankWidths {
    pub year: i32,
    pub month: i32,
    pub day: i32,
}

impl Default for DateBlankWidths {
    fn default() -> Self {
        Self {
            year: 60,
            month: 25,
            day: 25,
        }
    }
}

impl DateBlankWidths {
    pub fn for_unit(&self, unit: &str) -> Option<i32> {
        match unit {
            "년" => Some(self.year),
            "월" => Some(self.month),
            "일" => Some(self.day),
            _ => None,
        }
    }
}

/// Tunables of the token pipeline. Every value is in normalized 0–1000 units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub text_row_tolerance: i32,
    pub merge_row_tolerance: i32,
    pub filter_row_tolerance: i32,
    pub blank_merge_row_tolerance: i32,
    pub blank_merge_max_gap: i32,
    pub blank_merge_scope: BlankMergeScope,
    pub inline_blank_width: i32,
    pub seal_blank_width: i32,
    pub date_blank_widths: DateBlankWidths,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            text_row_tolerance: 15,
            merge_row_tolerance: 5,
            filter_row_tolerance: 10,
            blank_merge_row_tolerance: 5,
            blank_merge_max_gap: 30,
            blank_merge_scope: BlankMergeScope::AllLines,
            inline_blank_width: 25,
            seal_blank_width: 500,
            date_blank_widths: DateBlankWidths::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(data: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_toml_str(&data)
    }

    /// Every tolerance and width must lie within the normalized page.
    pub fn validate(&self) -> Result<()> {
        let bounded = [
            ("text_row_tolerance", self.text_row_tolerance),
            ("merge_row_tolerance", self.merge_row_tolerance),
            ("filter_row_tolerance", self.filter_row_tolerance),
            ("blank_merge_row_tolerance", self.blank_merge_row_tolerance),
            ("blank_merge_max_gap", self.blank_merge_max_gap),
            ("inline_blank_width", self.inline_blank_width),
            ("seal_blank_width", self.seal_blank_width),
            ("date_blank_widths.year", self.date_blank_widths.year),
            ("date_blank_widths.month", self.date_blank_widths.month),
            ("date_blank_widths.day", self.date_blank_widths.day),
        ];
        for (name, value) in bounded {
            if !(0..=COORD_SCALE).contains(&value) {
                return Err(Error::configuration(format!(
                    "{name} must be within 0..={COORD_SCALE}, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            merge_row_tolerance = 8
            blank_merge_scope = "date_lines"

            [date_blank_widths]
            year = 80
            "#,
        )
        .unwrap();
        assert_eq!(config.merge_row_tolerance, 8);
        assert_eq!(config.blank_merge_scope, BlankMergeScope::DateLines);
        assert_eq!(config.date_blank_widths.year, 80);
        assert_eq!(config.date_blank_widths.day, 25);
        assert_eq!(config.text_row_tolerance, 15);
    }

    #[test]
    fn rejects_negative_values() {
        let err = PipelineConfig::from_toml_str("seal_blank_width = -1").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn rejects_values_wider_than_the_page() {
        let err = PipelineConfig::from_toml_str("seal_blank_width = 2147483647").unwrap_err();
        assert!(matches!(err, Error::Configuration(ref msg) if msg.contains("seal_blank_width")));

        let err = PipelineConfig::from_toml_str("[date_blank_widths]\nyear = 1001").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let config = PipelineConfig::from_toml_str("seal_blank_width = 1000").unwrap();
        assert_eq!(config.seal_blank_width, 1000);
    }

    #[test]
    fn rejects_unparseable_files() {
        let err = PipelineConfig::from_toml_str("text_row_tolerance = \"wide\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
