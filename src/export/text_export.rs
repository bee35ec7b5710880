use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::model::TokenStream;
use crate::export::Exporter;

/// Plain-text dump with one output line per detected row.
#[derive(Debug, Clone)]
pub struct TextExporter {
    out_dir: PathBuf,
    stem: String,
    row_tolerance: i32,
}

impl TextExporter {
    pub fn new(out_dir: PathBuf, stem: &str) -> Self {
        Self {
            out_dir,
            stem: stem.to_string(),
            row_tolerance: 10,
        }
    }

    /// Rows whose top edges differ by at most `row_tolerance` share a line.
    pub fn with_row_tolerance(mut self, row_tolerance: i32) -> Self {
        self.row_tolerance = row_tolerance;
        self
    }

    fn render(&self, stream: &TokenStream) -> String {
        let groups = stream.line_groups(self.row_tolerance);
        let mut text = String::new();
        let mut current_row = None;
        for (idx, entry) in stream.entries().iter().enumerate() {
            let row = groups.representative(idx);
            match current_row {
                Some(prev) if prev == row => text.push(' '),
                Some(_) => text.push('\n'),
                None => {}
            }
            current_row = Some(row);
            text.push_str(entry.token.as_str());
        }
        if !text.is_empty() {
            text.push('\n');
        }
        text
    }
}

impl Exporter for TextExporter {
    fn export(&self, stream: &TokenStream) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(format!("{}.txt", self.stem));
        fs::write(path, self.render(stream))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::BBox;
    use crate::core::model::PlacedToken;

    #[test]
    fn renders_one_line_per_row() {
        let stream = TokenStream::new(vec![
            PlacedToken::new("성명", BBox::new(0, 100, 50, 120)),
            PlacedToken::new(":", BBox::new(50, 102, 60, 120)),
            PlacedToken::blank(BBox::new(60, 100, 200, 120)),
            PlacedToken::new("주소", BBox::new(0, 200, 50, 220)),
        ]);
        let exporter = TextExporter::new(PathBuf::from("unused"), "tokens");
        assert_eq!(exporter.render(&stream), "성명 : [BLANK]\n주소\n");
    }
}
