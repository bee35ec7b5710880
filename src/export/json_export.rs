use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::model::TokenStream;
use crate::export::Exporter;

#[derive(Debug, Clone)]
pub struct JsonExporter {
    out_dir: PathBuf,
    stem: String,
}

impl JsonExporter {
    pub fn new(out_dir: PathBuf, stem: &str) -> Self {
        Self {
            out_dir,
            stem: stem.to_string(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.json", self.stem))
    }
}

impl Exporter for JsonExporter {
    fn export(&self, stream: &TokenStream) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.path();
        let data = stream.to_json_pretty()?;
        fs::write(&path, data).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::BBox;
    use crate::core::model::PlacedToken;

    #[test]
    fn written_json_reads_back() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let stream = TokenStream::new(vec![
            PlacedToken::new("이력서", BBox::new(400, 20, 600, 60)),
            PlacedToken::blank(BBox::new(100, 100, 200, 120)),
        ]);
        let exporter = JsonExporter::new(dir.path().to_path_buf(), "tokens");
        exporter.export(&stream)?;

        let contents = fs::read_to_string(exporter.path())?;
        assert!(contents.contains("[BLANK]"));
        let parsed: TokenStream = serde_json::from_str(&contents)?;
        assert_eq!(parsed, stream);
        Ok(())
    }
}
