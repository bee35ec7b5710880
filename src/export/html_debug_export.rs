use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::geometry::COORD_SCALE;
use crate::core::model::{PlacedToken, TokenStream};
use crate::export::Exporter;

/// Draws every token box on a 1000×1000 canvas for eyeballing reading order.
#[derive(Debug, Clone)]
pub struct HtmlDebugExporter {
    out_dir: PathBuf,
    stem: String,
}

impl HtmlDebugExporter {
    pub fn new(out_dir: PathBuf, stem: &str) -> Self {
        Self {
            out_dir,
            stem: stem.to_string(),
        }
    }

    fn token_to_div(idx: usize, entry: &PlacedToken) -> String {
        let bbox = entry.bbox;
        let kind = if entry.token.is_blank() { "blank" } else { "text" };
        let text = html_escape::encode_text(entry.token.as_str());
        format!(
            r#"<div class='bbox {kind}' style='left:{x0}px; top:{y0}px; width:{w}px; height:{h}px;' data-index='{idx}' data-text='{attr}' data-bbox='{x0},{y0},{x1},{y1}'>{text}</div>"#,
            x0 = bbox.x0,
            y0 = bbox.y0,
            x1 = bbox.x1,
            y1 = bbox.y1,
            w = bbox.width(),
            h = bbox.height(),
            attr = html_escape::encode_single_quoted_attribute(entry.token.as_str()),
        )
    }

    fn render(&self, stream: &TokenStream) -> String {
        let boxes_html: String = stream
            .entries()
            .iter()
            .enumerate()
            .map(|(idx, entry)| Self::token_to_div(idx, entry))
            .collect();

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset='utf-8'>
<title>{title}</title>
<style>
body {{ margin: 0; font-family: sans-serif; }}
#canvas {{ position: relative; width: {scale}px; height: {scale}px; border: 1px solid #ccc; }}
.bbox {{ position: absolute; box-sizing: border-box; font-size: 9px; overflow: hidden; white-space: nowrap; }}
.bbox.text {{ border: 1px solid rgba(0,0,255,0.6); background: rgba(100,100,255,0.1); }}
.bbox.blank {{ border: 1px dashed rgba(255,0,0,0.8); background: rgba(255,165,0,0.2); color: transparent; }}
#info {{ position: fixed; right: 10px; top: 10px; background: #fff; padding: 10px; border: 1px solid #ddd; max-width: 300px; }}
</style>
</head>
<body>
<div id='info'>Click a token to inspect. {count} tokens.</div>
<div id='canvas'>
{boxes}
</div>
<script>
const info = document.getElementById('info');
for (const el of document.querySelectorAll('.bbox')) {{
  el.addEventListener('click', () => {{
    info.innerHTML = `#${{el.dataset.index}}<br/>text: ${{el.dataset.text}}<br/>bbox: ${{el.dataset.bbox}}`;
  }});
}}
</script>
</body>
</html>"#,
            title = html_escape::encode_text(&self.stem),
            scale = COORD_SCALE,
            count = stream.len(),
            boxes = boxes_html,
        )
    }
}

impl Exporter for HtmlDebugExporter {
    fn export(&self, stream: &TokenStream) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(format!("{}.html", self.stem));
        fs::write(path, self.render(stream))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::BBox;

    #[test]
    fn escapes_token_text() {
        let stream = TokenStream::new(vec![
            PlacedToken::new("<b>", BBox::new(0, 0, 10, 10)),
            PlacedToken::blank(BBox::new(10, 0, 30, 10)),
        ]);
        let html = HtmlDebugExporter::new(PathBuf::from("unused"), "tokens").render(&stream);
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("class='bbox blank'"));
    }
}
