pub mod html_debug_export;
pub mod json_export;
pub mod text_export;

use anyhow::Result;

use crate::core::model::TokenStream;

pub use html_debug_export::HtmlDebugExporter;
pub use json_export::JsonExporter;
pub use text_export::TextExporter;

pub trait Exporter {
    fn export(&self, stream: &TokenStream) -> Result<()>;
}
