pub mod config;
pub mod core;
pub mod export;
pub mod extract;
pub mod filter;
pub mod labeling;
pub mod merge;
pub mod pipeline;

pub use config::PipelineConfig;
pub use core::doc_type::DocType;
pub use core::error::{Error, Result};
pub use core::geometry::BBox;
pub use core::model::{PlacedToken, RawOcrDocument, Token, TokenStream};
pub use filter::{LabelKeywordSpec, Template};
pub use pipeline::Pipeline;
