pub mod doc_type;
pub mod error;
pub mod geometry;
pub mod model;
pub mod text;
