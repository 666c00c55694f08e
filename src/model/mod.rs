//! Data model for layout classification.
//!
//! Input types describe what the upstream extractor delivers for a page
//! (fragments, raster images, vector primitives). Output types describe the
//! classified blocks and the document's table of contents.

mod block;
mod document;
mod geometry;
mod page;
mod text;
mod toc;

pub use block::{BlockContent, BlockKind, ContentBlock};
pub use document::{DocumentClassification, DocumentInput};
pub use geometry::BBox;
pub use page::{PageInput, PrimitiveKind, VectorPrimitive};
pub use text::{Row, TextFragment};
pub use toc::{NumberingKind, TocEntry};
