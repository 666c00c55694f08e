//! Rendering module for turning classification results into output formats.

mod json;
mod markdown;
mod outline;
mod text;

pub use json::{to_json, JsonFormat};
pub use markdown::to_markdown;
pub use outline::{toc_to_markdown, TocStyle};
pub use text::to_text;
