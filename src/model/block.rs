//! Classified content blocks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::BBox;

/// Kind of a content block, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Body text
    Text,
    /// A table
    Table,
    /// A section heading
    Heading,
    /// A bulleted or enumerated list
    List,
    /// A formula
    Formula,
    /// A raster image or vector graphic
    Image,
    /// Page furniture such as page numbers
    Metadata,
}

impl BlockKind {
    /// All kinds, in declaration order.
    pub const ALL: [BlockKind; 7] = [
        BlockKind::Text,
        BlockKind::Table,
        BlockKind::Heading,
        BlockKind::List,
        BlockKind::Formula,
        BlockKind::Image,
        BlockKind::Metadata,
    ];

    /// Lower-case name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Table => "table",
            BlockKind::Heading => "heading",
            BlockKind::List => "list",
            BlockKind::Formula => "formula",
            BlockKind::Image => "image",
            BlockKind::Metadata => "metadata",
        }
    }
}

/// Payload of a content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum BlockContent {
    /// Paragraph text
    Text(String),
    /// Cell matrix, row-major
    Table(Vec<Vec<String>>),
    /// Heading text
    Heading(String),
    /// List item texts, markers removed
    List(Vec<String>),
    /// Formula text
    Formula(String),
    /// Image or graphic region
    Image,
    /// Page metadata text
    Metadata(String),
}

/// A classified region of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Kind and payload
    pub content: BlockContent,

    /// Region on the page
    pub bbox: BBox,

    /// Classification confidence in [0, 1]
    pub confidence: f32,

    /// Page number (1-indexed)
    pub page: u32,

    /// Detail such as row/column counts, numbering kind or detection method
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl ContentBlock {
    /// Create a new block.
    pub fn new(content: BlockContent, bbox: BBox, confidence: f32, page: u32) -> Self {
        Self {
            content,
            bbox,
            confidence: confidence.clamp(0.0, 1.0),
            page,
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata entry.
    pub fn with_meta(mut self, key: &str, value: impl ToString) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    /// Kind of this block.
    pub fn kind(&self) -> BlockKind {
        match self.content {
            BlockContent::Text(_) => BlockKind::Text,
            BlockContent::Table(_) => BlockKind::Table,
            BlockContent::Heading(_) => BlockKind::Heading,
            BlockContent::List(_) => BlockKind::List,
            BlockContent::Formula(_) => BlockKind::Formula,
            BlockContent::Image => BlockKind::Image,
            BlockContent::Metadata(_) => BlockKind::Metadata,
        }
    }

    /// Get a metadata value.
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Plain text of the block; tables are tab-separated, lists one item per line.
    pub fn plain_text(&self) -> String {
        match &self.content {
            BlockContent::Text(s)
            | BlockContent::Heading(s)
            | BlockContent::Formula(s)
            | BlockContent::Metadata(s) => s.clone(),
            BlockContent::Table(rows) => rows
                .iter()
                .map(|r| r.join("\t"))
                .collect::<Vec<_>>()
                .join("\n"),
            BlockContent::List(items) => items.join("\n"),
            BlockContent::Image => String::new(),
        }
    }

    /// Check if this block is a table.
    pub fn is_table(&self) -> bool {
        matches!(self.content, BlockContent::Table(_))
    }

    /// Check if this block is an image or graphic.
    pub fn is_image(&self) -> bool {
        matches!(self.content, BlockContent::Image)
    }

    /// Cell matrix, if this is a table.
    pub fn table(&self) -> Option<&[Vec<String>]> {
        match &self.content {
            BlockContent::Table(rows) => Some(rows),
            _ => None,
        }
    }
}
