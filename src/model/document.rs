//! Document-level types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{BlockKind, ContentBlock, PageInput};

/// Input for a whole document: pages in order, numbered from 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentInput {
    /// Pages in document order
    #[serde(default)]
    pub pages: Vec<PageInput>,
}

impl DocumentInput {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from pages.
    pub fn from_pages(pages: Vec<PageInput>) -> Self {
        Self { pages }
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_num: u32) -> Option<&PageInput> {
        if page_num == 0 {
            return None;
        }
        self.pages.get((page_num - 1) as usize)
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: PageInput) {
        self.pages.push(page);
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Result of classifying a range of pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentClassification {
    /// Blocks per page number, in reading order
    pub per_page: BTreeMap<u32, Vec<ContentBlock>>,

    /// Number of blocks per kind
    pub statistics: BTreeMap<BlockKind, usize>,

    /// Number of blocks below the configured confidence floor
    pub low_confidence: usize,
}

impl DocumentClassification {
    /// Create an empty classification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the blocks of one page and update the statistics.
    pub fn add_page(&mut self, page: u32, blocks: Vec<ContentBlock>, confidence_floor: f32) {
        for block in &blocks {
            *self.statistics.entry(block.kind()).or_insert(0) += 1;
            if block.confidence < confidence_floor {
                self.low_confidence += 1;
            }
        }
        self.per_page.insert(page, blocks);
    }

    /// Blocks of a page.
    pub fn page(&self, page: u32) -> Option<&[ContentBlock]> {
        self.per_page.get(&page).map(Vec::as_slice)
    }

    /// Total number of blocks.
    pub fn block_count(&self) -> usize {
        self.per_page.values().map(Vec::len).sum()
    }

    /// Number of blocks of a kind.
    pub fn count(&self, kind: BlockKind) -> usize {
        self.statistics.get(&kind).copied().unwrap_or(0)
    }

    /// All blocks in page order.
    pub fn blocks(&self) -> impl Iterator<Item = &ContentBlock> {
        self.per_page.values().flatten()
    }
}
