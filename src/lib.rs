//! # pagesift
//!
//! Layout block classification for PDF pages.
//!
//! Given the positioned text fragments, raster images and vector primitives
//! of a page, pagesift tells which regions are body text, tables, headings,
//! lists, formulas, images or page furniture, and builds a hierarchical
//! table of contents for the whole document. It is tuned for the Spanish
//! regulatory reports of electricity and gas utilities, where "tables" are
//! often field/value grids whose cells wrap across rows.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pagesift::{classify_file, render};
//!
//! fn main() -> pagesift::Result<()> {
//!     // Classify every page of an extracted document
//!     let result = classify_file("informe.json")?;
//!
//!     // Print it as plain text
//!     println!("{}", render::to_text(&result));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Block detection**: text, tables, headings, lists, formulas, images, metadata
//! - **Table recovery**: column clustering, cell matrices, wrapped-cell merging
//! - **Table of contents**: numbering patterns, typography scoring, level assignment
//! - **Vector graphics**: charts and diagrams clustered from drawing primitives
//! - **Parallel processing**: Uses Rayon for multi-page documents

pub mod error;
pub mod layout;
pub mod model;
pub mod render;

// Re-export commonly used types
pub use error::{Error, Result};
pub use layout::{
    group_rows, merge_field_rows, merge_matrix_rows, ClassifyOptions, FieldRow, GraphicConfig,
    HeadingConfig, LayoutClassifier, TableDetectorConfig,
};
pub use model::{
    BBox, BlockContent, BlockKind, ContentBlock, DocumentClassification, DocumentInput,
    NumberingKind, PageInput, PrimitiveKind, Row, TextFragment, TocEntry, VectorPrimitive,
};
pub use render::{JsonFormat, TocStyle};

use std::io::Read;
use std::path::Path;

/// Load an extracted document from a JSON file.
///
/// The file holds a [`DocumentInput`]: an object with a `pages` array, each
/// page carrying its size, fragments, images, primitives and table regions.
///
/// # Example
///
/// ```no_run
/// use pagesift::load_document;
///
/// let doc = load_document("informe.json").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<DocumentInput> {
    let data = std::fs::read(path.as_ref())?;
    load_document_bytes(&data)
}

/// Load an extracted document from JSON bytes.
pub fn load_document_bytes(data: &[u8]) -> Result<DocumentInput> {
    let doc: DocumentInput = serde_json::from_slice(data)?;
    log::debug!("Loaded document with {} pages", doc.page_count());
    Ok(doc)
}

/// Load an extracted document from a reader.
pub fn load_document_reader<R: Read>(reader: R) -> Result<DocumentInput> {
    let doc: DocumentInput = serde_json::from_reader(reader)?;
    Ok(doc)
}

/// Load classification options from a JSON file.
///
/// Only the fields present in the file override the defaults.
pub fn load_options<P: AsRef<Path>>(path: P) -> Result<ClassifyOptions> {
    let data = std::fs::read(path.as_ref())?;
    Ok(serde_json::from_slice(&data)?)
}

/// Classify every page of a JSON document file with default options.
///
/// # Example
///
/// ```no_run
/// use pagesift::{classify_file, BlockKind};
///
/// let result = classify_file("informe.json").unwrap();
/// println!("Tables: {}", result.count(BlockKind::Table));
/// ```
pub fn classify_file<P: AsRef<Path>>(path: P) -> Result<DocumentClassification> {
    classify_file_with_options(path, ClassifyOptions::default())
}

/// Classify every page of a JSON document file with custom options.
pub fn classify_file_with_options<P: AsRef<Path>>(
    path: P,
    options: ClassifyOptions,
) -> Result<DocumentClassification> {
    let doc = load_document(path)?;
    LayoutClassifier::with_options(doc, options).classify_all()
}

/// Build the table of contents of a JSON document file.
///
/// # Example
///
/// ```no_run
/// use pagesift::toc_file;
///
/// for entry in toc_file("informe.json").unwrap() {
///     println!("{}{}", "  ".repeat(entry.level as usize - 1), entry.text);
/// }
/// ```
pub fn toc_file<P: AsRef<Path>>(path: P) -> Result<Vec<TocEntry>> {
    let doc = load_document(path)?;
    let classifier = LayoutClassifier::new(doc);
    let headings = &classifier.options().headings;
    Ok(classifier.build_table_of_contents(headings.min_score, headings.detect_unnumbered))
}

/// Builder for classifying documents.
///
/// # Example
///
/// ```no_run
/// use pagesift::Pagesift;
///
/// let result = Pagesift::new()
///     .sequential()
///     .with_unnumbered_headings(true)
///     .load("informe.json")?
///     .classify()?;
/// # Ok::<(), pagesift::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pagesift {
    options: ClassifyOptions,
}

impl Pagesift {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing options.
    pub fn with_options(mut self, options: ClassifyOptions) -> Self {
        self.options = options;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Enable or disable merging of wrapped table cells.
    pub fn with_merge_continuations(mut self, merge: bool) -> Self {
        self.options = self.options.with_merge_continuations(merge);
        self
    }

    /// Include unnumbered headings in the table of contents.
    pub fn with_unnumbered_headings(mut self, detect: bool) -> Self {
        self.options = self.options.with_unnumbered_headings(detect);
        self
    }

    /// Set the minimum heading score.
    pub fn with_min_heading_score(mut self, score: f32) -> Self {
        self.options = self.options.with_min_heading_score(score);
        self
    }

    /// Set the confidence below which blocks are flagged.
    pub fn with_confidence_floor(mut self, floor: f32) -> Self {
        self.options = self.options.with_confidence_floor(floor);
        self
    }

    /// Load a JSON document file.
    pub fn load<P: AsRef<Path>>(self, path: P) -> Result<LoadedDocument> {
        let doc = load_document(path)?;
        Ok(self.document(doc))
    }

    /// Load a document from JSON bytes.
    pub fn load_bytes(self, data: &[u8]) -> Result<LoadedDocument> {
        let doc = load_document_bytes(data)?;
        Ok(self.document(doc))
    }

    /// Use a document built in code.
    pub fn document(self, doc: DocumentInput) -> LoadedDocument {
        LoadedDocument {
            classifier: LayoutClassifier::with_options(doc, self.options),
        }
    }
}

/// A loaded document ready for classification.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    classifier: LayoutClassifier,
}

impl LoadedDocument {
    /// Get the underlying classifier.
    pub fn classifier(&self) -> &LayoutClassifier {
        &self.classifier
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.classifier.page_count()
    }

    /// Classify every page.
    pub fn classify(&self) -> Result<DocumentClassification> {
        self.classifier.classify_all()
    }

    /// Classify a range of pages (1-indexed, inclusive).
    pub fn classify_pages(&self, start_page: u32, end_page: u32) -> Result<DocumentClassification> {
        self.classifier.classify_document(start_page, end_page)
    }

    /// Build the table of contents with the configured heading options.
    pub fn table_of_contents(&self) -> Vec<TocEntry> {
        let headings = &self.classifier.options().headings;
        self.classifier
            .build_table_of_contents(headings.min_score, headings.detect_unnumbered)
    }

    /// Classify every page and render the result as JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.classify()?, format)
    }

    /// Classify every page and render the result as plain text.
    pub fn to_text(&self) -> Result<String> {
        Ok(render::to_text(&self.classify()?))
    }

    /// Render the table of contents as a Markdown outline.
    pub fn toc_markdown(&self) -> String {
        render::toc_to_markdown(&self.table_of_contents(), TocStyle::default())
    }
}
