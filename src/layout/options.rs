//! Classification options and configuration.

use serde::{Deserialize, Serialize};

/// Options for classifying page layouts.
///
/// Every field has a default; when deserialized, a partial document only
/// overrides the fields it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyOptions {
    /// Vertical tolerance for grouping fragments into rows
    pub row_tolerance: f32,

    /// Maximum vertical gap between rows of one paragraph
    pub paragraph_gap: f32,

    /// Maximum left-margin drift between rows of one paragraph
    pub paragraph_margin: f32,

    /// Minimum visible characters for a paragraph to be emitted
    pub min_paragraph_chars: usize,

    /// Fraction of a row that must lie inside a table or image to be skipped
    pub containment_ratio: f32,

    /// Maximum overlap between two emitted blocks (fraction of the smaller)
    pub max_overlap: f32,

    /// Blocks below this confidence are flagged `low_confidence`
    pub confidence_floor: f32,

    /// Merge wrapped cells of field/value tables
    pub merge_continuations: bool,

    /// Classify pages in parallel
    pub parallel: bool,

    /// Table detection
    pub table: TableDetectorConfig,

    /// Heading detection and table of contents
    pub headings: HeadingConfig,

    /// Graphic region clustering
    pub graphics: GraphicConfig,
}

impl ClassifyOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the row grouping tolerance.
    pub fn with_row_tolerance(mut self, tolerance: f32) -> Self {
        self.row_tolerance = tolerance;
        self
    }

    /// Set the paragraph gap threshold.
    pub fn with_paragraph_gap(mut self, gap: f32) -> Self {
        self.paragraph_gap = gap;
        self
    }

    /// Set the confidence floor.
    pub fn with_confidence_floor(mut self, floor: f32) -> Self {
        self.confidence_floor = floor;
        self
    }

    /// Enable or disable continuation merging in tables.
    pub fn with_merge_continuations(mut self, merge: bool) -> Self {
        self.merge_continuations = merge;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Accept unnumbered headings with strong typography.
    pub fn with_unnumbered_headings(mut self, detect: bool) -> Self {
        self.headings.detect_unnumbered = detect;
        self
    }

    /// Set the minimum heading score.
    pub fn with_min_heading_score(mut self, score: f32) -> Self {
        self.headings.min_score = score;
        self
    }

    /// Set table detector configuration.
    pub fn with_table_config(mut self, config: TableDetectorConfig) -> Self {
        self.table = config;
        self
    }

    /// Set graphic clustering configuration.
    pub fn with_graphic_config(mut self, config: GraphicConfig) -> Self {
        self.graphics = config;
        self
    }
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            row_tolerance: 3.0,
            paragraph_gap: 12.0,
            paragraph_margin: 20.0,
            min_paragraph_chars: 3,
            containment_ratio: 0.7,
            max_overlap: 0.3,
            confidence_floor: 0.0,
            merge_continuations: true,
            parallel: true,
            table: TableDetectorConfig::default(),
            headings: HeadingConfig::default(),
            graphics: GraphicConfig::default(),
        }
    }
}

/// Table detector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableDetectorConfig {
    /// Minimum number of rows to consider as table
    pub min_rows: usize,
    /// Minimum number of columns to consider as table
    pub min_columns: usize,
    /// Number of rows examined when looking for columns
    pub window_rows: usize,
    /// Distance within which x positions belong to the same column
    pub column_tolerance: f32,
    /// Alignment score that accepts a table outright
    pub alignment_threshold: f32,
    /// Lower alignment score accepted when the content mixes text and numbers
    pub mixed_content_threshold: f32,
    /// Fraction of a row's fragments that must align for the row to extend a table
    pub row_fit_ratio: f32,
    /// Consecutive empty rows tolerated inside a table
    pub max_gap_rows: usize,
    /// Maximum vertical distance between consecutive table rows
    pub max_row_gap: f32,
    /// Longest text a single-fragment row may carry and still extend a table
    pub max_single_cell_chars: usize,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 3,
            min_columns: 2,
            window_rows: 5,
            column_tolerance: 8.0,
            alignment_threshold: 0.7,
            mixed_content_threshold: 0.6,
            row_fit_ratio: 0.7,
            max_gap_rows: 2,
            max_row_gap: 30.0,
            max_single_cell_chars: 40,
        }
    }
}

/// Heading detection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingConfig {
    /// Minimum score for a row to become a heading
    pub min_score: f32,
    /// Accept unnumbered rows with strong typography
    pub detect_unnumbered: bool,
    /// Minimum visible characters of a heading
    pub min_chars: usize,
    /// Maximum visible characters of a heading
    pub max_chars: usize,
    /// Number of leading pages sampled for the typography baseline
    pub sample_pages: usize,
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            min_score: 12.0,
            detect_unnumbered: false,
            min_chars: 5,
            max_chars: 160,
            sample_pages: 5,
        }
    }
}

/// Graphic region clustering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicConfig {
    /// Cell size of the coarse occupancy grid
    pub coarse_cell: f32,
    /// Occupied ratio above which graphic detection is skipped
    pub max_occupied_ratio: f32,
    /// Minimum number of free primitives to attempt clustering
    pub min_primitives: usize,
    /// Cell size of the clustering grid
    pub fine_cell: f32,
    /// Minimum number of cells in a cluster
    pub min_cluster_cells: usize,
    /// Minimum cluster width
    pub min_width: f32,
    /// Minimum cluster height
    pub min_height: f32,
    /// Confidence assigned to graphic regions
    pub confidence: f32,
}

impl Default for GraphicConfig {
    fn default() -> Self {
        Self {
            coarse_cell: 100.0,
            max_occupied_ratio: 0.5,
            min_primitives: 500,
            fine_cell: 50.0,
            min_cluster_cells: 20,
            min_width: 200.0,
            min_height: 150.0,
            confidence: 0.8,
        }
    }
}
