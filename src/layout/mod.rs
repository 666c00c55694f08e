//! Layout analysis: turning positioned fragments into classified blocks.
//!
//! Per page, fragments are grouped into rows, trusted tables, raster images
//! and vector graphics are placed first, and the remaining rows are walked
//! top to bottom through an ordered list of block detectors.

pub mod cell_merge;
pub mod classifier;
pub mod detectors;
pub mod graphics;
pub mod heading;
pub mod occupancy;
pub mod options;
pub mod rows;
pub mod table_detector;

pub use cell_merge::{merge_field_rows, merge_matrix_rows, FieldRow};
pub use classifier::{classify_page, LayoutClassifier, PageAnalysis};
pub use detectors::{BlockDetector, Detection, PageScope};
pub use graphics::{GraphicClusterer, GraphicRegion};
pub use heading::{assign_levels, detect_numbering, DocumentClassificationContext, HeadingCandidate, TypographyBaseline};
pub use occupancy::OccupancyGrid;
pub use options::{ClassifyOptions, GraphicConfig, HeadingConfig, TableDetectorConfig};
pub use rows::group_rows;
pub use table_detector::{DetectedTable, TableDetector, TableMethod};
