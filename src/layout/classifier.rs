//! Page classification and the document-level façade.

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::model::{
    BBox, BlockContent, BlockKind, ContentBlock, DocumentClassification, DocumentInput, PageInput, Row, TocEntry,
};

use super::cell_merge::merge_matrix_rows;
use super::detectors::{default_detectors, BlockDetector, Detection, PageScope, ParagraphDetector};
use super::graphics::GraphicClusterer;
use super::heading::{assign_levels, DocumentClassificationContext, HeadingCandidate, HeadingScorer, TypographyBaseline};
use super::options::{ClassifyOptions, HeadingConfig};
use super::rows::group_rows;
use super::table_detector::{TableDetector, TableMethod};

/// Result of classifying one page, with the row bookkeeping kept.
#[derive(Debug, Clone)]
pub struct PageAnalysis {
    /// Rows of the page, top to bottom
    pub rows: Vec<Row>,
    /// For each row, the kind of block that consumed it
    pub claims: Vec<Option<BlockKind>>,
    /// Emitted blocks in reading order
    pub blocks: Vec<ContentBlock>,
}

/// Classify a single page.
pub fn classify_page(
    page: &PageInput,
    page_number: u32,
    options: &ClassifyOptions,
    baseline: &TypographyBaseline,
) -> PageAnalysis {
    let bounds = page.effective_bounds();
    let rows = group_rows(&page.fragments, options.row_tolerance);
    let mut claims: Vec<Option<BlockKind>> = vec![None; rows.len()];
    let mut blocks: Vec<ContentBlock> = Vec::new();
    let mut exclusions: Vec<(BBox, BlockKind)> = Vec::new();

    for region in page.table_regions.iter().filter(|r| r.is_valid()) {
        exclusions.push((*region, BlockKind::Table));
        if overlaps_any(&blocks, region, options.max_overlap) {
            log::debug!("Page {}: table region {:?} overlaps another table, skipped", page_number, region);
            continue;
        }
        blocks.push(trusted_table(region, &rows, page_number, options));
    }

    let mut rasters: Vec<BBox> = Vec::new();
    for image in &page.images {
        if !image.is_valid() {
            log::trace!("Ignoring invalid image box on page {}", page_number);
            continue;
        }
        exclusions.push((*image, BlockKind::Image));
        if overlaps_any(&blocks, image, options.max_overlap)
            || rasters.iter().any(|r| r.overlap_ratio(image) > options.max_overlap)
        {
            log::debug!("Page {}: image {:?} inside an emitted block, skipped", page_number, image);
            continue;
        }
        rasters.push(*image);
    }

    let claimed: Vec<BBox> = exclusions.iter().map(|(b, _)| *b).collect();
    let graphics = GraphicClusterer::new(&options.graphics).find_regions(bounds, &rows, &claimed, &page.primitives);
    for region in graphics {
        if overlaps_any(&blocks, &region.bbox, options.max_overlap) {
            log::debug!(
                "Page {}: graphic region {:?} overlaps an emitted block, skipped",
                page_number,
                region.bbox
            );
            continue;
        }
        exclusions.push((region.bbox, BlockKind::Image));

        // Raster images drawn inside the graphic become part of it
        let (inside, outside): (Vec<BBox>, Vec<BBox>) = rasters
            .into_iter()
            .partition(|r| r.overlap_ratio(&region.bbox) > options.max_overlap);
        rasters = outside;

        let mut block = region.into_block(page_number, options.graphics.confidence);
        if !inside.is_empty() {
            block = block.with_meta("raster_images", inside.len());
        }
        blocks.push(block);
    }

    for image in rasters {
        blocks.push(ContentBlock::new(BlockContent::Image, image, 0.95, page_number).with_meta("method", "raster"));
    }

    for (i, row) in rows.iter().enumerate() {
        claims[i] = exclusions
            .iter()
            .find(|(b, _)| row.bbox.containment_in(b) >= options.containment_ratio)
            .map(|(_, kind)| *kind);
    }

    let exclusion_boxes: Vec<BBox> = exclusions.iter().map(|(b, _)| *b).collect();
    let scope = PageScope {
        page,
        page_number,
        rows: &rows,
        options,
        baseline,
        bounds,
        exclusions: &exclusion_boxes,
    };
    let detectors = default_detectors(options);
    let claimed_by_detector = |j: usize| detectors.iter().any(|d| d.try_classify(&scope, j).is_some());

    let mut i = 0;
    while i < rows.len() {
        if claims[i].is_some() {
            i += 1;
            continue;
        }

        let detection = detect_at(&detectors, &scope, i)
            .or_else(|| ParagraphDetector.detect(&scope, i, &claimed_by_detector));
        let Some(detection) = detection else {
            i += 1;
            continue;
        };

        if overlaps_any(&blocks, &detection.block.bbox, options.max_overlap) {
            log::trace!(
                "Suppressing {} at row {} on page {}: overlaps an emitted block",
                detection.block.kind().as_str(),
                i,
                page_number
            );
            i += 1;
            continue;
        }

        let end = detection.end.clamp(i + 1, rows.len());
        let kind = detection.block.kind();
        for claim in &mut claims[i..end] {
            *claim = Some(kind);
        }
        blocks.push(detection.block);
        i = end;
    }

    blocks.sort_by(|a, b| {
        a.bbox
            .y0
            .total_cmp(&b.bbox.y0)
            .then_with(|| a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    let blocks = blocks
        .into_iter()
        .map(|block| {
            if block.confidence < options.confidence_floor {
                block.with_meta("low_confidence", "true")
            } else {
                block
            }
        })
        .collect::<Vec<_>>();

    log::debug!("Page {}: {} rows, {} blocks", page_number, rows.len(), blocks.len());

    PageAnalysis { rows, claims, blocks }
}

fn overlaps_any(blocks: &[ContentBlock], bbox: &BBox, limit: f32) -> bool {
    blocks.iter().any(|b| b.bbox.overlap_ratio(bbox) > limit)
}

/// First detector match at `cursor`.
fn detect_at(
    detectors: &[Box<dyn BlockDetector>],
    scope: &PageScope<'_>,
    cursor: usize,
) -> Option<Detection> {
    detectors.iter().find_map(|detector| {
        let detection = detector.try_classify(scope, cursor)?;
        log::trace!("Row {} claimed as {}", cursor, detector.kind().as_str());
        Some(detection)
    })
}

/// Table block for a region supplied by an external table finder.
fn trusted_table(region: &BBox, rows: &[Row], page_number: u32, options: &ClassifyOptions) -> ContentBlock {
    let members: Vec<Row> = rows
        .iter()
        .filter(|r| r.bbox.containment_in(region) >= options.containment_ratio)
        .cloned()
        .collect();

    let detector = TableDetector::with_config(options.table.clone());
    let columns = detector.cluster_columns(&members, 1);
    let mut matrix = detector.build_matrix(&members, &columns);
    if options.merge_continuations && columns.len() == 2 {
        matrix = merge_matrix_rows(&matrix);
    }
    let row_count = matrix.len();
    let col_count = matrix.first().map(Vec::len).unwrap_or(0);

    ContentBlock::new(BlockContent::Table(matrix), *region, 0.9, page_number)
        .with_meta("rows", row_count)
        .with_meta("cols", col_count)
        .with_meta("method", TableMethod::TableFinder.as_str())
}

/// Heading candidates of an analyzed page.
///
/// Rows consumed by tables, images or page metadata are never candidates.
pub fn heading_candidates(
    analysis: &PageAnalysis,
    page_number: u32,
    page_width: f32,
    scorer_config: &HeadingConfig,
    baseline: &TypographyBaseline,
) -> Vec<HeadingCandidate> {
    let scorer = HeadingScorer::new(baseline, scorer_config, page_width);
    analysis
        .rows
        .iter()
        .zip(&analysis.claims)
        .enumerate()
        .filter(|(_, (_, claim))| {
            !matches!(claim, Some(BlockKind::Table | BlockKind::Metadata | BlockKind::Image))
        })
        .filter_map(|(order, (row, _))| scorer.candidate(row, page_number, order))
        .filter(|c| c.score > 0.0)
        .collect()
}

/// Layout classifier for a whole document.
///
/// The typography baseline is learned once from the first pages; pages are
/// then classified independently, in parallel unless disabled.
#[derive(Debug, Clone)]
pub struct LayoutClassifier {
    document: DocumentInput,
    options: ClassifyOptions,
    baseline: TypographyBaseline,
}

impl LayoutClassifier {
    /// Create a classifier with default options.
    pub fn new(document: DocumentInput) -> Self {
        Self::with_options(document, ClassifyOptions::default())
    }

    /// Create a classifier with custom options.
    pub fn with_options(document: DocumentInput, options: ClassifyOptions) -> Self {
        let baseline = TypographyBaseline::learn(&document.pages, options.headings.sample_pages);
        Self {
            document,
            options,
            baseline,
        }
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.document.page_count()
    }

    /// Options in use.
    pub fn options(&self) -> &ClassifyOptions {
        &self.options
    }

    /// Typography baseline learned from the document.
    pub fn baseline(&self) -> &TypographyBaseline {
        &self.baseline
    }

    /// The document being classified.
    pub fn document(&self) -> &DocumentInput {
        &self.document
    }

    fn page(&self, page_number: u32) -> Result<&PageInput> {
        self.document
            .get_page(page_number)
            .ok_or(Error::InvalidPage(page_number, self.page_count()))
    }

    /// Classify one page (1-indexed).
    pub fn classify_page(&self, page_number: u32) -> Result<Vec<ContentBlock>> {
        let page = self.page(page_number)?;
        Ok(classify_page(page, page_number, &self.options, &self.baseline).blocks)
    }

    /// Classify pages `start_page..=end_page`.
    pub fn classify_document(&self, start_page: u32, end_page: u32) -> Result<DocumentClassification> {
        if start_page > end_page {
            return Err(Error::InvalidPageRange(format!(
                "start {} is after end {}",
                start_page, end_page
            )));
        }
        self.page(start_page)?;
        self.page(end_page)?;

        let classify = |n: u32| -> Result<(u32, Vec<ContentBlock>)> { Ok((n, self.classify_page(n)?)) };
        let pages: Vec<(u32, Vec<ContentBlock>)> = if self.options.parallel {
            (start_page..=end_page)
                .into_par_iter()
                .map(classify)
                .collect::<Result<Vec<_>>>()?
        } else {
            (start_page..=end_page).map(classify).collect::<Result<Vec<_>>>()?
        };

        let mut result = DocumentClassification::new();
        for (page_number, blocks) in pages {
            result.add_page(page_number, blocks, self.options.confidence_floor);
        }

        log::debug!(
            "Classified pages {}..={}: {} blocks, {} below confidence floor",
            start_page,
            end_page,
            result.block_count(),
            result.low_confidence
        );
        Ok(result)
    }

    /// Classify every page of the document.
    pub fn classify_all(&self) -> Result<DocumentClassification> {
        if self.document.is_empty() {
            return Ok(DocumentClassification::new());
        }
        self.classify_document(1, self.page_count())
    }

    /// Build the table of contents of the whole document.
    ///
    /// Candidates are extracted page by page (in parallel unless disabled),
    /// then filtered and leveled in one pass in document order.
    pub fn build_table_of_contents(&self, min_heading_score: f32, detect_unnumbered: bool) -> Vec<TocEntry> {
        let mut config = self.options.headings.clone();
        config.min_score = min_heading_score;
        config.detect_unnumbered = detect_unnumbered;

        let extract = |(index, page): (usize, &PageInput)| -> Vec<HeadingCandidate> {
            let page_number = index as u32 + 1;
            let analysis = classify_page(page, page_number, &self.options, &self.baseline);
            heading_candidates(
                &analysis,
                page_number,
                page.effective_bounds().width(),
                &config,
                &self.baseline,
            )
        };

        let per_page: Vec<Vec<HeadingCandidate>> = if self.options.parallel {
            self.document.pages.par_iter().enumerate().map(extract).collect()
        } else {
            self.document.pages.iter().enumerate().map(extract).collect()
        };
        let candidates: Vec<HeadingCandidate> = per_page.into_iter().flatten().collect();

        let mut context = DocumentClassificationContext::new(self.baseline.clone());
        assign_levels(&candidates, &mut context, min_heading_score, detect_unnumbered)
    }
}
