//! Block detectors tried at each row of a page.
//!
//! Each detector looks at the row under the cursor (and possibly the rows
//! after it) and either claims a block or passes. The page classifier tries
//! them in a fixed order; the first match wins. Paragraphs are the fallback
//! when no detector claims a row.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{BBox, BlockContent, BlockKind, ContentBlock, PageInput, Row};

use super::cell_merge::merge_matrix_rows;
use super::heading::{HeadingScorer, TypographyBaseline};
use super::options::ClassifyOptions;
use super::rows::{extend_paragraph, join_rows, ParagraphLimits};
use super::table_detector::{is_bullet_marker, TableDetector};

static PAGE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:p[áa]gina|p[áa]g\.?)\s*\d{1,4}(?:\s*(?:de|/)\s*\d{1,4})?$").expect("valid page label regex")
});
static PAGE_FRACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,4}\s*/\s*\d{1,4}$").expect("valid page fraction regex"));
static BARE_PAGE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-–—]?\s*\d{1,4}\s*[-–—]?$").expect("valid bare page number regex"));
static ITEM_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\(\d{1,3}\)|\d{1,3}\)|\([a-zA-Z]\)|[ivx]{1,4}\))(?:\s+|$)").expect("valid item marker regex")
});

const RELATION_SYMBOLS: &[char] = &['=', '≤', '≥', '∑', '√', '∫', '±'];
const MATH_SYMBOLS: &str = "=+-−*/×÷<>≤≥≈≠∑√∫±^()[]{}|·∞∂∆′";

/// Everything a detector can see about the page being classified.
#[derive(Debug, Clone, Copy)]
pub struct PageScope<'a> {
    /// The page input
    pub page: &'a PageInput,
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Rows of the page, top to bottom
    pub rows: &'a [Row],
    /// Classification options
    pub options: &'a ClassifyOptions,
    /// Typography baseline of the document
    pub baseline: &'a TypographyBaseline,
    /// Usable page area
    pub bounds: BBox,
    /// Regions taken by trusted tables, raster images and graphics
    pub exclusions: &'a [BBox],
}

impl PageScope<'_> {
    /// Whether row `index` lies mostly inside an excluded region.
    pub fn is_excluded(&self, index: usize) -> bool {
        let Some(row) = self.rows.get(index) else {
            return false;
        };
        self.exclusions
            .iter()
            .any(|e| row.bbox.containment_in(e) >= self.options.containment_ratio)
    }
}

/// A block claimed by a detector, covering rows `cursor..end`.
#[derive(Debug, Clone)]
pub struct Detection {
    /// The detected block
    pub block: ContentBlock,
    /// Index one past the last consumed row
    pub end: usize,
}

/// A content-type detector.
pub trait BlockDetector: Send + Sync {
    /// Kind of block this detector produces.
    fn kind(&self) -> BlockKind;

    /// Try to claim a block starting at row `cursor`.
    fn try_classify(&self, scope: &PageScope<'_>, cursor: usize) -> Option<Detection>;
}

/// The detectors in precedence order.
pub fn default_detectors(options: &ClassifyOptions) -> Vec<Box<dyn BlockDetector>> {
    vec![
        Box::new(MetadataDetector),
        Box::new(FormulaDetector),
        Box::new(HeadingDetector),
        Box::new(ListDetector),
        Box::new(TableDetector::with_config(options.table.clone())),
    ]
}

/// Page numbers and similar page furniture.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataDetector;

impl BlockDetector for MetadataDetector {
    fn kind(&self) -> BlockKind {
        BlockKind::Metadata
    }

    fn try_classify(&self, scope: &PageScope<'_>, cursor: usize) -> Option<Detection> {
        let row = scope.rows.get(cursor)?;
        let text = row.text();

        let labelled = PAGE_LABEL.is_match(&text) || PAGE_FRACTION.is_match(&text);
        let in_band = {
            let band = scope.bounds.height() * 0.1;
            row.bbox.y1 <= scope.bounds.y0 + band || row.bbox.y0 >= scope.bounds.y1 - band
        };
        if !labelled && !(in_band && BARE_PAGE_NUMBER.is_match(&text)) {
            return None;
        }

        log::trace!("Metadata on page {}: {:?}", scope.page_number, text);
        let block = ContentBlock::new(BlockContent::Metadata(text), row.bbox, 0.9, scope.page_number)
            .with_meta("method", "page-number");
        Some(Detection { block, end: cursor + 1 })
    }
}

/// Single-row formulas.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormulaDetector;

impl FormulaDetector {
    /// Whether a text looks like a formula rather than prose.
    pub fn is_formula(text: &str) -> bool {
        if text.chars().count() > 120 || !text.contains(RELATION_SYMBOLS) {
            return false;
        }

        let visible: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
        if visible.is_empty() {
            return false;
        }
        let math = visible
            .iter()
            .filter(|c| c.is_ascii_digit() || MATH_SYMBOLS.contains(**c) || is_greek(**c))
            .count();
        if (math as f32) < visible.len() as f32 * 0.25 {
            return false;
        }

        let long_words = text
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| w.chars().count() >= 4 && !w.chars().any(is_greek))
            .count();
        long_words <= 3
    }
}

fn is_greek(c: char) -> bool {
    ('\u{0370}'..='\u{03FF}').contains(&c)
}

impl BlockDetector for FormulaDetector {
    fn kind(&self) -> BlockKind {
        BlockKind::Formula
    }

    fn try_classify(&self, scope: &PageScope<'_>, cursor: usize) -> Option<Detection> {
        let row = scope.rows.get(cursor)?;
        let text = row.text();
        if !Self::is_formula(&text) {
            return None;
        }

        let confidence = if row.is_italic() { 0.75 } else { 0.6 };
        let block = ContentBlock::new(BlockContent::Formula(text), row.bbox, confidence, scope.page_number);
        Some(Detection { block, end: cursor + 1 })
    }
}

/// Single-row section headings.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingDetector;

impl BlockDetector for HeadingDetector {
    fn kind(&self) -> BlockKind {
        BlockKind::Heading
    }

    fn try_classify(&self, scope: &PageScope<'_>, cursor: usize) -> Option<Detection> {
        let row = scope.rows.get(cursor)?;
        let config = &scope.options.headings;
        let scorer = HeadingScorer::new(scope.baseline, config, scope.bounds.width());
        let candidate = scorer.candidate(row, scope.page_number, cursor)?;
        if !scorer.accepts(&candidate) {
            return None;
        }

        let confidence = (0.6 + (candidate.score - config.min_score) / 20.0).clamp(0.6, 0.95);
        let mut block = ContentBlock::new(
            BlockContent::Heading(candidate.text),
            candidate.bbox,
            confidence,
            scope.page_number,
        )
        .with_meta("score", format!("{:.1}", candidate.score));
        if let Some(numbering) = candidate.numbering {
            block = block
                .with_meta("numbering", numbering)
                .with_meta("level", numbering.level());
        }
        Some(Detection { block, end: cursor + 1 })
    }
}

/// Bulleted and enumerated lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListDetector;

/// Kind of marker that opens a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarker {
    /// "•", "-", "▪", ...
    Bullet,
    /// "1)", "(1)", "(a)", "i)"
    Enumerated,
}

impl ListMarker {
    fn as_str(&self) -> &'static str {
        match self {
            ListMarker::Bullet => "bullet",
            ListMarker::Enumerated => "enumerated",
        }
    }
}

impl ListDetector {
    /// Split a leading item marker off a row text.
    pub fn split_marker(text: &str) -> Option<(ListMarker, &str)> {
        let text = text.trim_start();
        let first = text.chars().next()?;

        let token = text.split_whitespace().next()?;
        if is_bullet_marker(token) {
            return Some((ListMarker::Bullet, text[token.len()..].trim_start()));
        }
        // Bullet glued to the item text: "•Item"
        if is_bullet_marker(first.encode_utf8(&mut [0; 4])) && first != '-' && first != '*' {
            return Some((ListMarker::Bullet, text[first.len_utf8()..].trim_start()));
        }

        let marker = ITEM_MARKER.find(text)?;
        Some((ListMarker::Enumerated, text[marker.end()..].trim_start()))
    }
}

impl BlockDetector for ListDetector {
    fn kind(&self) -> BlockKind {
        BlockKind::List
    }

    fn try_classify(&self, scope: &PageScope<'_>, cursor: usize) -> Option<Detection> {
        let first = scope.rows.get(cursor)?;
        let first_text = first.text();
        let (marker, item) = Self::split_marker(&first_text)?;

        let mut items = vec![item.to_string()];
        let mut bbox = first.bbox;
        let mut end = cursor + 1;

        while end < scope.rows.len() {
            let row = &scope.rows[end];
            let previous = &scope.rows[end - 1];
            if row.bbox.y0 - previous.bbox.y1 > scope.options.paragraph_gap || scope.is_excluded(end) {
                break;
            }

            let text = row.text();
            match Self::split_marker(&text) {
                Some((next_marker, next_item)) if next_marker == marker => {
                    items.push(next_item.to_string());
                }
                Some(_) => break,
                // Indented continuation of the current item
                None if row.left() > first.left() + 2.0 => {
                    if let Some(last) = items.last_mut() {
                        if !last.is_empty() {
                            last.push(' ');
                        }
                        last.push_str(&text);
                    }
                }
                None => break,
            }
            bbox = bbox.union(&row.bbox);
            end += 1;
        }

        let confidence = (0.7 + 0.05 * (items.len() - 1) as f32).min(0.9);
        let count = items.len();
        let block = ContentBlock::new(BlockContent::List(items), bbox, confidence, scope.page_number)
            .with_meta("items", count)
            .with_meta("marker", marker.as_str());
        Some(Detection { block, end })
    }
}

impl BlockDetector for TableDetector {
    fn kind(&self) -> BlockKind {
        BlockKind::Table
    }

    fn try_classify(&self, scope: &PageScope<'_>, cursor: usize) -> Option<Detection> {
        let table = self.detect_at(scope.rows, cursor)?;
        let confidence = table.confidence();

        let mut matrix = table.matrix;
        let mut merged = 0;
        if scope.options.merge_continuations && table.columns.len() == 2 {
            let before = matrix.len();
            matrix = merge_matrix_rows(&matrix);
            merged = before - matrix.len();
        }
        let rows = matrix.len();
        let cols = matrix.first().map(Vec::len).unwrap_or(0);

        let mut block = ContentBlock::new(BlockContent::Table(matrix), table.bbox, confidence, scope.page_number)
            .with_meta("rows", rows)
            .with_meta("cols", cols)
            .with_meta("alignment", format!("{:.2}", table.score))
            .with_meta("method", table.method.as_str());
        if merged > 0 {
            block = block.with_meta("merged_rows", merged);
        }
        Some(Detection { block, end: table.end })
    }
}

/// Fallback: rows no detector claims become paragraphs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParagraphDetector;

impl ParagraphDetector {
    /// Build a paragraph starting at `cursor`.
    ///
    /// The paragraph stops before any row `claimed` returns true for. Returns
    /// `None` when the text is shorter than the minimum paragraph length.
    pub fn detect<F>(&self, scope: &PageScope<'_>, cursor: usize, claimed: F) -> Option<Detection>
    where
        F: Fn(usize) -> bool,
    {
        scope.rows.get(cursor)?;
        let limits = ParagraphLimits {
            max_gap: scope.options.paragraph_gap,
            max_margin_shift: scope.options.paragraph_margin,
        };
        let end = extend_paragraph(scope.rows, cursor, limits, |j| scope.is_excluded(j) || claimed(j));
        let rows = &scope.rows[cursor..end];

        let text = join_rows(rows);
        if text.chars().filter(|c| !c.is_whitespace()).count() < scope.options.min_paragraph_chars {
            log::trace!("Dropping short text {:?} on page {}", text, scope.page_number);
            return None;
        }

        let bbox = BBox::enclosing(rows.iter().map(|r| &r.bbox)).unwrap_or_default();
        let confidence = (0.5 + 0.1 * (rows.len() - 1) as f32).min(0.8);
        let block = ContentBlock::new(BlockContent::Text(text), bbox, confidence, scope.page_number)
            .with_meta("lines", rows.len());
        Some(Detection { block, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::rows::group_rows;
    use crate::model::TextFragment;

    struct Fixture {
        page: PageInput,
        rows: Vec<Row>,
        options: ClassifyOptions,
        baseline: TypographyBaseline,
    }

    impl Fixture {
        fn new(lines: &[(&str, f32, f32)]) -> Self {
            let mut page = PageInput::a4();
            for (text, x, y) in lines {
                let width = text.chars().count() as f32 * 5.0;
                page.add_fragment(TextFragment::new(*text, BBox::new(*x, *y, x + width, y + 10.0), 10.0));
            }
            let rows = group_rows(&page.fragments, 3.0);
            Self {
                page,
                rows,
                options: ClassifyOptions::default(),
                baseline: TypographyBaseline {
                    body_size: 10.0,
                    common_fonts: Vec::new(),
                },
            }
        }

        fn scope(&self) -> PageScope<'_> {
            PageScope {
                page: &self.page,
                page_number: 1,
                rows: &self.rows,
                options: &self.options,
                baseline: &self.baseline,
                bounds: self.page.bounds(),
                exclusions: &[],
            }
        }
    }

    #[test]
    fn test_metadata_detector() {
        let fixture = Fixture::new(&[
            ("Página 3 de 10", 250.0, 400.0),
            ("7", 290.0, 820.0),
            ("7", 290.0, 500.0),
            ("- 4 -", 280.0, 20.0),
        ]);
        let scope = fixture.scope();
        let rows: Vec<String> = fixture.rows.iter().map(|r| r.text()).collect();
        assert_eq!(rows, vec!["- 4 -", "Página 3 de 10", "7", "7"]);

        assert!(MetadataDetector.try_classify(&scope, 0).is_some());
        let detection = MetadataDetector.try_classify(&scope, 1).expect("page label");
        assert_eq!(detection.block.kind(), BlockKind::Metadata);
        assert_eq!(detection.block.confidence, 0.9);
        // A bare number mid-page is not a page number
        assert!(MetadataDetector.try_classify(&scope, 2).is_none());
        assert!(MetadataDetector.try_classify(&scope, 3).is_some());
    }

    #[test]
    fn test_formula_detection() {
        assert!(FormulaDetector::is_formula("P = √3 × V × I × cos φ"));
        assert!(FormulaDetector::is_formula("ENS = ∑ Pi × ti"));
        assert!(FormulaDetector::is_formula("x ≤ 2α + 1"));
        assert!(!FormulaDetector::is_formula("La potencia instalada es igual a la suma de las cargas = total"));
        assert!(!FormulaDetector::is_formula("Tiempo de reposición 45 minutos"));
    }

    #[test]
    fn test_formula_italic_bonus() {
        let mut fixture = Fixture::new(&[("E = m × c²", 72.0, 100.0)]);
        fixture.rows[0].fragments[0].italic = true;
        let detection = FormulaDetector.try_classify(&fixture.scope(), 0).expect("formula");
        assert!((detection.block.confidence - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_heading_detector() {
        let fixture = Fixture::new(&[
            ("7.2 Apertura del interruptor", 72.0, 100.0),
            ("Texto corriente sin numeración", 72.0, 130.0),
        ]);
        let scope = fixture.scope();
        let detection = HeadingDetector.try_classify(&scope, 0).expect("heading");
        assert_eq!(detection.block.meta("numbering"), Some("hierarchical_number"));
        assert_eq!(detection.block.meta("level"), Some("2"));
        assert!(HeadingDetector.try_classify(&scope, 1).is_none());
    }

    #[test]
    fn test_list_detector() {
        let fixture = Fixture::new(&[
            ("• Revisar el interruptor", 72.0, 100.0),
            ("• Verificar las protecciones", 72.0, 114.0),
            ("del transformador", 84.0, 128.0),
            ("Texto siguiente", 72.0, 142.0),
        ]);
        let detection = ListDetector.try_classify(&fixture.scope(), 0).expect("list");
        assert_eq!(detection.end, 3);
        assert_eq!(
            detection.block.content,
            BlockContent::List(vec![
                "Revisar el interruptor".to_string(),
                "Verificar las protecciones del transformador".to_string(),
            ])
        );
        assert_eq!(detection.block.meta("items"), Some("2"));
        assert_eq!(detection.block.meta("marker"), Some("bullet"));
    }

    #[test]
    fn test_list_markers() {
        assert_eq!(ListDetector::split_marker("1) Primero").map(|m| m.1), Some("Primero"));
        assert_eq!(ListDetector::split_marker("(a) Segundo").map(|m| m.1), Some("Segundo"));
        assert_eq!(ListDetector::split_marker("ii) Tercero").map(|m| m.1), Some("Tercero"));
        assert_eq!(ListDetector::split_marker("•Pegado").map(|m| m.1), Some("Pegado"));
        assert!(ListDetector::split_marker("1.1 No es lista").is_none());
        assert!(ListDetector::split_marker("-5 grados").is_none());
    }

    #[test]
    fn test_paragraph_detector() {
        let fixture = Fixture::new(&[
            ("Primera línea del párrafo", 72.0, 100.0),
            ("segunda línea del párrafo", 72.0, 112.0),
            ("Otro bloque lejano", 72.0, 200.0),
        ]);
        let scope = fixture.scope();
        let detection = ParagraphDetector.detect(&scope, 0, |_| false).expect("paragraph");
        assert_eq!(detection.end, 2);
        assert!((detection.block.confidence - 0.6).abs() < 1e-6);
        assert_eq!(
            detection.block.plain_text(),
            "Primera línea del párrafo segunda línea del párrafo"
        );

        let short = Fixture::new(&[("ab", 72.0, 100.0)]);
        assert!(ParagraphDetector.detect(&short.scope(), 0, |_| false).is_none());
    }

    #[test]
    fn test_detector_order() {
        let options = ClassifyOptions::default();
        let kinds: Vec<BlockKind> = default_detectors(&options).iter().map(|d| d.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Metadata,
                BlockKind::Formula,
                BlockKind::Heading,
                BlockKind::List,
                BlockKind::Table
            ]
        );
    }
}
