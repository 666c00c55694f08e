//! Heading detection and table-of-contents construction.
//!
//! Headings are recognized in two stages. Stage 1 scores the rows of each
//! page on its own against a typography baseline learned from the first
//! pages of the document. Stage 2 walks the candidates of the whole document
//! in page order, drops running headers and data-shaped rows, and assigns
//! hierarchy levels so that no entry is more than one level deeper than the
//! one before it.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::model::{BBox, NumberingKind, PageInput, Row, TocEntry};

use super::options::HeadingConfig;

static TRIPLE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+\.?\s+").expect("valid triple number regex"));
static HIERARCHICAL_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.?\s+").expect("valid hierarchical number regex"));
static LETTER_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]\.(?:\d+\.?)?\s+").expect("valid letter number regex"));
static CHAPTER_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+").expect("valid chapter number regex"));
static ROMAN_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[IVXLC]+\.\s+").expect("valid roman number regex"));
static LETTER_PAREN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]\)\s+").expect("valid letter paren regex"));

/// Rows shaped like data rather than titles.
static EXCLUDED_SHAPES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Bare time: "08:15", "8:15 h"
        r"^\d{1,2}:\d{2}(?::\d{2})?\s*(?:h|hrs?|horas)?\.?$",
        // Dates: "12/03/2023", "12-03-23", "12 de marzo de 2023"
        r"^\d{1,2}[/.-]\d{1,2}[/.-]\d{2,4}$",
        r"(?i)^\d{1,2}\s+de\s+\p{L}+(?:\s+del?\s+\d{4})?$",
        // Percentage summaries: "99,5 %", "Disponibilidad: 98.7%"
        r"^[\d\s.,]+%",
        r"\d+(?:[.,]\d+)?\s*%\.?$",
        // Company names with a legal suffix
        r"\b(?:S\.A\.C\.|S\.A\.A\.|S\.R\.L\.|E\.I\.R\.L\.|S\.A\.)(?:\s|,|;|$)",
        // Chronology log lines: "08:15 h - Apertura del interruptor"
        r"^\d{1,2}:\d{2}\s*(?:h|hrs?)?\.?\s*[-–—:]\s*",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid exclusion regex"))
    .collect()
});

/// Body-text typography learned from the first pages of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct TypographyBaseline {
    /// Most common font size, weighted by characters
    pub body_size: f32,
    /// Most frequent font names, most frequent first
    pub common_fonts: Vec<String>,
}

impl Default for TypographyBaseline {
    fn default() -> Self {
        Self {
            body_size: 12.0,
            common_fonts: Vec::new(),
        }
    }
}

impl TypographyBaseline {
    /// Learn the baseline from up to `sample_pages` pages.
    pub fn learn<'a, I>(pages: I, sample_pages: usize) -> Self
    where
        I: IntoIterator<Item = &'a PageInput>,
    {
        let mut size_histogram: HashMap<i32, usize> = HashMap::new();
        let mut font_counts: HashMap<&str, usize> = HashMap::new();

        for page in pages.into_iter().take(sample_pages) {
            for fragment in &page.fragments {
                let chars = fragment.char_count();
                if chars == 0 || !fragment.font_size.is_finite() || fragment.font_size <= 0.0 {
                    continue;
                }
                let key = (fragment.font_size * 10.0).round() as i32; // 0.1 precision
                *size_histogram.entry(key).or_insert(0) += chars;
                if !fragment.font_name.is_empty() {
                    *font_counts.entry(fragment.font_name.as_str()).or_insert(0) += chars;
                }
            }
        }

        // Ties go to the smaller size
        let body_size = size_histogram
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(key, _)| *key as f32 / 10.0)
            .unwrap_or(12.0);

        let mut fonts: Vec<(&str, usize)> = font_counts.into_iter().collect();
        fonts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let common_fonts = fonts.into_iter().take(3).map(|(name, _)| name.to_string()).collect();

        log::debug!("Typography baseline: body size {:.1}", body_size);

        Self {
            body_size,
            common_fonts,
        }
    }
}

/// State carried across the pages of one table-of-contents run.
#[derive(Debug, Clone, Default)]
pub struct DocumentClassificationContext {
    /// Typography baseline of the document
    pub baseline: TypographyBaseline,
    /// Level of the most recent numbered heading, 0 before the first one
    pub context_level: u8,
}

impl DocumentClassificationContext {
    /// Create a context for a run.
    pub fn new(baseline: TypographyBaseline) -> Self {
        Self {
            baseline,
            context_level: 0,
        }
    }
}

/// A row that may be a heading, before document-level filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingCandidate {
    /// Row text
    pub text: String,
    /// Page number (1-indexed)
    pub page: u32,
    /// Position among the page's rows
    pub order: usize,
    /// Row region
    pub bbox: BBox,
    /// Numbering marker, if any
    pub numbering: Option<NumberingKind>,
    /// Typography score (0 when the row is not eligible)
    pub score: f32,
    /// Whether the row has strong typography
    pub strong: bool,
    /// Whether the row is shaped like data (time, date, percentage, ...)
    pub excluded: bool,
}

/// Match the leading enumeration marker of a heading text.
///
/// The marker must be followed by text with at least three letters.
pub fn detect_numbering(text: &str) -> Option<NumberingKind> {
    let text = text.trim();
    NumberingKind::ORDERED.into_iter().find_map(|kind| {
        let pattern: &Regex = match kind {
            NumberingKind::TripleNumber => &TRIPLE_NUMBER,
            NumberingKind::HierarchicalNumber => &HIERARCHICAL_NUMBER,
            NumberingKind::LetterNumber => &LETTER_NUMBER,
            NumberingKind::ChapterNumber => &CHAPTER_NUMBER,
            NumberingKind::RomanNumber => &ROMAN_NUMBER,
            NumberingKind::LetterParen => &LETTER_PAREN,
        };
        let marker = pattern.find(text)?;
        let letters = text[marker.end()..].chars().filter(|c| c.is_alphabetic()).count();
        (letters >= 3).then_some(kind)
    })
}

/// Whether a text is shaped like tabular data rather than a title.
pub fn is_excluded_shape(text: &str) -> bool {
    let text = text.trim();
    EXCLUDED_SHAPES.iter().any(|re| re.is_match(text))
}

/// Normalize heading text for repeat detection.
pub fn normalize_heading_text(text: &str) -> String {
    let composed: String = text.nfc().collect();
    composed
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Scores rows of one page as heading candidates.
#[derive(Debug, Clone, Copy)]
pub struct HeadingScorer<'a> {
    baseline: &'a TypographyBaseline,
    config: &'a HeadingConfig,
    page_width: f32,
}

impl<'a> HeadingScorer<'a> {
    /// Create a scorer for a page of the given width.
    pub fn new(baseline: &'a TypographyBaseline, config: &'a HeadingConfig, page_width: f32) -> Self {
        Self {
            baseline,
            config,
            page_width,
        }
    }

    /// Whether the row is centered on the page with clear margins on both sides.
    pub fn is_centered(&self, row: &Row) -> bool {
        if !self.page_width.is_finite() || self.page_width <= 0.0 {
            return false;
        }
        let (center, _) = row.bbox.center();
        let page_center = self.page_width / 2.0;
        let margin = self.page_width * 0.1;
        (center - page_center).abs() <= self.page_width * 0.05
            && row.bbox.x0 > margin
            && self.page_width - row.bbox.x1 > margin
    }

    /// Whether the row shows at least two strong typographic signals.
    pub fn is_strong(&self, row: &Row) -> bool {
        let signals = [
            row.is_bold(),
            row.is_uppercase(),
            self.is_centered(row),
            row.font_size() >= self.baseline.body_size + 1.5,
        ];
        signals.iter().filter(|s| **s).count() >= 2
    }

    /// Build a candidate from a row, or `None` when its length rules it out.
    pub fn candidate(&self, row: &Row, page: u32, order: usize) -> Option<HeadingCandidate> {
        let text = row.text();
        let length = text.chars().count();
        if length < self.config.min_chars || length > self.config.max_chars {
            return None;
        }

        let numbering = detect_numbering(&text);
        let strong = self.is_strong(row);
        let eligible = numbering.is_some() || (self.config.detect_unnumbered && strong);

        let score = if eligible {
            let mut score = row.font_size();
            if row.is_bold() {
                score += 3.0;
            }
            if row.is_uppercase() {
                score += 2.0;
            }
            if numbering.is_some() {
                score += 3.0;
            }
            if self.is_centered(row) {
                score += 2.0;
            }
            score
        } else {
            0.0
        };

        Some(HeadingCandidate {
            excluded: is_excluded_shape(&text),
            text,
            page,
            order,
            bbox: row.bbox,
            numbering,
            score,
            strong,
        })
    }

    /// Whether a candidate qualifies as a heading block on its page.
    pub fn accepts(&self, candidate: &HeadingCandidate) -> bool {
        !candidate.excluded && candidate.score > 0.0 && candidate.score >= self.config.min_score
    }
}

/// Filter document candidates and assign hierarchy levels.
///
/// Candidates must be in document order (page, then position on the page).
/// Excluded shapes, repeated texts and low scores are dropped. Numbered
/// headings take the level of their marker and set the context level;
/// unnumbered ones go one level below the context. Every entry after the
/// first is at most one level deeper than its predecessor.
pub fn assign_levels(
    candidates: &[HeadingCandidate],
    context: &mut DocumentClassificationContext,
    min_score: f32,
    detect_unnumbered: bool,
) -> Vec<TocEntry> {
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    for candidate in candidates.iter().filter(|c| c.score > 0.0) {
        *occurrences.entry(normalize_heading_text(&candidate.text)).or_insert(0) += 1;
    }

    let mut entries: Vec<TocEntry> = Vec::new();

    for candidate in candidates {
        if candidate.excluded || candidate.score <= 0.0 || candidate.score < min_score {
            continue;
        }
        if occurrences
            .get(&normalize_heading_text(&candidate.text))
            .is_some_and(|n| *n > 1)
        {
            log::trace!("Dropping repeated heading {:?}", candidate.text);
            continue;
        }

        let mut level = match candidate.numbering {
            Some(kind) => {
                context.context_level = kind.level();
                kind.level()
            }
            None if detect_unnumbered && candidate.strong => (context.context_level + 1).min(5),
            None => continue,
        };

        if let Some(previous) = entries.last() {
            level = level.min(previous.level + 1);
        }

        entries.push(TocEntry {
            text: candidate.text.clone(),
            page: candidate.page,
            level,
            score: candidate.score,
            numbering: candidate.numbering,
            bbox: candidate.bbox,
        });
    }

    log::debug!("Table of contents: {} entries from {} candidates", entries.len(), candidates.len());
    entries
}
