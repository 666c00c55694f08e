//! Positioned text: fragments and rows.

use serde::{Deserialize, Serialize};

use super::BBox;

/// A styled run of text with its position on the page.
///
/// Fragments are produced by the upstream text extractor and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// The text content
    pub text: String,
    /// Position on the page
    pub bbox: BBox,
    /// Font size in points
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Font name (e.g., "Arial-BoldMT"), empty when unknown
    #[serde(default)]
    pub font_name: String,
    /// Whether the font is bold
    #[serde(default)]
    pub bold: bool,
    /// Whether the font is italic
    #[serde(default)]
    pub italic: bool,
    /// Whether the text is underlined
    #[serde(default)]
    pub underline: bool,
    /// Fill color as 0xRRGGBB
    #[serde(default)]
    pub color: u32,
}

fn default_font_size() -> f32 {
    12.0
}

impl TextFragment {
    /// Create a new fragment with regular style.
    pub fn new(text: impl Into<String>, bbox: BBox, font_size: f32) -> Self {
        Self {
            text: text.into(),
            bbox,
            font_size,
            font_name: String::new(),
            bold: false,
            italic: false,
            underline: false,
            color: 0,
        }
    }

    /// Set the font name, deriving bold/italic flags from it the way
    /// embedded font names usually encode them.
    pub fn with_font(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = font_name.into();
        let lower = self.font_name.to_lowercase();
        self.bold |= lower.contains("bold") || lower.contains("black") || lower.contains("heavy");
        self.italic |= lower.contains("italic") || lower.contains("oblique");
        self
    }

    /// Mark the fragment as bold.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Mark the fragment as italic.
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Number of visible characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().filter(|c| !c.is_whitespace()).count()
    }
}

/// Fragments judged to lie on the same visual text line, sorted by `x0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// The fragments in this row, sorted left to right
    pub fragments: Vec<TextFragment>,
    /// Union of the fragment boxes
    pub bbox: BBox,
}

impl Row {
    /// Create a row from fragments, sorting them by `x0`.
    pub fn from_fragments(mut fragments: Vec<TextFragment>) -> Self {
        fragments.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
        let bbox = BBox::enclosing(fragments.iter().map(|f| &f.bbox)).unwrap_or_default();
        Self { fragments, bbox }
    }

    /// Left margin of the row.
    pub fn left(&self) -> f32 {
        self.bbox.x0
    }

    /// Check if the row holds no fragments.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Combined text of all fragments.
    ///
    /// A space is inserted between fragments whose horizontal gap exceeds 20%
    /// of the average character width of the following fragment.
    pub fn text(&self) -> String {
        let mut result = String::new();

        for (i, fragment) in self.fragments.iter().enumerate() {
            if i == 0 {
                result.push_str(&fragment.text);
                continue;
            }

            let prev = &self.fragments[i - 1];
            let gap = fragment.bbox.x0 - prev.bbox.x1;

            let char_count = fragment.text.chars().count();
            let avg_char_width = if char_count > 0 && fragment.bbox.width() > 0.0 {
                fragment.bbox.width() / char_count as f32
            } else {
                fragment.font_size * 0.5
            };

            let has_space = result.ends_with(' ')
                || result.ends_with('\u{00A0}')
                || fragment.text.starts_with(' ')
                || fragment.text.starts_with('\u{00A0}');

            if gap > avg_char_width * 0.2 && !has_space {
                result.push(' ');
            }

            result.push_str(&fragment.text);
        }

        result.trim().to_string()
    }

    /// Number of visible characters.
    pub fn char_count(&self) -> usize {
        self.fragments.iter().map(|f| f.char_count()).sum()
    }

    /// Dominant font size, weighted by text length.
    pub fn font_size(&self) -> f32 {
        let total_chars: usize = self.fragments.iter().map(|f| f.text.len()).sum();
        if total_chars == 0 {
            return self.fragments.first().map(|f| f.font_size).unwrap_or(0.0);
        }
        let weighted: f32 = self
            .fragments
            .iter()
            .map(|f| f.font_size * f.text.len() as f32)
            .sum();
        weighted / total_chars as f32
    }

    /// Check if the row is predominantly bold.
    pub fn is_bold(&self) -> bool {
        self.style_ratio(|f| f.bold) > 0.5
    }

    /// Check if the row is predominantly italic.
    pub fn is_italic(&self) -> bool {
        self.style_ratio(|f| f.italic) > 0.5
    }

    fn style_ratio(&self, pred: impl Fn(&TextFragment) -> bool) -> f32 {
        let total: usize = self.fragments.iter().map(|f| f.text.len()).sum();
        if total == 0 {
            return 0.0;
        }
        let styled: usize = self
            .fragments
            .iter()
            .filter(|f| pred(f))
            .map(|f| f.text.len())
            .sum();
        styled as f32 / total as f32
    }

    /// Check if every letter in the row is upper-case.
    pub fn is_uppercase(&self) -> bool {
        let mut letters = self
            .fragments
            .iter()
            .flat_map(|f| f.text.chars())
            .filter(|c| c.is_alphabetic())
            .peekable();
        letters.peek().is_some() && letters.all(|c| c.is_uppercase())
    }

    /// Whether the row contains any ASCII digit.
    pub fn has_digits(&self) -> bool {
        self.fragments
            .iter()
            .any(|f| f.text.chars().any(|c| c.is_ascii_digit()))
    }

    /// Whether the row contains any letter.
    pub fn has_letters(&self) -> bool {
        self.fragments
            .iter()
            .any(|f| f.text.chars().any(|c| c.is_alphabetic()))
    }
}
