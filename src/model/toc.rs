//! Table of contents types.

use serde::{Deserialize, Serialize};

use super::BBox;

/// Leading enumeration marker of a heading.
///
/// The declaration order is the order in which markers are tested: the first
/// kind whose pattern matches wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberingKind {
    /// "1.1.1"
    TripleNumber,
    /// "1.1"
    HierarchicalNumber,
    /// "d.1", "a."
    LetterNumber,
    /// "1."
    ChapterNumber,
    /// "IV."
    RomanNumber,
    /// "a)"
    LetterParen,
}

impl NumberingKind {
    /// All kinds in matching order.
    pub const ORDERED: [NumberingKind; 6] = [
        NumberingKind::TripleNumber,
        NumberingKind::HierarchicalNumber,
        NumberingKind::LetterNumber,
        NumberingKind::ChapterNumber,
        NumberingKind::RomanNumber,
        NumberingKind::LetterParen,
    ];

    /// Hierarchy level implied by the marker.
    pub fn level(&self) -> u8 {
        match self {
            NumberingKind::ChapterNumber | NumberingKind::RomanNumber => 1,
            NumberingKind::HierarchicalNumber => 2,
            NumberingKind::TripleNumber => 3,
            NumberingKind::LetterNumber => 4,
            NumberingKind::LetterParen => 5,
        }
    }

    /// Snake-case name, as used in block metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberingKind::TripleNumber => "triple_number",
            NumberingKind::HierarchicalNumber => "hierarchical_number",
            NumberingKind::LetterNumber => "letter_number",
            NumberingKind::ChapterNumber => "chapter_number",
            NumberingKind::RomanNumber => "roman_number",
            NumberingKind::LetterParen => "letter_paren",
        }
    }
}

impl std::fmt::Display for NumberingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the document's table of contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Heading text
    pub text: String,
    /// Page number (1-indexed)
    pub page: u32,
    /// Hierarchy level, 1 = outermost
    pub level: u8,
    /// Heading score
    pub score: f32,
    /// Numbering marker, if any
    pub numbering: Option<NumberingKind>,
    /// Region of the heading row
    pub bbox: BBox,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbering_levels() {
        assert_eq!(NumberingKind::TripleNumber.level(), 3);
        assert_eq!(NumberingKind::HierarchicalNumber.level(), 2);
        assert_eq!(NumberingKind::ChapterNumber.level(), 1);
        assert_eq!(NumberingKind::LetterNumber.level(), 4);
        assert_eq!(NumberingKind::LetterParen.level(), 5);
        assert_eq!(NumberingKind::RomanNumber.level(), 1);
    }

    #[test]
    fn test_numbering_serde_name() {
        let json = serde_json::to_string(&NumberingKind::HierarchicalNumber).unwrap();
        assert_eq!(json, "\"hierarchical_number\"");
        assert_eq!(NumberingKind::HierarchicalNumber.to_string(), "hierarchical_number");
    }
}
