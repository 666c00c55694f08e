//! JSON rendering for classification results.

use serde::Serialize;

use crate::error::{Error, Result};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize a classification result, table of contents or any model value.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, BlockContent, ContentBlock, DocumentClassification, TocEntry};

    fn sample() -> DocumentClassification {
        let mut result = DocumentClassification::new();
        let block = ContentBlock::new(
            BlockContent::Heading("1. Antecedentes".into()),
            BBox::new(72.0, 80.0, 300.0, 94.0),
            0.8,
            1,
        );
        result.add_page(1, vec![block], 0.6);
        result
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"per_page\""));
        assert!(json.contains("Antecedentes"));
        assert!(json.contains('\n')); // Pretty has newlines
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n')); // Compact has no newlines
        assert!(json.contains("\"kind\":\"heading\""));
    }

    #[test]
    fn test_toc_to_json() {
        let toc: Vec<TocEntry> = Vec::new();
        assert_eq!(to_json(&toc, JsonFormat::Compact).unwrap(), "[]");
    }
}
