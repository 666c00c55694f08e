//! Plain text rendering for classification results.

use crate::model::{BlockContent, DocumentClassification};

/// Convert a classification result to plain text.
///
/// Blocks are separated by blank lines, tables are tab-separated, list
/// items are bulleted and images become a placeholder line. Metadata such
/// as page numbers is left out.
pub fn to_text(result: &DocumentClassification) -> String {
    let mut output = String::new();

    for block in result.blocks() {
        match &block.content {
            BlockContent::Metadata(_) => continue,
            BlockContent::List(items) => {
                for item in items {
                    output.push_str("• ");
                    output.push_str(item);
                    output.push('\n');
                }
            }
            BlockContent::Image => {
                output.push_str("[image]\n");
            }
            _ => {
                output.push_str(&block.plain_text());
                output.push('\n');
            }
        }
        output.push('\n');
    }

    output.trim().to_string()
}
