//! Markdown rendering of a table of contents.

use crate::model::TocEntry;

/// How a table of contents is laid out in Markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TocStyle {
    /// Nested bullet list, two spaces per level, with page numbers
    #[default]
    Indented,
    /// One Markdown heading per entry (`#` repeated by level)
    Headings,
}

/// Render table of contents entries as Markdown.
pub fn toc_to_markdown(entries: &[TocEntry], style: TocStyle) -> String {
    let mut output = String::new();

    for entry in entries {
        let level = entry.level.max(1) as usize;
        match style {
            TocStyle::Indented => {
                output.push_str(&"  ".repeat(level - 1));
                output.push_str(&format!("- {} (p. {})\n", entry.text.trim(), entry.page));
            }
            TocStyle::Headings => {
                output.push_str(&"#".repeat(level.min(6)));
                output.push(' ');
                output.push_str(entry.text.trim());
                output.push_str("\n\n");
            }
        }
    }

    output
}
