//! Markdown rendering for classification results.

use crate::model::{BlockContent, ContentBlock, DocumentClassification};

/// Convert a classification result to Markdown.
///
/// Headings use their detected level, tables become pipe tables with the
/// first row as header, formulas are fenced as display math and images are
/// left as a placeholder comment. Page metadata is dropped.
pub fn to_markdown(result: &DocumentClassification) -> String {
    let mut renderer = MarkdownRenderer::default();
    for (page, blocks) in &result.per_page {
        renderer.render_page(*page, blocks);
    }
    renderer.finish()
}

#[derive(Debug, Default)]
struct MarkdownRenderer {
    output: String,
}

impl MarkdownRenderer {
    fn render_page(&mut self, page: u32, blocks: &[ContentBlock]) {
        self.output.push_str(&format!("<!-- page {} -->\n\n", page));
        for block in blocks {
            self.render_block(block);
        }
    }

    fn render_block(&mut self, block: &ContentBlock) {
        match &block.content {
            BlockContent::Heading(text) => {
                let level = block
                    .meta("level")
                    .and_then(|l| l.parse::<usize>().ok())
                    .unwrap_or(2)
                    .clamp(1, 6);
                self.output.push_str(&"#".repeat(level));
                self.output.push(' ');
                self.output.push_str(text.trim());
                self.output.push_str("\n\n");
            }
            BlockContent::Text(text) => {
                self.output.push_str(&escape(text.trim()));
                self.output.push_str("\n\n");
            }
            BlockContent::List(items) => {
                let enumerated = block.meta("marker") == Some("enumerated");
                for (i, item) in items.iter().enumerate() {
                    if enumerated {
                        self.output.push_str(&format!("{}. ", i + 1));
                    } else {
                        self.output.push_str("- ");
                    }
                    self.output.push_str(item.trim());
                    self.output.push('\n');
                }
                self.output.push('\n');
            }
            BlockContent::Table(rows) => self.render_table(rows),
            BlockContent::Formula(text) => {
                self.output.push_str("$$\n");
                self.output.push_str(text.trim());
                self.output.push_str("\n$$\n\n");
            }
            BlockContent::Image => {
                let method = block.meta("method").unwrap_or("image");
                self.output.push_str(&format!(
                    "<!-- {} at ({:.0}, {:.0}, {:.0}, {:.0}) -->\n\n",
                    method, block.bbox.x0, block.bbox.y0, block.bbox.x1, block.bbox.y1
                ));
            }
            BlockContent::Metadata(_) => {}
        }
    }

    fn render_table(&mut self, rows: &[Vec<String>]) {
        let col_count = rows.iter().map(Vec::len).max().unwrap_or(0);
        if col_count == 0 {
            return;
        }

        for (i, row) in rows.iter().enumerate() {
            self.output.push('|');
            for c in 0..col_count {
                let cell = row.get(c).map(String::as_str).unwrap_or("");
                let content = cell.replace('\n', " ").replace('|', "\\|");
                self.output.push_str(&format!(" {} |", content.trim()));
            }
            self.output.push('\n');

            // Separator after header row
            if i == 0 {
                self.output.push('|');
                for _ in 0..col_count {
                    self.output.push_str(" --- |");
                }
                self.output.push('\n');
            }
        }

        self.output.push('\n');
    }

    fn finish(self) -> String {
        let trimmed = self.output.trim_end();
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("{}\n", trimmed)
        }
    }
}

/// Escape characters that would start Markdown structure at line start.
fn escape(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    for line in text.lines() {
        if !output.is_empty() {
            output.push('\n');
        }
        if line.starts_with('#') || line.starts_with('>') || line.starts_with("- ") {
            output.push('\\');
        }
        output.push_str(line);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BBox;

    fn heading(text: &str, level: u8) -> ContentBlock {
        ContentBlock::new(BlockContent::Heading(text.into()), BBox::default(), 0.8, 1).with_meta("level", level)
    }

    #[test]
    fn test_headings_and_text() {
        let mut result = DocumentClassification::new();
        result.add_page(
            1,
            vec![
                heading("1. Antecedentes", 1),
                heading("1.1 Alcance", 2),
                ContentBlock::new(BlockContent::Text("# no es título".into()), BBox::default(), 0.5, 1),
            ],
            0.6,
        );

        let md = to_markdown(&result);
        assert!(md.contains("# 1. Antecedentes\n\n## 1.1 Alcance\n\n"));
        assert!(md.contains("\\# no es título"));
        assert!(md.starts_with("<!-- page 1 -->"));
    }

    #[test]
    fn test_table_rendering() {
        let mut result = DocumentClassification::new();
        let table = ContentBlock::new(
            BlockContent::Table(vec![
                vec!["Equipo".into(), "Estado".into()],
                vec!["IN-2012".into()],
            ]),
            BBox::default(),
            0.9,
            1,
        );
        result.add_page(1, vec![table], 0.6);

        let md = to_markdown(&result);
        assert!(md.contains("| Equipo | Estado |\n| --- | --- |\n| IN-2012 |  |\n"));
    }

    #[test]
    fn test_enumerated_list() {
        let mut result = DocumentClassification::new();
        let list = ContentBlock::new(BlockContent::List(vec!["uno".into(), "dos".into()]), BBox::default(), 0.75, 1)
            .with_meta("marker", "enumerated");
        result.add_page(1, vec![list], 0.6);

        assert!(to_markdown(&result).contains("1. uno\n2. dos\n"));
    }

    #[test]
    fn test_empty() {
        assert_eq!(to_markdown(&DocumentClassification::new()), "");
    }
}
