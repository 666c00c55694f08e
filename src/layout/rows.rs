//! Grouping of positioned fragments into rows and paragraphs.

use crate::model::{Row, TextFragment};

/// Group fragments into rows by their top edge.
///
/// Fragments are sorted by `y0`; a fragment joins the current row when its
/// `y0` is within `tolerance` of the row's first fragment, otherwise it starts
/// a new row. Rows come back top to bottom, each sorted left to right.
pub fn group_rows(fragments: &[TextFragment], tolerance: f32) -> Vec<Row> {
    let mut sorted: Vec<&TextFragment> = fragments
        .iter()
        .filter(|f| {
            let usable = !f.text.trim().is_empty() && f.bbox.is_finite();
            if !usable {
                log::trace!("Skipping unusable fragment {:?}", f.text);
            }
            usable
        })
        .collect();

    sorted.sort_by(|a, b| {
        a.bbox
            .y0
            .total_cmp(&b.bbox.y0)
            .then_with(|| a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    let mut rows: Vec<Row> = Vec::new();
    let mut current: Vec<TextFragment> = Vec::new();
    let mut row_y0: Option<f32> = None;

    for fragment in sorted {
        match row_y0 {
            Some(y) if (fragment.bbox.y0 - y).abs() <= tolerance => {
                current.push(fragment.clone());
            }
            _ => {
                if !current.is_empty() {
                    rows.push(Row::from_fragments(std::mem::take(&mut current)));
                }
                row_y0 = Some(fragment.bbox.y0);
                current.push(fragment.clone());
            }
        }
    }

    if !current.is_empty() {
        rows.push(Row::from_fragments(current));
    }

    rows
}

/// Limits for growing a paragraph downward.
#[derive(Debug, Clone, Copy)]
pub struct ParagraphLimits {
    /// Maximum gap between a row's top and the previous row's bottom
    pub max_gap: f32,
    /// Maximum distance between a row's left edge and the paragraph's
    pub max_margin_shift: f32,
}

/// Extend a paragraph starting at `start`.
///
/// Following rows are absorbed while `claimed` is false for them, the gap to
/// the previous row's bottom is within `max_gap`, and the left margin stays
/// within `max_margin_shift` of the first row. Returns the index of the first
/// row that was not absorbed.
pub fn extend_paragraph<F>(rows: &[Row], start: usize, limits: ParagraphLimits, claimed: F) -> usize
where
    F: Fn(usize) -> bool,
{
    if start >= rows.len() {
        return start;
    }

    let left = rows[start].left();
    let mut prev_bottom = rows[start].bbox.y1;
    let mut end = start + 1;

    while end < rows.len() {
        let row = &rows[end];
        let gap = row.bbox.y0 - prev_bottom;
        if gap > limits.max_gap {
            break;
        }
        if (row.left() - left).abs() > limits.max_margin_shift {
            break;
        }
        if claimed(end) {
            break;
        }
        prev_bottom = row.bbox.y1;
        end += 1;
    }

    end
}

/// Join the text of consecutive rows into one paragraph string.
pub fn join_rows(rows: &[Row]) -> String {
    let mut text = String::new();
    for row in rows {
        let line = row.text();
        if line.is_empty() {
            continue;
        }
        // Rejoin words hyphenated across the line break
        if text.ends_with('-') && line.starts_with(|c: char| c.is_lowercase()) {
            text.pop();
        } else if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&line);
    }
    text
}
