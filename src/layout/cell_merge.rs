//! Repair of table cells whose value wrapped onto following lines.
//!
//! Field/value tables in regulator reports often break a long value across
//! several physical lines. The extra lines come out as rows of their own,
//! with a field column that holds the tail of the value instead of a field
//! name. This module folds such rows back into the row they continue.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Section markers like "a.", "d.2" or "b)" that start a new field.
static SECTION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z](?:(?:\.\d+)+\.?|[.)])(?:\s|$)").expect("valid section marker regex")
});

const CONJUNCTIONS: &[&str] = &["y", "e", "o", "u", "ni"];

/// A field/value pair of a two-column table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRow {
    /// Field name (left column)
    #[serde(default, alias = "campo")]
    pub field: String,
    /// Field value (right column)
    #[serde(default, alias = "valor")]
    pub value: String,
}

impl FieldRow {
    /// Create a new field row.
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Whether a field text marks its row as the continuation of the previous one.
pub fn is_continuation(field: &str) -> bool {
    let field = field.trim();
    if field.is_empty() {
        return true;
    }
    if SECTION_MARKER.is_match(field) {
        return false;
    }

    let lower = field.to_lowercase();
    let starts_with_conjunction = CONJUNCTIONS.iter().any(|c| {
        lower
            .strip_prefix(c)
            .is_some_and(|rest| rest.starts_with(char::is_whitespace))
    });
    if starts_with_conjunction || field.starts_with(['/', '-', '–', '—']) {
        return true;
    }

    if field.chars().count() < 5 && field.chars().any(|c| c.is_ascii_punctuation()) {
        return true;
    }

    field.chars().next().is_some_and(char::is_lowercase)
}

/// Append non-empty parts to `target`, separated by single spaces.
fn append_parts(target: &mut String, parts: &[&str]) {
    for part in parts.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
        if !target.is_empty() {
            target.push(' ');
        }
        target.push_str(part);
    }
}

/// Fold continuation rows into the row they continue.
///
/// The first row is never merged. Applying the merge twice gives the same
/// result as applying it once.
pub fn merge_field_rows(rows: &[FieldRow]) -> Vec<FieldRow> {
    let mut merged: Vec<FieldRow> = Vec::with_capacity(rows.len());

    for row in rows {
        match merged.last_mut() {
            Some(previous) if is_continuation(&row.field) => {
                log::trace!("Merging continuation row {:?} into {:?}", row.field, previous.field);
                append_parts(&mut previous.value, &[&row.field, &row.value]);
            }
            _ => merged.push(row.clone()),
        }
    }

    if merged.len() < rows.len() {
        log::debug!("Merged {} continuation rows", rows.len() - merged.len());
    }
    merged
}

/// Fold continuation rows of a two-column cell matrix.
///
/// Matrices with any other column count are returned unchanged.
pub fn merge_matrix_rows(matrix: &[Vec<String>]) -> Vec<Vec<String>> {
    if matrix.iter().any(|row| row.len() != 2) {
        return matrix.to_vec();
    }

    let rows: Vec<FieldRow> = matrix
        .iter()
        .map(|row| FieldRow::new(row[0].clone(), row[1].clone()))
        .collect();

    merge_field_rows(&rows)
        .into_iter()
        .map(|row| vec![row.field, row.value])
        .collect()
}
