//! Table detection using text position analysis (stream mode).
//!
//! Tables are found without ruling lines: the x positions where fragments
//! start are clustered across a window of consecutive rows, and the window is
//! accepted when enough fragments line up with the resulting columns. An
//! accepted window is then grown downward row by row and turned into a cell
//! matrix.

use std::collections::BTreeSet;

use crate::model::{BBox, Row};

use super::options::TableDetectorConfig;

/// Words that mark the header of a field/value table.
const TABLE_KEYWORDS: &[&str] = &[
    "campo",
    "valor",
    "descripción",
    "descripcion",
    "item",
    "ítem",
    "n°",
    "nº",
    "fecha",
    "hora",
    "código",
    "codigo",
    "total",
    "unidad",
    "cantidad",
];

/// How a table region was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMethod {
    /// Alignment score above the main threshold
    Alignment,
    /// Header keywords in the first rows
    Keywords,
    /// Lower alignment backed by mixed text and numbers
    MixedContent,
    /// Region supplied by an external table finder
    TableFinder,
}

impl TableMethod {
    /// Name used in block metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            TableMethod::Alignment => "alignment",
            TableMethod::Keywords => "keywords",
            TableMethod::MixedContent => "mixed-content",
            TableMethod::TableFinder => "table-finder",
        }
    }
}

/// A detected table region with its content.
#[derive(Debug, Clone)]
pub struct DetectedTable {
    /// Index of the first row of the table
    pub start: usize,
    /// Index one past the last row of the table
    pub end: usize,
    /// Column positions (mean x0 of each column)
    pub columns: Vec<f32>,
    /// Alignment score of the detection window
    pub score: f32,
    /// Acceptance rule that fired
    pub method: TableMethod,
    /// Union of the table rows
    pub bbox: BBox,
    /// Cell matrix, row-major, without empty rows or columns
    pub matrix: Vec<Vec<String>>,
}

impl DetectedTable {
    /// Confidence derived from the alignment score.
    pub fn confidence(&self) -> f32 {
        (0.3 + 0.7 * self.score).clamp(0.0, 1.0)
    }

    /// Number of rows in the matrix.
    pub fn row_count(&self) -> usize {
        self.matrix.len()
    }

    /// Number of columns in the matrix.
    pub fn column_count(&self) -> usize {
        self.matrix.first().map(Vec::len).unwrap_or(0)
    }
}

/// A column candidate while clustering x positions.
#[derive(Debug)]
struct ColumnCluster {
    sum: f32,
    count: usize,
    rows: BTreeSet<usize>,
}

impl ColumnCluster {
    fn mean(&self) -> f32 {
        self.sum / self.count as f32
    }
}

/// Detects tables in a sequence of rows.
#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    /// Create a new table detector with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new table detector with custom configuration.
    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &TableDetectorConfig {
        &self.config
    }

    /// Try to detect a table starting at row `start`.
    pub fn detect_at(&self, rows: &[Row], start: usize) -> Option<DetectedTable> {
        let window = self.window(rows, start);
        if window.len() < self.config.min_rows {
            return None;
        }

        let columns = self.detect_columns(window);
        if columns.len() < self.config.min_columns {
            log::trace!(
                "TableDetector: row {} has {} columns (< {})",
                start,
                columns.len(),
                self.config.min_columns
            );
            return None;
        }

        if self.is_list_pattern(window, &columns) {
            log::debug!("TableDetector: skipping row {}, detected as list pattern", start);
            return None;
        }

        let score = self.alignment_score(window, &columns);
        let method = self.acceptance(window, score)?;

        let end = self.extend(rows, start, &columns)?;
        let region = &rows[start..end];
        let matrix = self.build_matrix(region, &columns);
        if matrix.len() < self.config.min_rows || matrix.first().map(Vec::len).unwrap_or(0) < self.config.min_columns {
            log::debug!(
                "TableDetector: region {}..{} collapsed to {}x{} matrix",
                start,
                end,
                matrix.len(),
                matrix.first().map(Vec::len).unwrap_or(0)
            );
            return None;
        }

        let bbox = BBox::enclosing(region.iter().map(|r| &r.bbox)).unwrap_or_default();

        log::debug!(
            "TableDetector: table at rows {}..{} ({} columns, score {:.2}, method {})",
            start,
            end,
            columns.len(),
            score,
            method.as_str()
        );

        Some(DetectedTable {
            start,
            end,
            columns,
            score,
            method,
            bbox,
            matrix,
        })
    }

    /// Rows examined for column detection.
    ///
    /// The window holds up to `window_rows` rows and stops early at a vertical
    /// gap wider than `max_row_gap`.
    fn window<'r>(&self, rows: &'r [Row], start: usize) -> &'r [Row] {
        if start >= rows.len() {
            return &[];
        }
        let limit = (start + self.config.window_rows.max(1)).min(rows.len());
        let mut end = start + 1;
        while end < limit {
            let gap = rows[end].bbox.y0 - rows[end - 1].bbox.y1;
            if gap > self.config.max_row_gap {
                break;
            }
            end += 1;
        }
        &rows[start..end]
    }

    /// Cluster fragment x0 positions into columns.
    ///
    /// Sorted positions join a cluster when within `column_tolerance` of its
    /// running mean. A cluster becomes a column only when fragments from at
    /// least `max(2, rows / 2)` distinct rows fall into it.
    pub fn detect_columns(&self, rows: &[Row]) -> Vec<f32> {
        self.cluster_columns(rows, (rows.len() / 2).max(2))
    }

    /// Cluster fragment x0 positions, keeping clusters hit by at least
    /// `min_support` distinct rows.
    pub fn cluster_columns(&self, rows: &[Row], min_support: usize) -> Vec<f32> {
        let mut positions: Vec<(f32, usize)> = rows
            .iter()
            .enumerate()
            .flat_map(|(i, row)| row.fragments.iter().map(move |f| (f.bbox.x0, i)))
            .collect();
        positions.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut clusters: Vec<ColumnCluster> = Vec::new();
        for (x, row) in positions {
            match clusters.last_mut() {
                Some(cluster) if (x - cluster.mean()).abs() <= self.config.column_tolerance => {
                    cluster.sum += x;
                    cluster.count += 1;
                    cluster.rows.insert(row);
                }
                _ => clusters.push(ColumnCluster {
                    sum: x,
                    count: 1,
                    rows: BTreeSet::from([row]),
                }),
            }
        }

        let columns: Vec<f32> = clusters
            .iter()
            .filter(|c| c.rows.len() >= min_support)
            .map(ColumnCluster::mean)
            .collect();

        log::trace!("TableDetector: column positions {:?}", columns);
        columns
    }

    /// Fraction of fragments in `rows` that start within tolerance of a column.
    pub fn alignment_score(&self, rows: &[Row], columns: &[f32]) -> f32 {
        let total: usize = rows.iter().map(|r| r.fragments.len()).sum();
        if total == 0 || columns.is_empty() {
            return 0.0;
        }
        let aligned: usize = rows.iter().map(|r| self.aligned_count(r, columns)).sum();
        aligned as f32 / total as f32
    }

    fn aligned_count(&self, row: &Row, columns: &[f32]) -> usize {
        row.fragments
            .iter()
            .filter(|f| self.nearest_column(f.bbox.x0, columns).is_some())
            .count()
    }

    /// Decide whether a window is a table, and by which rule.
    fn acceptance(&self, window: &[Row], score: f32) -> Option<TableMethod> {
        if score >= self.config.alignment_threshold {
            return Some(TableMethod::Alignment);
        }
        if window.iter().take(2).any(|row| has_table_keyword(&row.text())) {
            return Some(TableMethod::Keywords);
        }
        if score >= self.config.mixed_content_threshold && has_mixed_content(window) {
            return Some(TableMethod::MixedContent);
        }
        log::trace!("TableDetector: window rejected, score {:.2}", score);
        None
    }

    /// Whether a row continues a table with the given columns.
    fn row_fits(&self, row: &Row, columns: &[f32]) -> bool {
        if row.fragments.is_empty() {
            return false;
        }
        if row.fragments.len() == 1 && row.char_count() > self.config.max_single_cell_chars {
            return false;
        }
        let aligned = self.aligned_count(row, columns);
        aligned as f32 / row.fragments.len() as f32 >= self.config.row_fit_ratio
    }

    /// Grow the table downward from `start`; returns the end index (exclusive).
    fn extend(&self, rows: &[Row], start: usize, columns: &[f32]) -> Option<usize> {
        if !self.row_fits(&rows[start], columns) {
            return None;
        }

        let mut last_fit = start;
        let mut fitted = 1;
        let mut gap_rows = 0;
        let mut i = start + 1;

        while i < rows.len() {
            let row = &rows[i];
            if row.bbox.y0 - rows[last_fit].bbox.y1 > self.config.max_row_gap {
                break;
            }
            if row.char_count() <= 1 {
                gap_rows += 1;
                if gap_rows > self.config.max_gap_rows {
                    break;
                }
                i += 1;
                continue;
            }
            if !self.row_fits(row, columns) {
                break;
            }
            gap_rows = 0;
            last_fit = i;
            fitted += 1;
            i += 1;
        }

        if fitted < self.config.min_rows {
            log::trace!("TableDetector: only {} fitting rows from row {}", fitted, start);
            return None;
        }
        // Trailing gap rows are left out
        Some(last_fit + 1)
    }

    /// Build a cell matrix from table rows.
    ///
    /// Each fragment goes to the nearest column within tolerance; fragments
    /// matching no column are dropped. Rows and columns left completely empty
    /// are removed.
    pub fn build_matrix(&self, rows: &[Row], columns: &[f32]) -> Vec<Vec<String>> {
        let mut matrix: Vec<Vec<String>> = Vec::with_capacity(rows.len());

        for row in rows {
            let mut cells: Vec<Vec<&str>> = vec![Vec::new(); columns.len()];
            for fragment in &row.fragments {
                match self.nearest_column(fragment.bbox.x0, columns) {
                    Some(col) => cells[col].push(fragment.text.trim()),
                    None => log::trace!("TableDetector: dropping unaligned fragment {:?}", fragment.text),
                }
            }
            matrix.push(cells.into_iter().map(|parts| parts.join(" ").trim().to_string()).collect());
        }

        matrix.retain(|row| row.iter().any(|cell| !cell.is_empty()));

        let keep: Vec<bool> = (0..columns.len())
            .map(|col| matrix.iter().any(|row| !row[col].is_empty()))
            .collect();
        for row in &mut matrix {
            let mut col = 0;
            row.retain(|_| {
                let kept = keep[col];
                col += 1;
                kept
            });
        }

        matrix
    }

    /// Index of the nearest column within tolerance.
    fn nearest_column(&self, x: f32, columns: &[f32]) -> Option<usize> {
        columns
            .iter()
            .enumerate()
            .map(|(i, c)| (i, (x - c).abs()))
            .filter(|(_, d)| *d <= self.config.column_tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Check if the rows actually represent a numbered or bulleted list.
    ///
    /// When a list marker and its text are separate fragments, the marker
    /// column and the text column look like a two-column table.
    fn is_list_pattern(&self, rows: &[Row], columns: &[f32]) -> bool {
        if columns.len() < 2 || rows.is_empty() {
            return false;
        }

        let mut bullet_count = 0;
        let mut number_count = 0;

        for row in rows {
            if let Some(first) = row.fragments.first() {
                let text = first.text.trim();
                if is_bullet_marker(text) {
                    bullet_count += 1;
                } else if is_number_marker(text) {
                    number_count += 1;
                }
            }
        }

        let bullet_ratio = bullet_count as f32 / rows.len() as f32;
        let total_ratio = (bullet_count + number_count) as f32 / rows.len() as f32;
        log::trace!(
            "TableDetector: list markers: bullets={}, numbers={}, rows={}",
            bullet_count,
            number_count,
            rows.len()
        );

        if bullet_ratio >= 0.5 {
            return true;
        }

        // Numbered first columns are common in real tables; only reject pairs
        columns.len() == 2 && total_ratio >= 0.5
    }
}

/// Check if the text of a row names a typical table header.
fn has_table_keyword(text: &str) -> bool {
    text.split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric() && c != '°' && c != 'º')
                .to_lowercase()
        })
        .any(|word| TABLE_KEYWORDS.contains(&word.as_str()))
}

/// Whether the rows hold both numeric and alphabetic cells.
fn has_mixed_content(rows: &[Row]) -> bool {
    let mut numeric = false;
    let mut alphabetic = false;
    for fragment in rows.iter().flat_map(|r| r.fragments.iter()) {
        let visible = fragment.char_count();
        if visible == 0 {
            continue;
        }
        let digits = fragment.text.chars().filter(|c| c.is_ascii_digit()).count();
        let letters = fragment.text.chars().filter(|c| c.is_alphabetic()).count();
        numeric |= digits * 2 >= visible;
        alphabetic |= letters * 2 >= visible;
        if numeric && alphabetic {
            return true;
        }
    }
    false
}

/// Check if text is a bullet marker (•, -, etc.).
pub(crate) fn is_bullet_marker(text: &str) -> bool {
    matches!(
        text.trim(),
        "-" | "–" | "—" | "•" | "·" | "*" | "○" | "▪" | "◦" | "▸" | "▹" | "►" | "■" | "●" | "□" | "◆" | "◇" | "▶" | "▷" | "➤" | "➜" | "✓"
    )
}

/// Check if text is a number-style list marker (1., 2), a., etc.).
pub(crate) fn is_number_marker(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }

    // Remove internal whitespace for pattern matching (handles "1 .")
    let cleaned: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    let inner = cleaned
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(&cleaned);

    if let Some(pos) = inner.find(|c: char| !c.is_ascii_digit()) {
        let prefix = &inner[..pos];
        let suffix = &inner[pos..];
        if !prefix.is_empty() && (suffix == "." || suffix == ")") {
            return true;
        }
    }

    if inner.parse::<u32>().is_ok() {
        return true;
    }

    // Letter marker: "a.", "B)", "(c)"
    let chars: Vec<char> = inner.chars().collect();
    match chars.as_slice() {
        [c] => inner != cleaned && c.is_alphabetic(),
        [c, '.'] | [c, ')'] => c.is_alphabetic(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::rows::group_rows;
    use crate::model::TextFragment;

    fn make_fragment(text: &str, x: f32, y: f32) -> TextFragment {
        TextFragment::new(text, BBox::new(x, y, x + text.chars().count() as f32 * 5.0, y + 10.0), 10.0)
    }

    fn rows_of(cells: &[(&str, f32, f32)]) -> Vec<Row> {
        let fragments: Vec<TextFragment> = cells.iter().map(|(t, x, y)| make_fragment(t, *x, *y)).collect();
        group_rows(&fragments, 3.0)
    }

    #[test]
    fn test_detect_columns() {
        let detector = TableDetector::new();
        let rows = rows_of(&[
            ("A1", 10.0, 100.0),
            ("B1", 60.0, 100.0),
            ("A2", 11.0, 115.0),
            ("B2", 62.0, 115.0),
            ("A3", 9.0, 130.0),
            ("B3", 59.0, 130.0),
        ]);

        let columns = detector.detect_columns(&rows);
        assert_eq!(columns.len(), 2);
        assert!((columns[0] - 10.0).abs() < 1.0);
        assert!((columns[1] - 60.33).abs() < 1.0);
    }

    #[test]
    fn test_column_needs_row_support() {
        let detector = TableDetector::new();
        // The fragment at x=200 appears in one row only
        let rows = rows_of(&[
            ("A1", 10.0, 100.0),
            ("B1", 60.0, 100.0),
            ("C1", 200.0, 100.0),
            ("A2", 10.0, 115.0),
            ("B2", 60.0, 115.0),
            ("A3", 10.0, 130.0),
            ("B3", 60.0, 130.0),
        ]);
        assert_eq!(detector.detect_columns(&rows).len(), 2);
    }

    #[test]
    fn test_detect_simple_table() {
        let detector = TableDetector::new();
        let rows = rows_of(&[
            ("Nombre", 10.0, 100.0),
            ("Potencia", 100.0, 100.0),
            ("Alfa", 10.0, 115.0),
            ("30", 100.0, 115.0),
            ("Beta", 10.0, 130.0),
            ("25", 100.0, 130.0),
        ]);

        let table = detector.detect_at(&rows, 0).expect("table");
        assert_eq!((table.start, table.end), (0, 3));
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.method, TableMethod::Alignment);
        assert_eq!(table.matrix[1], vec!["Alfa".to_string(), "30".to_string()]);
        assert!((table.confidence() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_table_single_column() {
        let detector = TableDetector::new();
        let rows = rows_of(&[("Line 1", 10.0, 100.0), ("Line 2", 10.0, 115.0), ("Line 3", 10.0, 130.0)]);
        assert!(detector.detect_at(&rows, 0).is_none());
    }

    #[test]
    fn test_too_few_rows() {
        let detector = TableDetector::new();
        let rows = rows_of(&[("A", 10.0, 100.0), ("1", 100.0, 100.0), ("B", 10.0, 115.0), ("2", 100.0, 115.0)]);
        assert!(detector.detect_at(&rows, 0).is_none());
    }

    #[test]
    fn test_extension_stops_at_long_single_cell() {
        let detector = TableDetector::new();
        let mut cells = vec![
            ("Alfa", 10.0, 100.0),
            ("1", 100.0, 100.0),
            ("Beta", 10.0, 115.0),
            ("2", 100.0, 115.0),
            ("Gamma", 10.0, 130.0),
            ("3", 100.0, 130.0),
        ];
        cells.push((
            "Este es un párrafo largo que no pertenece a la tabla anterior",
            10.0,
            145.0,
        ));
        let rows = rows_of(&cells);
        let table = detector.detect_at(&rows, 0).expect("table");
        assert_eq!(table.end, 3);
    }

    #[test]
    fn test_gap_rows_tolerated_but_not_trailing() {
        let detector = TableDetector::new();
        let rows = rows_of(&[
            ("Alfa", 10.0, 100.0),
            ("1", 100.0, 100.0),
            ("Beta", 10.0, 112.0),
            ("2", 100.0, 112.0),
            ("|", 50.0, 124.0),
            ("Gamma", 10.0, 136.0),
            ("3", 100.0, 136.0),
            ("·", 300.0, 148.0),
        ]);
        let table = detector.detect_at(&rows, 0).expect("table");
        assert_eq!(table.end, 4);
        // The separator row holds no aligned text and disappears from the matrix
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn test_keyword_acceptance() {
        let detector = TableDetector::new();
        // Scattered text below the table keeps the window score low
        let rows = rows_of(&[
            ("Campo", 10.0, 100.0),
            ("Valor", 150.0, 100.0),
            ("Tensión", 10.0, 115.0),
            ("220 kV", 150.0, 115.0),
            ("Estado", 10.0, 130.0),
            ("operativa", 150.0, 130.0),
            ("Observaciones", 40.0, 145.0),
            ("del", 250.0, 145.0),
            ("informe", 350.0, 145.0),
            ("Texto", 70.0, 160.0),
            ("adicional", 270.0, 160.0),
        ]);
        let table = detector.detect_at(&rows, 0).expect("table");
        assert_eq!(table.method, TableMethod::Keywords);
        assert_eq!(table.end, 3);
        assert!(table.score < 0.6);
    }

    #[test]
    fn test_matrix_drops_empty_columns() {
        let detector = TableDetector::new();
        let rows = rows_of(&[("A", 10.0, 100.0), ("B", 10.0, 115.0)]);
        let matrix = detector.build_matrix(&rows, &[10.0, 200.0]);
        assert_eq!(matrix, vec![vec!["A".to_string()], vec!["B".to_string()]]);
    }

    #[test]
    fn test_numbered_list_not_detected_as_table() {
        let detector = TableDetector::new();
        let rows = rows_of(&[
            ("1.", 50.0, 400.0),
            ("Configuración de equipos", 80.0, 400.0),
            ("2.", 50.0, 415.0),
            ("Gestión de objetos", 80.0, 415.0),
            ("3.", 50.0, 430.0),
            ("Políticas y enrutamiento", 80.0, 430.0),
            ("4.", 50.0, 445.0),
            ("VPN", 80.0, 445.0),
        ]);
        assert!(detector.detect_at(&rows, 0).is_none());
    }

    #[test]
    fn test_bullet_list_not_detected_as_table() {
        let detector = TableDetector::new();
        let rows = rows_of(&[
            ("-", 50.0, 400.0),
            ("Gestión", 80.0, 400.0),
            ("-", 50.0, 415.0),
            ("Interfaces y servicios", 80.0, 415.0),
            ("-", 50.0, 430.0),
            ("Firmware", 80.0, 430.0),
        ]);
        assert!(detector.detect_at(&rows, 0).is_none());
    }

    #[test]
    fn test_is_list_marker() {
        let is_list_marker = |t: &str| is_bullet_marker(t) || is_number_marker(t);

        assert!(is_list_marker("1."));
        assert!(is_list_marker("12."));
        assert!(is_list_marker("1)"));
        assert!(is_list_marker("(1)"));
        assert!(is_list_marker("1 ."));
        assert!(is_list_marker("3"));

        assert!(is_list_marker("-"));
        assert!(is_list_marker("•"));
        assert!(is_list_marker("*"));
        assert!(is_list_marker("–"));

        assert!(is_list_marker("a."));
        assert!(is_list_marker("B)"));
        assert!(is_list_marker("(c)"));

        assert!(!is_list_marker("Nombre"));
        assert!(!is_list_marker("Hola mundo"));
        assert!(!is_list_marker("c"));
        assert!(!is_list_marker(""));
    }

    #[test]
    fn test_table_keywords() {
        assert!(has_table_keyword("N° Descripción"));
        assert!(has_table_keyword("Código: X"));
        assert!(!has_table_keyword("Itemizado de obras"));
    }
}
