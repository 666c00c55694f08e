//! Page-scoped grid tracking which areas are already claimed.

use crate::model::BBox;

/// Upper bound on the number of cells in one grid.
const MAX_CELLS: usize = 1 << 20;

/// A fixed-cell grid over the page bounds.
///
/// Cells are claimed by marking boxes; a cell is claimed when any marked box
/// touches it. Boxes partially outside the page are clipped.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    origin_x: f32,
    origin_y: f32,
    cell: f32,
    columns: usize,
    rows: usize,
    claimed: Vec<bool>,
}

impl OccupancyGrid {
    /// Create an empty grid covering `bounds` with square cells of size `cell`.
    pub fn new(bounds: BBox, cell: f32) -> Self {
        let cell = if cell.is_finite() && cell > 0.0 { cell } else { 1.0 };
        let (mut columns, mut rows) = if bounds.is_valid() {
            (
                (bounds.width() / cell).ceil().max(1.0) as usize,
                (bounds.height() / cell).ceil().max(1.0) as usize,
            )
        } else {
            (0, 0)
        };

        let cells = match columns.checked_mul(rows) {
            Some(n) if n <= MAX_CELLS => n,
            _ => {
                log::warn!(
                    "Occupancy grid of {}x{} cells over {:?} is too large, leaving it empty",
                    columns,
                    rows,
                    bounds
                );
                columns = 0;
                rows = 0;
                0
            }
        };

        Self {
            origin_x: bounds.x0,
            origin_y: bounds.y0,
            cell,
            columns,
            rows,
            claimed: vec![false; cells],
        }
    }

    /// Number of cells in the grid.
    pub fn cell_count(&self) -> usize {
        self.claimed.len()
    }

    /// Claim every cell touched by `bbox`.
    pub fn mark(&mut self, bbox: &BBox) {
        let Some((c0, r0, c1, r1)) = self.cell_span(bbox) else {
            return;
        };
        for row in r0..=r1 {
            for col in c0..=c1 {
                self.claimed[row * self.columns + col] = true;
            }
        }
    }

    /// Whether any cell touched by `bbox` is claimed.
    pub fn is_claimed(&self, bbox: &BBox) -> bool {
        let Some((c0, r0, c1, r1)) = self.cell_span(bbox) else {
            return false;
        };
        (r0..=r1).any(|row| (c0..=c1).any(|col| self.claimed[row * self.columns + col]))
    }

    /// Fraction of cells that are claimed.
    pub fn occupied_ratio(&self) -> f32 {
        if self.claimed.is_empty() {
            return 0.0;
        }
        let taken = self.claimed.iter().filter(|c| **c).count();
        taken as f32 / self.claimed.len() as f32
    }

    /// Inclusive cell index range touched by `bbox`, clipped to the grid.
    fn cell_span(&self, bbox: &BBox) -> Option<(usize, usize, usize, usize)> {
        if self.claimed.is_empty() || !bbox.is_finite() || bbox.x1 < bbox.x0 || bbox.y1 < bbox.y0 {
            return None;
        }

        let max_col = (self.columns - 1) as f32;
        let max_row = (self.rows - 1) as f32;
        let c0 = ((bbox.x0 - self.origin_x) / self.cell).floor();
        let c1 = ((bbox.x1 - self.origin_x) / self.cell).floor();
        let r0 = ((bbox.y0 - self.origin_y) / self.cell).floor();
        let r1 = ((bbox.y1 - self.origin_y) / self.cell).floor();

        if c1 < 0.0 || r1 < 0.0 || c0 > max_col || r0 > max_row {
            return None;
        }

        Some((
            c0.clamp(0.0, max_col) as usize,
            r0.clamp(0.0, max_row) as usize,
            c1.clamp(0.0, max_col) as usize,
            r1.clamp(0.0, max_row) as usize,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_dimensions() {
        let grid = OccupancyGrid::new(BBox::new(0.0, 0.0, 595.0, 842.0), 100.0);
        // 6 columns x 9 rows
        assert_eq!(grid.cell_count(), 54);
        assert_eq!(grid.occupied_ratio(), 0.0);
    }

    #[test]
    fn test_oversized_bounds_give_empty_grid() {
        let mut grid = OccupancyGrid::new(BBox::new(0.0, 0.0, 1e30, 842.0), 100.0);
        assert_eq!(grid.cell_count(), 0);

        grid.mark(&BBox::new(10.0, 10.0, 50.0, 50.0));
        assert!(!grid.is_claimed(&BBox::new(10.0, 10.0, 50.0, 50.0)));
        assert_eq!(grid.occupied_ratio(), 0.0);

        let grid = OccupancyGrid::new(BBox::new(0.0, 0.0, 1e20, 1e20), 1e-6);
        assert_eq!(grid.cell_count(), 0);
    }

    #[test]
    fn test_mark_and_query() {
        let mut grid = OccupancyGrid::new(BBox::new(0.0, 0.0, 400.0, 400.0), 100.0);
        grid.mark(&BBox::new(10.0, 10.0, 150.0, 50.0));

        assert!(grid.is_claimed(&BBox::new(120.0, 20.0, 130.0, 30.0)));
        assert!(!grid.is_claimed(&BBox::new(250.0, 250.0, 260.0, 260.0)));
        assert_eq!(grid.occupied_ratio(), 2.0 / 16.0);
    }

    #[test]
    fn test_mark_clips_outside_boxes() {
        let mut grid = OccupancyGrid::new(BBox::new(0.0, 0.0, 200.0, 200.0), 100.0);
        grid.mark(&BBox::new(-50.0, -50.0, 1000.0, 10.0));
        assert_eq!(grid.occupied_ratio(), 0.5);

        grid.mark(&BBox::new(500.0, 500.0, 600.0, 600.0));
        assert_eq!(grid.occupied_ratio(), 0.5);
    }

    #[test]
    fn test_invalid_boxes_ignored() {
        let mut grid = OccupancyGrid::new(BBox::new(0.0, 0.0, 200.0, 200.0), 100.0);
        grid.mark(&BBox::new(f32::NAN, 0.0, 10.0, 10.0));
        grid.mark(&BBox::new(50.0, 50.0, 10.0, 10.0));
        assert_eq!(grid.occupied_ratio(), 0.0);

        let empty = OccupancyGrid::new(BBox::new(0.0, 0.0, 0.0, 0.0), 100.0);
        assert_eq!(empty.cell_count(), 0);
        assert!(!empty.is_claimed(&BBox::new(0.0, 0.0, 10.0, 10.0)));
    }
}
