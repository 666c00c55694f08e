//! Detection of vector graphics (charts, diagrams, single-line schematics).
//!
//! Vector drawings arrive as hundreds of small primitives. Primitives that lie
//! outside the regions already explained by tables and images are dropped
//! onto a sparse grid, and 8-connected groups of occupied cells that are big
//! enough become graphic regions.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::model::{BBox, BlockContent, ContentBlock, Row, VectorPrimitive};

use super::occupancy::OccupancyGrid;
use super::options::GraphicConfig;

type Cell = (i64, i64);

const NEIGHBORS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// A cluster of vector primitives forming one graphic.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicRegion {
    /// Union of the member primitives' boxes
    pub bbox: BBox,
    /// Number of grid cells in the cluster
    pub cells: usize,
    /// Number of member primitives
    pub primitives: usize,
}

impl GraphicRegion {
    /// Turn the region into an image block.
    pub fn into_block(self, page: u32, confidence: f32) -> ContentBlock {
        ContentBlock::new(BlockContent::Image, self.bbox, confidence, page)
            .with_meta("method", "graphic-cluster")
            .with_meta("cells", self.cells)
            .with_meta("primitives", self.primitives)
    }
}

/// Finds graphic regions among a page's vector primitives.
#[derive(Debug, Clone, Copy)]
pub struct GraphicClusterer<'a> {
    config: &'a GraphicConfig,
}

impl<'a> GraphicClusterer<'a> {
    /// Create a clusterer.
    pub fn new(config: &'a GraphicConfig) -> Self {
        Self { config }
    }

    /// Find graphic regions on a page.
    ///
    /// `claimed` holds the boxes of trusted tables and raster images; rows
    /// count toward page occupancy but do not exclude primitives.
    pub fn find_regions(
        &self,
        page_bounds: BBox,
        rows: &[Row],
        claimed: &[BBox],
        primitives: &[VectorPrimitive],
    ) -> Vec<GraphicRegion> {
        if primitives.len() < self.config.min_primitives {
            return Vec::new();
        }

        let mut grid = OccupancyGrid::new(page_bounds, self.config.coarse_cell);
        for row in rows {
            grid.mark(&row.bbox);
        }
        for bbox in claimed {
            grid.mark(bbox);
        }
        let occupied = grid.occupied_ratio();
        if occupied > self.config.max_occupied_ratio {
            log::debug!("Graphics: page {:.0}% occupied, skipping", occupied * 100.0);
            return Vec::new();
        }

        let page_area = page_bounds.area();
        let free: Vec<BBox> = primitives
            .iter()
            .filter_map(|p| p.bbox.clip_to(&page_bounds))
            .filter(|b| b.area() < page_area * 0.5)
            .filter(|b| {
                let (cx, cy) = b.center();
                !claimed.iter().any(|c| c.contains_point(cx, cy))
            })
            .collect();

        if free.len() < self.config.min_primitives {
            log::debug!(
                "Graphics: {} free primitives (< {})",
                free.len(),
                self.config.min_primitives
            );
            return Vec::new();
        }

        let cells = self.occupied_cells(&free);
        let regions = self.cluster(&cells, &free);
        log::debug!(
            "Graphics: {} primitives over {} cells, {} regions",
            free.len(),
            cells.len(),
            regions.len()
        );
        regions
    }

    /// Map every fine grid cell touched by a primitive to the primitives touching it.
    ///
    /// Boxes are already clipped to the page, so indices stay small.
    fn occupied_cells(&self, primitives: &[BBox]) -> BTreeMap<Cell, Vec<usize>> {
        let size = self.config.fine_cell;
        let mut cells: BTreeMap<Cell, Vec<usize>> = BTreeMap::new();

        for (index, b) in primitives.iter().enumerate() {
            let c0 = (b.x0 / size).floor() as i64;
            let r0 = (b.y0 / size).floor() as i64;
            let c1 = (((b.x1 / size).ceil() as i64) - 1).max(c0);
            let r1 = (((b.y1 / size).ceil() as i64) - 1).max(r0);
            for r in r0..=r1 {
                for c in c0..=c1 {
                    cells.entry((c, r)).or_default().push(index);
                }
            }
        }

        cells
    }

    /// Flood-fill 8-connected cells and keep the clusters that are large enough.
    fn cluster(&self, cells: &BTreeMap<Cell, Vec<usize>>, primitives: &[BBox]) -> Vec<GraphicRegion> {
        let mut remaining: BTreeSet<Cell> = cells.keys().copied().collect();
        let mut queue: VecDeque<Cell> = VecDeque::new();
        let mut regions = Vec::new();

        while let Some(start) = remaining.pop_first() {
            queue.clear();
            queue.push_back(start);
            let mut cell_count = 0;
            let mut members: BTreeSet<usize> = BTreeSet::new();

            while let Some((c, r)) = queue.pop_front() {
                cell_count += 1;
                if let Some(indices) = cells.get(&(c, r)) {
                    members.extend(indices.iter().copied());
                }
                for (dc, dr) in NEIGHBORS {
                    let (Some(nc), Some(nr)) = (c.checked_add(dc), r.checked_add(dr)) else {
                        continue;
                    };
                    if remaining.remove(&(nc, nr)) {
                        queue.push_back((nc, nr));
                    }
                }
            }

            if cell_count < self.config.min_cluster_cells {
                continue;
            }
            let Some(bbox) = BBox::enclosing(members.iter().map(|i| &primitives[*i])) else {
                continue;
            };
            if bbox.width() < self.config.min_width || bbox.height() < self.config.min_height {
                log::trace!(
                    "Graphics: cluster of {} cells too small ({:.0}x{:.0})",
                    cell_count,
                    bbox.width(),
                    bbox.height()
                );
                continue;
            }

            regions.push(GraphicRegion {
                bbox,
                cells: cell_count,
                primitives: members.len(),
            });
        }

        regions
    }
}
