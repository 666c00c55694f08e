//! Page-space geometry.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in page space.
///
/// The origin is the top-left corner of the page; `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Create a bounding box from origin and size.
    pub fn from_size(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Whether all four coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }

    /// Whether the box is finite and encloses a positive area.
    pub fn is_valid(&self) -> bool {
        self.is_finite() && self.x1 > self.x0 && self.y1 > self.y0
    }

    /// Width of the box (0 for inverted boxes).
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    /// Height of the box (0 for inverted boxes).
    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    /// Area of the box; degenerate and non-finite boxes have no area.
    pub fn area(&self) -> f32 {
        if !self.is_finite() {
            return 0.0;
        }
        self.width() * self.height()
    }

    /// Center point.
    pub fn center(&self) -> (f32, f32) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Check if a point lies inside the box (edges included).
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    /// Smallest box enclosing both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Area shared by both boxes.
    pub fn intersection_area(&self, other: &BBox) -> f32 {
        if !self.is_finite() || !other.is_finite() {
            return 0.0;
        }
        let w = self.x1.min(other.x1) - self.x0.max(other.x0);
        let h = self.y1.min(other.y1) - self.y0.max(other.y0);
        if w <= 0.0 || h <= 0.0 {
            0.0
        } else {
            w * h
        }
    }

    /// The part of this box inside `other`, or `None` when they do not touch.
    ///
    /// Zero-width and zero-height results are kept so thin lines survive.
    pub fn clip_to(&self, other: &BBox) -> Option<BBox> {
        if !self.is_finite() || !other.is_finite() {
            return None;
        }
        let clipped = BBox {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        (clipped.x1 >= clipped.x0 && clipped.y1 >= clipped.y0).then_some(clipped)
    }

    /// Intersection divided by the area of the smaller box.
    pub fn overlap_ratio(&self, other: &BBox) -> f32 {
        let smaller = self.area().min(other.area());
        if smaller <= 0.0 {
            return 0.0;
        }
        self.intersection_area(other) / smaller
    }

    /// Fraction of this box's area that lies inside `other`.
    pub fn containment_in(&self, other: &BBox) -> f32 {
        let area = self.area();
        if area <= 0.0 {
            return 0.0;
        }
        self.intersection_area(other) / area
    }

    /// Union of a sequence of boxes, or `None` when empty.
    pub fn enclosing<'a, I>(boxes: I) -> Option<BBox>
    where
        I: IntoIterator<Item = &'a BBox>,
    {
        boxes.into_iter().fold(None, |acc, b| match acc {
            None => Some(*b),
            Some(a) => Some(a.union(b)),
        })
    }
}
