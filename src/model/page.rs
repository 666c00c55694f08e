//! Page-level input types.

use super::{BBox, TextFragment};
use serde::{Deserialize, Serialize};

/// Everything the upstream extractor delivers for a single page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInput {
    /// Page width in points
    #[serde(default = "default_width")]
    pub width: f32,

    /// Page height in points
    #[serde(default = "default_height")]
    pub height: f32,

    /// Positioned text fragments, in any order
    #[serde(default)]
    pub fragments: Vec<TextFragment>,

    /// Bounding boxes of embedded raster images
    #[serde(default)]
    pub images: Vec<BBox>,

    /// Vector drawing primitives (lines, rectangles, filled paths)
    #[serde(default)]
    pub primitives: Vec<VectorPrimitive>,

    /// Table regions found by a specialized table finder, trusted as-is
    #[serde(default)]
    pub table_regions: Vec<BBox>,
}

/// Largest page side PDF allows, in points.
const MAX_PAGE_EXTENT: f32 = 14_400.0;

fn default_width() -> f32 {
    595.0
}

fn default_height() -> f32 {
    842.0
}

impl PageInput {
    /// Create a new empty page with the given dimensions.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            fragments: Vec::new(),
            images: Vec::new(),
            primitives: Vec::new(),
            table_regions: Vec::new(),
        }
    }

    /// Create a new empty A4 page (210 x 297 mm).
    pub fn a4() -> Self {
        Self::new(default_width(), default_height())
    }

    /// Create a new empty Letter page (8.5 x 11 inches).
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }

    /// Add a text fragment.
    pub fn add_fragment(&mut self, fragment: TextFragment) {
        self.fragments.push(fragment);
    }

    /// Add a raster image box.
    pub fn add_image(&mut self, bbox: BBox) {
        self.images.push(bbox);
    }

    /// Add a vector primitive.
    pub fn add_primitive(&mut self, primitive: VectorPrimitive) {
        self.primitives.push(primitive);
    }

    /// Add a pre-detected table region.
    pub fn add_table_region(&mut self, bbox: BBox) {
        self.table_regions.push(bbox);
    }

    /// Check if the page carries nothing to classify.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty() && self.images.is_empty() && self.primitives.is_empty()
    }

    /// The page rectangle.
    pub fn bounds(&self) -> BBox {
        BBox::new(0.0, 0.0, self.width, self.height)
    }

    /// Page area, or the extent of the content when the declared size is unusable.
    pub fn effective_bounds(&self) -> BBox {
        let declared = self.bounds();
        if declared.is_valid() && declared.x1 <= MAX_PAGE_EXTENT && declared.y1 <= MAX_PAGE_EXTENT {
            return declared;
        }
        log::warn!(
            "Page has unusable size {}x{}, falling back to content extent",
            self.width,
            self.height
        );
        let content = self
            .fragments
            .iter()
            .map(|f| &f.bbox)
            .chain(self.images.iter())
            .chain(self.primitives.iter().map(|p| &p.bbox))
            .filter(|b| b.is_finite());
        match BBox::enclosing(content) {
            Some(b) => BBox::new(
                0.0,
                0.0,
                b.x1.clamp(1.0, MAX_PAGE_EXTENT),
                b.y1.clamp(1.0, MAX_PAGE_EXTENT),
            ),
            None => BBox::new(0.0, 0.0, 1.0, 1.0),
        }
    }
}

impl Default for PageInput {
    fn default() -> Self {
        Self::a4()
    }
}

/// A vector drawing primitive reduced to its bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorPrimitive {
    /// What kind of drawing operation produced it
    #[serde(default)]
    pub kind: PrimitiveKind,
    /// Bounding rectangle
    pub bbox: BBox,
}

impl VectorPrimitive {
    /// Create a new primitive.
    pub fn new(kind: PrimitiveKind, bbox: BBox) -> Self {
        Self { kind, bbox }
    }

    /// Create a line primitive.
    pub fn line(bbox: BBox) -> Self {
        Self::new(PrimitiveKind::Line, bbox)
    }

    /// Create a rectangle primitive.
    pub fn rect(bbox: BBox) -> Self {
        Self::new(PrimitiveKind::Rect, bbox)
    }
}

/// Kind of vector primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    /// A stroked line segment
    Line,
    /// A rectangle
    Rect,
    /// A filled or stroked path
    #[default]
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_new() {
        let page = PageInput::new(612.0, 792.0);
        assert_eq!(page.width, 612.0);
        assert_eq!(page.height, 792.0);
        assert!(page.is_empty());
    }

    #[test]
    fn test_page_deserialize_defaults() {
        let page: PageInput = serde_json::from_str(
            r#"{"fragments":[{"text":"Hola","bbox":{"x0":1,"y0":2,"x1":30,"y1":12}}]}"#,
        )
        .unwrap();
        assert_eq!(page.width, 595.0);
        assert_eq!(page.fragments.len(), 1);
        assert_eq!(page.fragments[0].font_size, 12.0);
        assert!(page.images.is_empty());
    }

    #[test]
    fn test_effective_bounds_fallback() {
        let mut page = PageInput::new(0.0, 0.0);
        page.add_image(BBox::new(10.0, 10.0, 300.0, 400.0));
        assert_eq!(page.effective_bounds(), BBox::new(0.0, 0.0, 300.0, 400.0));
    }

    #[test]
    fn test_effective_bounds_rejects_huge_pages() {
        let mut page = PageInput::new(1e30, 842.0);
        page.add_image(BBox::new(10.0, 10.0, 300.0, 400.0));
        assert_eq!(page.effective_bounds(), BBox::new(0.0, 0.0, 300.0, 400.0));

        page.add_primitive(VectorPrimitive::line(BBox::new(0.0, 500.0, 1e30, 500.0)));
        assert_eq!(page.effective_bounds(), BBox::new(0.0, 0.0, 14_400.0, 500.0));
    }
}
