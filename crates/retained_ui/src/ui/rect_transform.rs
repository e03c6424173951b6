//! Rect transforms: 3-D placement plus anchored 2-D sizing for UI nodes.
//!
//! Local frames are y-down: the origin sits at the top-left corner of the
//! parent's content rect, x grows to the right and y grows downward. Edge
//! vectors (`anchor`, `margin`, `border`) are ordered `(left, top, right,
//! bottom)`.
//!
//! Along each axis independently a node is either *fixed* (anchor min equals
//! anchor max) and takes its extent from `size`, or *stretched* and fills the
//! anchored fraction of the parent minus its own margin and border.

use crate::foundation::math::{utils, Mat4, Quat, Vec2, Vec3, Vec4};

/// An axis-aligned rectangle in a node's local space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (top edge)
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    /// A zero-sized rect at the origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, width: 0.0, height: 0.0 };

    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Returns the right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Returns the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Width and height as a vector.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Returns true if the point is inside the rectangle (edges inclusive).
    ///
    /// Degenerate rects never contain anything.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        if self.width <= 0.0 || self.height <= 0.0 {
            return false;
        }
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

/// Narrow capability used to query a parent's rect without knowing its type.
pub trait HasRect {
    /// The content rect in local space.
    fn rect(&self) -> Rect;

    /// Size of the content rect.
    fn content_size(&self) -> Vec2 {
        self.rect().size()
    }
}

impl HasRect for Rect {
    fn rect(&self) -> Rect {
        *self
    }
}

/// Per-node placement and sizing.
#[derive(Debug, Clone, PartialEq)]
pub struct RectTransform {
    /// Offset from the anchored origin, in parent units
    pub position: Vec3,
    /// Local rotation around the pivot
    pub rotation: Quat,
    /// Local scale around the pivot
    pub scale: Vec3,
    /// Intrinsic width/height used on fixed axes
    pub size: Vec2,
    /// Outer spacing `(left, top, right, bottom)`
    pub margin: Vec4,
    /// Inner frame thickness `(left, top, right, bottom)`
    pub border: Vec4,
    /// Anchor fractions `(left, top, right, bottom)` of the parent content rect
    pub anchor: Vec4,
    /// Normalized origin within the node's own rect
    pub pivot: Vec2,
}

impl Default for RectTransform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            size: Vec2::zeros(),
            margin: Vec4::zeros(),
            border: Vec4::zeros(),
            anchor: Vec4::zeros(),
            pivot: Vec2::zeros(),
        }
    }
}

impl RectTransform {
    /// Create a fixed-size transform at the parent's top-left corner.
    pub fn with_size(width: f32, height: f32) -> Self {
        Self { size: Vec2::new(width, height), ..Self::default() }
    }

    /// Create a transform stretched over the whole parent content rect.
    pub fn stretched() -> Self {
        Self { anchor: Vec4::new(0.0, 0.0, 1.0, 1.0), ..Self::default() }
    }

    /// Set anchor fractions `(left, top, right, bottom)`.
    pub fn set_anchor(&mut self, anchor: Vec4) {
        self.anchor = anchor;
    }

    /// Set position and size in one call.
    pub fn set_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.position.x = x;
        self.position.y = y;
        self.size = Vec2::new(width, height);
    }

    /// Set outer margin `(left, top, right, bottom)`.
    pub fn set_margin(&mut self, margin: Vec4) {
        self.margin = margin;
    }

    /// Set border thickness `(left, top, right, bottom)`.
    pub fn set_border(&mut self, border: Vec4) {
        self.border = border;
    }

    /// Set the normalized pivot.
    pub fn set_pivot(&mut self, pivot: Vec2) {
        self.pivot = pivot;
    }

    /// Whether the horizontal extent follows the parent.
    pub fn is_stretched_x(&self) -> bool {
        !utils::same_fraction(self.anchor.x, self.anchor.z)
    }

    /// Whether the vertical extent follows the parent.
    pub fn is_stretched_y(&self) -> bool {
        !utils::same_fraction(self.anchor.y, self.anchor.w)
    }

    /// Combined margin and border on the leading edges (left, top).
    pub fn inset_min(&self) -> Vec2 {
        Vec2::new(self.margin.x + self.border.x, self.margin.y + self.border.y)
    }

    /// Combined margin and border on the trailing edges (right, bottom).
    pub fn inset_max(&self) -> Vec2 {
        Vec2::new(self.margin.z + self.border.z, self.margin.w + self.border.w)
    }

    /// Content extent given the parent's content size.
    pub fn content_size(&self, parent_size: Vec2) -> Vec2 {
        let insets = self.inset_min() + self.inset_max();
        let width = if self.is_stretched_x() {
            (self.anchor.z - self.anchor.x) * parent_size.x - insets.x
        } else {
            self.size.x
        };
        let height = if self.is_stretched_y() {
            (self.anchor.w - self.anchor.y) * parent_size.y - insets.y
        } else {
            self.size.y
        };
        Vec2::new(width.max(0.0), height.max(0.0))
    }

    /// Content rect in the node's own frame: `(0, 0, width, height)`.
    pub fn rect(&self, parent_size: Vec2) -> Rect {
        let size = self.content_size(parent_size);
        Rect::new(0.0, 0.0, size.x, size.y)
    }

    /// Content rect resolved against a parent capability.
    ///
    /// A missing parent behaves like a zero-sized parent rect.
    pub fn rect_in(&self, parent: Option<&dyn HasRect>) -> Rect {
        let parent_size = parent.map_or_else(Vec2::zeros, |p| p.content_size());
        self.rect(parent_size)
    }

    /// Extent including margin and border, as seen by the parent.
    pub fn outer_size(&self, parent_size: Vec2) -> Vec2 {
        self.content_size(parent_size) + self.inset_min() + self.inset_max()
    }

    /// Translation of the pivot point inside the parent frame.
    pub fn offset(&self, parent_size: Vec2) -> Vec3 {
        let anchored = Vec2::new(self.anchor.x * parent_size.x, self.anchor.y * parent_size.y);
        let lead = anchored + self.inset_min();
        self.position + Vec3::new(lead.x, lead.y, 0.0)
    }

    /// Local-to-parent matrix:
    /// `T(position + anchor + margin + border) * R * S * T(-pivot * size)`.
    pub fn local_matrix(&self, parent_size: Vec2) -> Mat4 {
        let content = self.content_size(parent_size);
        let pivot = Vec3::new(-self.pivot.x * content.x, -self.pivot.y * content.y, 0.0);
        Mat4::new_translation(&self.offset(parent_size))
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
            * Mat4::new_translation(&pivot)
    }

    /// Un-rotated outer box occupied in the parent frame.
    ///
    /// Layout strategies use this to stack and measure children; rotation and
    /// scale are ignored.
    pub fn outer_bounds(&self, parent_size: Vec2) -> Rect {
        let content = self.content_size(parent_size);
        let offset = self.offset(parent_size);
        let lead = self.inset_min();
        let outer = self.outer_size(parent_size);
        Rect::new(
            offset.x - self.pivot.x * content.x - lead.x,
            offset.y - self.pivot.y * content.y - lead.y,
            outer.x,
            outer.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Point3;
    use approx::assert_relative_eq;

    #[test]
    fn test_fixed_width_ignores_parent_and_insets() {
        let mut transform = RectTransform::with_size(40.0, 10.0);
        transform.set_anchor(Vec4::new(0.3, 0.0, 0.3, 0.0));
        transform.set_margin(Vec4::new(2.0, 3.0, 4.0, 5.0));
        transform.set_border(Vec4::new(1.0, 1.0, 1.0, 1.0));

        for parent_width in [0.0, 100.0, 2000.0] {
            let rect = transform.rect(Vec2::new(parent_width, 50.0));
            assert_relative_eq!(rect.width, 40.0);
            assert_relative_eq!(rect.height, 10.0);
        }
    }

    #[test]
    fn test_stretch_scales_with_parent() {
        let mut transform = RectTransform::with_size(999.0, 10.0);
        transform.set_anchor(Vec4::new(0.25, 0.0, 0.75, 0.0));
        transform.set_margin(Vec4::new(3.0, 0.0, 2.0, 0.0));

        let narrow = transform.rect(Vec2::new(200.0, 100.0)).width;
        let wide = transform.rect(Vec2::new(400.0, 100.0)).width;
        assert_relative_eq!(narrow, 0.5 * 200.0 - 5.0);
        assert_relative_eq!(wide - narrow, 0.5 * 200.0);
    }

    #[test]
    fn test_missing_parent_means_zero_rect() {
        let transform = RectTransform::stretched();
        let rect = transform.rect_in(None);
        assert_eq!(rect, Rect::ZERO);

        let parent = Rect::new(0.0, 0.0, 30.0, 20.0);
        let rect = transform.rect_in(Some(&parent));
        assert_relative_eq!(rect.width, 30.0);
        assert_relative_eq!(rect.height, 20.0);
    }

    #[test]
    fn test_inverted_anchor_collapses_to_zero() {
        let mut transform = RectTransform::with_size(10.0, 10.0);
        transform.set_anchor(Vec4::new(0.8, 0.0, 0.2, 0.0));
        let rect = transform.rect(Vec2::new(100.0, 100.0));
        assert_relative_eq!(rect.width, 0.0);
    }

    #[test]
    fn test_matrix_applies_anchor_margin_and_pivot() {
        let mut transform = RectTransform::with_size(20.0, 10.0);
        transform.set_anchor(Vec4::new(0.5, 0.5, 0.5, 0.5));
        transform.set_margin(Vec4::new(1.0, 2.0, 0.0, 0.0));
        transform.set_pivot(Vec2::new(0.5, 0.5));
        transform.position = Vec3::new(5.0, 0.0, 0.0);

        let matrix = transform.local_matrix(Vec2::new(100.0, 60.0));
        // Rect origin: 50 + 5 + 1 - 10 = 46, 30 + 2 - 5 = 27
        let origin = matrix.transform_point(&Point3::new(0.0, 0.0, 0.0));
        assert_relative_eq!(origin.x, 46.0);
        assert_relative_eq!(origin.y, 27.0);

        let bounds = transform.outer_bounds(Vec2::new(100.0, 60.0));
        assert_relative_eq!(bounds.x, 45.0);
        assert_relative_eq!(bounds.y, 25.0);
        assert_relative_eq!(bounds.width, 21.0);
        assert_relative_eq!(bounds.height, 12.0);
    }

    #[test]
    fn test_rotation_happens_around_pivot() {
        let mut transform = RectTransform::with_size(10.0, 10.0);
        transform.set_pivot(Vec2::new(0.5, 0.5));
        transform.position = Vec3::new(50.0, 50.0, 0.0);
        transform.rotation = Quat::from_axis_angle(&Vec3::z_axis(), std::f32::consts::FRAC_PI_2);

        let matrix = transform.local_matrix(Vec2::new(100.0, 100.0));
        let center = matrix.transform_point(&Point3::new(5.0, 5.0, 0.0));
        assert_relative_eq!(center.x, 50.0, epsilon = 1e-4);
        assert_relative_eq!(center.y, 50.0, epsilon = 1e-4);
    }

    #[test]
    fn test_rect_contains_edges_and_degenerate() {
        let rect = Rect::new(0.0, 0.0, 10.0, 5.0);
        assert!(rect.contains(0.0, 0.0));
        assert!(rect.contains(10.0, 5.0));
        assert!(!rect.contains(10.1, 1.0));
        assert!(!Rect::new(0.0, 0.0, 0.0, 5.0).contains(0.0, 0.0));
    }
}
