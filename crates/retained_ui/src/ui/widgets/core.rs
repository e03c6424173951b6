//! Core widget primitives
//!
//! Anchor presets and the default palette shared by the built-in widgets.

use crate::foundation::math::{Vec2, Vec4};

/// Anchor preset for placing a widget inside its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    /// Top-left corner (0, 0) of the parent
    #[default]
    TopLeft,
    /// Top-center
    TopCenter,
    /// Top-right corner
    TopRight,
    /// Middle-left
    MiddleLeft,
    /// Center of the parent
    Center,
    /// Middle-right
    MiddleRight,
    /// Bottom-left corner
    BottomLeft,
    /// Bottom-center
    BottomCenter,
    /// Bottom-right corner
    BottomRight,
    /// Stretch over the whole parent
    Fill,
}

impl Anchor {
    /// Get the normalized anchor point (0.0 to 1.0, y-down)
    pub fn to_normalized(self) -> (f32, f32) {
        match self {
            Anchor::TopLeft | Anchor::Fill => (0.0, 0.0),
            Anchor::TopCenter => (0.5, 0.0),
            Anchor::TopRight => (1.0, 0.0),
            Anchor::MiddleLeft => (0.0, 0.5),
            Anchor::Center => (0.5, 0.5),
            Anchor::MiddleRight => (1.0, 0.5),
            Anchor::BottomLeft => (0.0, 1.0),
            Anchor::BottomCenter => (0.5, 1.0),
            Anchor::BottomRight => (1.0, 1.0),
        }
    }

    /// Anchor edges `(left, top, right, bottom)` for the `anchor` property
    pub fn to_edges(self) -> Vec4 {
        if self == Anchor::Fill {
            return Vec4::new(0.0, 0.0, 1.0, 1.0);
        }
        let (x, y) = self.to_normalized();
        Vec4::new(x, y, x, y)
    }

    /// Pivot that keeps the widget inside the parent at this anchor
    pub fn pivot(self) -> Vec2 {
        let (x, y) = self.to_normalized();
        Vec2::new(x, y)
    }
}

/// Default widget colors
pub mod palette {
    use crate::foundation::math::Vec4;

    /// Panel background
    pub const PANEL: Vec4 = Vec4::new(0.2, 0.2, 0.2, 0.8);
    /// Text
    pub const TEXT: Vec4 = Vec4::new(1.0, 1.0, 1.0, 1.0);
    /// Button in its normal state
    pub const BUTTON_NORMAL: Vec4 = Vec4::new(0.3, 0.3, 0.3, 0.9);
    /// Button under the pointer
    pub const BUTTON_HOVER: Vec4 = Vec4::new(0.4, 0.4, 0.5, 1.0);
    /// Button while pressed
    pub const BUTTON_PRESSED: Vec4 = Vec4::new(0.5, 0.5, 0.6, 1.0);
    /// Disabled button
    pub const BUTTON_DISABLED: Vec4 = Vec4::new(0.2, 0.2, 0.2, 0.5);
    /// Scrollbar track
    pub const SCROLL_TRACK: Vec4 = Vec4::new(0.15, 0.15, 0.15, 0.6);
    /// Scrollbar handle
    pub const SCROLL_HANDLE: Vec4 = Vec4::new(0.6, 0.6, 0.6, 0.9);
    /// Invisible quads (mask sentinels)
    pub const TRANSPARENT: Vec4 = Vec4::new(0.0, 0.0, 0.0, 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_edges() {
        assert_eq!(Anchor::Center.to_edges(), Vec4::new(0.5, 0.5, 0.5, 0.5));
        assert_eq!(Anchor::Fill.to_edges(), Vec4::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(Anchor::BottomRight.pivot(), Vec2::new(1.0, 1.0));
    }
}
