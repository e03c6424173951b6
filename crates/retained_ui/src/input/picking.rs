//! Viewport state for picking operations
//!
//! Provides utilities for converting screen-space coordinates to
//! Normalized Device Coordinates (NDC) for ray casting.

use crate::foundation::math::Vec2;

/// Screen-space viewport the UI is presented in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Left edge in pixels
    pub x: f32,
    /// Top edge in pixels
    pub y: f32,
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl Viewport {
    /// Create a viewport at the window origin
    pub fn new(width: f32, height: f32) -> Self {
        Self { x: 0.0, y: 0.0, width, height }
    }

    /// Viewport size as a vector
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Convert screen coordinates to Normalized Device Coordinates (NDC)
    ///
    /// NDC range: [-1, 1] where:
    /// - X: -1 = left, +1 = right
    /// - Y: -1 = top, +1 = bottom
    ///
    /// A degenerate viewport maps everything to the center.
    pub fn screen_to_ndc(&self, screen: Vec2) -> Vec2 {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Vec2::zeros();
        }
        Vec2::new(
            ((screen.x - self.x) / self.width) * 2.0 - 1.0,
            ((screen.y - self.y) / self.height) * 2.0 - 1.0,
        )
    }

    /// Convert screen coordinates to viewport-local pixels
    pub fn screen_to_local(&self, screen: Vec2) -> Vec2 {
        Vec2::new(screen.x - self.x, screen.y - self.y)
    }

    /// Update size (call when the window is resized)
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1920.0, 1080.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_to_ndc_center() {
        let viewport = Viewport::new(1920.0, 1080.0);
        let ndc = viewport.screen_to_ndc(Vec2::new(960.0, 540.0));
        assert!((ndc.x - 0.0).abs() < 0.001);
        assert!((ndc.y - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_screen_to_ndc_corners() {
        let viewport = Viewport::new(1920.0, 1080.0);
        let ndc = viewport.screen_to_ndc(Vec2::new(0.0, 0.0));
        assert!((ndc.x - (-1.0)).abs() < 0.001); // Left edge
        assert!((ndc.y - (-1.0)).abs() < 0.001); // Top edge

        let ndc = viewport.screen_to_ndc(Vec2::new(1920.0, 1080.0));
        assert!((ndc.x - 1.0).abs() < 0.001);
        assert!((ndc.y - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_offset_viewport() {
        let viewport = Viewport { x: 100.0, y: 50.0, width: 200.0, height: 100.0 };
        assert_eq!(viewport.screen_to_local(Vec2::new(150.0, 60.0)), Vec2::new(50.0, 10.0));
        let ndc = viewport.screen_to_ndc(Vec2::new(200.0, 100.0));
        assert!(ndc.norm() < 0.001);
    }

    #[test]
    fn test_degenerate_viewport() {
        let viewport = Viewport::new(0.0, 0.0);
        assert_eq!(viewport.screen_to_ndc(Vec2::new(10.0, 10.0)), Vec2::zeros());
    }
}
