//! UI Render Backend Trait
//!
//! Defines the interface between the UI system and rendering backends.
//! The UI core only produces ordered paint items; drawing them is up to the host.

use crate::error::UiResult;
use crate::foundation::math::Mat4;
use crate::render::commands::RenderItem;

/// Backend-agnostic UI rendering interface
pub trait UiRenderBackend {
    /// Begin UI rendering pass with the camera's view-projection
    fn begin_ui_pass(&mut self, projection: &Mat4) -> UiResult<()>;

    /// Draw items in the given order
    ///
    /// # Arguments
    /// * `items` - Paint list, already sorted by `order`
    fn draw_items(&mut self, items: &[RenderItem]) -> UiResult<()>;

    /// End UI rendering pass
    fn end_ui_pass(&mut self) -> UiResult<()>;

    /// Update screen size for UI coordinate calculations
    fn set_screen_size(&mut self, width: u32, height: u32);

    /// Get current screen size
    fn get_screen_size(&self) -> (u32, u32);
}

/// Backend that keeps the last frame's items, for tools and tests
#[derive(Debug, Default)]
pub struct RecordingBackend {
    /// Items from the last completed pass
    pub frame: Vec<RenderItem>,
    /// Projection from the last pass
    pub projection: Option<Mat4>,
    /// Completed pass count
    pub passes: u64,
    pending: Vec<RenderItem>,
    in_pass: bool,
    screen_size: (u32, u32),
}

impl RecordingBackend {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }
}

impl UiRenderBackend for RecordingBackend {
    fn begin_ui_pass(&mut self, projection: &Mat4) -> UiResult<()> {
        if self.in_pass {
            return Err(crate::error::UiError::Render("UI pass already in progress".to_string()));
        }
        self.in_pass = true;
        self.projection = Some(*projection);
        self.pending.clear();
        Ok(())
    }

    fn draw_items(&mut self, items: &[RenderItem]) -> UiResult<()> {
        if !self.in_pass {
            return Err(crate::error::UiError::Render("draw outside of a UI pass".to_string()));
        }
        self.pending.extend_from_slice(items);
        Ok(())
    }

    fn end_ui_pass(&mut self) -> UiResult<()> {
        if !self.in_pass {
            return Err(crate::error::UiError::Render("no UI pass to end".to_string()));
        }
        self.in_pass = false;
        self.frame = std::mem::take(&mut self.pending);
        self.passes += 1;
        log::trace!("Recorded UI pass {} with {} items", self.passes, self.frame.len());
        Ok(())
    }

    fn set_screen_size(&mut self, width: u32, height: u32) {
        self.screen_size = (width, height);
    }

    fn get_screen_size(&self) -> (u32, u32) {
        self.screen_size
    }
}
