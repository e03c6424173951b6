//! # UI Configuration
//!
//! Tunables for the interaction pipeline, scrolling and defaults used by the
//! builder. Loaded once at startup through the [`Config`] trait (TOML or RON).
//!
//! ## Configuration Categories
//!
//! - **Input**: drag threshold, wheel speed
//! - **Scrolling**: damping, scrollbar thickness
//! - **Defaults**: font size, initial screen size
//! - **Diagnostics**: log filter

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError};

/// # UI System Configuration
///
/// Top-level configuration applications hand to [`crate::ui::UiContext`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Screen-space displacement (per axis, UI units) before a press becomes a drag
    pub drag_threshold: f32,
    /// Exponential damping rate applied to scroll velocity (per second)
    pub scroll_damping: f32,
    /// Scroll velocity added per wheel notch (UI units per second)
    pub wheel_speed: f32,
    /// Width of vertical / height of horizontal scrollbars
    pub scrollbar_thickness: f32,
    /// Font size used by labels when none is given
    pub default_font_size: f32,
    /// Initial screen size in pixels (width, height)
    pub screen_size: (f32, f32),
    /// Log filter used by [`crate::foundation::logging::init_with_level`]
    pub log_level: String,
}

impl UiConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            drag_threshold: 5.0,
            scroll_damping: 20.0,
            wheel_speed: 600.0,
            scrollbar_thickness: 8.0,
            default_font_size: 16.0,
            screen_size: (800.0, 600.0),
            log_level: "info".to_string(),
        }
    }

    /// Set the drag threshold
    pub fn with_drag_threshold(mut self, threshold: f32) -> Self {
        self.drag_threshold = threshold;
        self
    }

    /// Set the initial screen size
    pub fn with_screen_size(mut self, width: f32, height: f32) -> Self {
        self.screen_size = (width, height);
        self
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.drag_threshold >= 0.0) {
            return Err(ConfigError::Invalid("drag_threshold must be non-negative".to_string()));
        }
        if !(self.scroll_damping > 0.0) {
            return Err(ConfigError::Invalid("scroll_damping must be positive".to_string()));
        }
        if !(self.default_font_size > 0.0) {
            return Err(ConfigError::Invalid("default_font_size must be positive".to_string()));
        }
        if self.screen_size.0 <= 0.0 || self.screen_size.1 <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "screen_size must be positive, got {:?}",
                self.screen_size
            )));
        }
        Ok(())
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for UiConfig {}
