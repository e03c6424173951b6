//! Process-scoped UI state: configuration, default font, default camera and
//! the texture cache.
//!
//! A [`UiContext`] is created explicitly with [`UiContext::init`] and torn
//! down with [`UiContext::teardown`]; builder functions receive it by
//! reference instead of reaching for globals.

use crate::core::UiConfig;
use crate::error::{UiError, UiResult};
use crate::foundation::math::Vec2;
use crate::input::Viewport;
use crate::render::camera::{OrthoCamera, UiCamera};
use std::collections::HashMap;
use std::fmt;

/// Handle to a texture known to the host renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Metrics of a loaded texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Font with the simple metrics the layout code needs
#[derive(Debug, Clone, PartialEq)]
pub struct FontHandle {
    /// Family or file name
    pub name: String,
    /// Nominal size in UI units
    pub size: f32,
    /// Distance between baselines
    pub line_height: f32,
    /// Average glyph advance
    pub advance: f32,
}

impl FontHandle {
    /// Monospace-style metrics derived from `size`
    pub fn new(name: &str, size: f32) -> Self {
        Self { name: name.to_string(), size, line_height: size * 1.25, advance: size * 0.5 }
    }

    /// Same font at another size
    pub fn with_size(&self, size: f32) -> Self {
        Self::new(&self.name, size)
    }

    /// Single-line extent of `text`
    #[allow(clippy::cast_precision_loss)]
    pub fn measure(&self, text: &str) -> Vec2 {
        Vec2::new(text.chars().count() as f32 * self.advance, self.line_height)
    }
}

/// Host-provided asset access
pub trait ResourceLoader {
    /// Load a texture and report its size
    fn load_texture(&mut self, path: &str) -> Result<TextureInfo, String>;
}

/// Something the host should know about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiNotification {
    /// A resource failed to load; the UI continues without it
    ResourceLoadFailed {
        /// Resource path or key
        path: String,
        /// Loader-provided reason
        reason: String,
    },
}

/// Explicit owner of the shared UI resources
pub struct UiContext {
    config: UiConfig,
    default_font: FontHandle,
    camera: Box<dyn UiCamera>,
    viewport: Viewport,
    loader: Option<Box<dyn ResourceLoader>>,
    textures: HashMap<String, (TextureHandle, TextureInfo)>,
    next_texture: u64,
    notifications: Vec<UiNotification>,
    active: bool,
}

impl fmt::Debug for UiContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiContext")
            .field("config", &self.config)
            .field("default_font", &self.default_font)
            .field("camera", &self.camera)
            .field("viewport", &self.viewport)
            .field("textures", &self.textures.len())
            .field("notifications", &self.notifications)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl UiContext {
    /// Validate `config` and set up the default font, camera and viewport
    pub fn init(config: UiConfig) -> UiResult<Self> {
        config.validate()?;
        let (width, height) = config.screen_size;
        log::info!("UI context initialized ({}x{})", width, height);
        Ok(Self {
            default_font: FontHandle::new("default", config.default_font_size),
            camera: Box::new(OrthoCamera::default()),
            viewport: Viewport::new(width, height),
            loader: None,
            textures: HashMap::new(),
            next_texture: 1,
            notifications: Vec::new(),
            active: true,
            config,
        })
    }

    /// Release cached resources. The context stays usable for queries but
    /// loads fail afterwards.
    pub fn teardown(&mut self) {
        if !self.active {
            return;
        }
        log::info!("UI context teardown ({} textures released)", self.textures.len());
        self.textures.clear();
        self.loader = None;
        self.active = false;
    }

    /// Whether [`Self::teardown`] has not run yet
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Configuration
    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    /// Default font
    pub fn default_font(&self) -> &FontHandle {
        &self.default_font
    }

    /// Replace the default font
    pub fn set_default_font(&mut self, font: FontHandle) {
        self.default_font = font;
    }

    /// Active camera
    pub fn camera(&self) -> &dyn UiCamera {
        self.camera.as_ref()
    }

    /// Replace the camera
    pub fn set_camera(&mut self, camera: Box<dyn UiCamera>) {
        log::debug!("UI camera replaced: {:?}", camera);
        self.camera = camera;
    }

    /// Viewport the UI is presented in
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Resize the viewport
    pub fn set_screen_size(&mut self, width: f32, height: f32) {
        self.viewport.resize(width, height);
    }

    /// Install the host's resource loader
    pub fn set_loader(&mut self, loader: Box<dyn ResourceLoader>) {
        self.loader = Some(loader);
    }

    /// Load (or fetch from cache) the texture at `path`.
    ///
    /// Failures are returned and also queued as a [`UiNotification`].
    pub fn load_texture(&mut self, path: &str) -> UiResult<(TextureHandle, TextureInfo)> {
        if let Some(entry) = self.textures.get(path) {
            return Ok(*entry);
        }

        let loaded = match (&mut self.loader, self.active) {
            (_, false) => Err("UI context has been torn down".to_string()),
            (None, true) => Err("no resource loader installed".to_string()),
            (Some(loader), true) => loader.load_texture(path),
        };

        match loaded {
            Ok(info) => {
                let handle = TextureHandle(self.next_texture);
                self.next_texture += 1;
                self.textures.insert(path.to_string(), (handle, info));
                log::debug!("Loaded texture '{}' as {:?} ({}x{})", path, handle, info.width, info.height);
                Ok((handle, info))
            }
            Err(reason) => {
                log::warn!("Failed to load texture '{}': {}", path, reason);
                self.notifications.push(UiNotification::ResourceLoadFailed {
                    path: path.to_string(),
                    reason: reason.clone(),
                });
                Err(UiError::ResourceLoad { path: path.to_string(), reason })
            }
        }
    }

    /// Take queued notifications
    pub fn drain_notifications(&mut self) -> Vec<UiNotification> {
        std::mem::take(&mut self.notifications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MapLoader(HashMap<String, TextureInfo>, usize);

    impl ResourceLoader for MapLoader {
        fn load_texture(&mut self, path: &str) -> Result<TextureInfo, String> {
            self.1 += 1;
            self.0.get(path).copied().ok_or_else(|| format!("{path} not found"))
        }
    }

    fn context() -> UiContext {
        let mut ctx = UiContext::init(UiConfig::default()).unwrap();
        let mut files = HashMap::new();
        files.insert("icons/ok.png".to_string(), TextureInfo { width: 16, height: 16 });
        ctx.set_loader(Box::new(MapLoader(files, 0)));
        ctx
    }

    #[test]
    fn test_texture_cache() {
        let mut ctx = context();
        let (first, info) = ctx.load_texture("icons/ok.png").unwrap();
        let (second, _) = ctx.load_texture("icons/ok.png").unwrap();
        assert_eq!(first, second);
        assert_eq!(info.width, 16);
    }

    #[test]
    fn test_load_failure_is_reported() {
        let mut ctx = context();
        let err = ctx.load_texture("missing.png").unwrap_err();
        assert!(matches!(err, UiError::ResourceLoad { .. }));
        assert_eq!(
            ctx.drain_notifications(),
            vec![UiNotification::ResourceLoadFailed {
                path: "missing.png".to_string(),
                reason: "missing.png not found".to_string(),
            }]
        );
        assert!(ctx.drain_notifications().is_empty());
    }

    #[test]
    fn test_teardown_disables_loading() {
        let mut ctx = context();
        ctx.teardown();
        assert!(!ctx.is_active());
        assert!(ctx.load_texture("icons/ok.png").is_err());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = UiConfig { drag_threshold: -1.0, ..UiConfig::default() };
        assert!(matches!(UiContext::init(config), Err(UiError::Config(_))));
    }

    #[test]
    fn test_font_measure() {
        let font = FontHandle::new("mono", 10.0);
        assert_eq!(font.measure("abcd"), Vec2::new(20.0, 12.5));
    }
}
