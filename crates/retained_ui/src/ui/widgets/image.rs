//! Image widget - textured quads

use super::core::palette;
use super::panel::observe_color;
use crate::error::UiResult;
use crate::foundation::math::Vec2;
use crate::ui::builder::Builder;
use crate::ui::node::Paint;

/// A quad showing the texture at `path`, sized to the texture.
///
/// A texture that fails to load does not fail the build: the image stays
/// blank and the failure is queued on the context for the host to report.
/// Properties: `color` (tint).
pub fn image(path: impl Into<String>) -> impl FnOnce(&mut Builder<'_>) -> UiResult<()> {
    let path = path.into();
    move |b: &mut Builder<'_>| {
        let id = b.set_root_named("image")?;
        let mut paint = Paint::solid(palette::TEXT);
        let mut size = Vec2::zeros();

        match b.context_mut().load_texture(&path) {
            Ok((handle, info)) => {
                paint.texture = Some(handle);
                #[allow(clippy::cast_precision_loss)]
                {
                    size = Vec2::new(info.width as f32, info.height as f32);
                }
            }
            Err(err) => log::warn!("Image '{}' shown without texture: {}", path, err),
        }

        let tree = b.tree_mut();
        tree.transform_mut(id)?.size = size;
        tree.set_paint(id, Some(paint))?;
        observe_color(tree, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UiConfig;
    use crate::ui::context::{ResourceLoader, TextureInfo, UiContext, UiNotification};
    use crate::ui::tree::UiTree;

    struct OneTexture;

    impl ResourceLoader for OneTexture {
        fn load_texture(&mut self, path: &str) -> Result<TextureInfo, String> {
            if path == "logo.png" {
                Ok(TextureInfo { width: 64, height: 32 })
            } else {
                Err("no such file".to_string())
            }
        }
    }

    #[test]
    fn test_image_sizes_to_texture() {
        let mut tree = UiTree::default();
        let mut ctx = UiContext::init(UiConfig::default()).unwrap();
        ctx.set_loader(Box::new(OneTexture));
        let id = Builder::new(&mut tree, &mut ctx).create(image("logo.png")).unwrap();

        assert_eq!(tree.transform(id).unwrap().size, Vec2::new(64.0, 32.0));
        assert!(tree.paint(id).unwrap().texture.is_some());
    }

    #[test]
    fn test_missing_texture_is_recoverable() {
        let mut tree = UiTree::default();
        let mut ctx = UiContext::init(UiConfig::default()).unwrap();
        ctx.set_loader(Box::new(OneTexture));
        let id = Builder::new(&mut tree, &mut ctx).create(image("gone.png")).unwrap();

        assert!(tree.paint(id).unwrap().texture.is_none());
        let notes = ctx.drain_notifications();
        assert!(matches!(&notes[..], [UiNotification::ResourceLoadFailed { path, .. }] if path == "gone.png"));
    }
}
