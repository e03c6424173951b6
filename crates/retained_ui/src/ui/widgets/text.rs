//! Text widget - single-line labels

use super::core::palette;
use super::panel::observe_color;
use crate::error::{UiError, UiResult};
use crate::foundation::collections::NodeId;
use crate::foundation::math::Vec2;
use crate::ui::builder::Builder;
use crate::ui::context::FontHandle;
use crate::ui::node::Paint;
use crate::ui::tree::UiTree;
use std::cell::Cell;
use std::rc::Rc;

fn fit_to_text(tree: &mut UiTree, id: NodeId, font_name: &str) -> UiResult<()> {
    let paint = tree.paint(id).ok_or(UiError::NodeNotFound(id))?;
    let text = paint.text.as_deref().unwrap_or_default();
    let extent = FontHandle::new(font_name, paint.font_size).measure(text);
    tree.transform_mut(id)?.size = extent;
    Ok(())
}

/// A text label sized to its content using the context's default font.
///
/// Properties: `text`, `color`, `font_size`. Changing the text or font size
/// re-measures the label until `size` is set explicitly; from then on the
/// given size is kept regardless of property order.
pub fn label(text: impl Into<String>) -> impl FnOnce(&mut Builder<'_>) -> UiResult<()> {
    let text = text.into();
    move |b: &mut Builder<'_>| {
        let id = b.set_root_named("label")?;
        let font = b.context().default_font().clone();
        let tree = b.tree_mut();
        tree.set_paint(id, Some(Paint::text(text, font.size, palette::TEXT)))?;
        fit_to_text(tree, id, &font.name)?;
        observe_color(tree, id)?;

        let pinned = Rc::new(Cell::new(false));
        let on_size = Rc::clone(&pinned);
        tree.observe::<Vec2, _>(id, "size", move |_, _, _| {
            on_size.set(true);
            Ok(())
        })?;

        let name = font.name.clone();
        let on_text = Rc::clone(&pinned);
        tree.observe::<String, _>(id, "text", move |tree, id, text| {
            tree.paint_mut(id).ok_or(UiError::NodeNotFound(id))?.text = Some(text);
            if on_text.get() { Ok(()) } else { fit_to_text(tree, id, &name) }
        })?;
        let name = font.name;
        tree.observe::<f32, _>(id, "font_size", move |tree, id, size| {
            tree.paint_mut(id).ok_or(UiError::NodeNotFound(id))?.font_size = size;
            if pinned.get() { Ok(()) } else { fit_to_text(tree, id, &name) }
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UiConfig;
    use crate::ui::context::UiContext;

    #[test]
    fn test_label_measures_and_remeasures() {
        let mut tree = UiTree::default();
        let mut ctx = UiContext::init(UiConfig::default()).unwrap();
        ctx.set_default_font(FontHandle::new("mono", 10.0));
        let id = Builder::new(&mut tree, &mut ctx).create(label("abcd")).unwrap();

        assert_eq!(tree.transform(id).unwrap().size, Vec2::new(20.0, 12.5));
        tree.set(id, "text", "ab").unwrap();
        assert_eq!(tree.transform(id).unwrap().size, Vec2::new(10.0, 12.5));
        tree.set(id, "font_size", 20_i64).unwrap();
        assert_eq!(tree.transform(id).unwrap().size, Vec2::new(20.0, 25.0));
        assert_eq!(tree.paint(id).unwrap().text.as_deref(), Some("ab"));
    }

    #[test]
    fn test_explicit_size_survives_text_changes() {
        let mut tree = UiTree::default();
        let mut ctx = UiContext::init(UiConfig::default()).unwrap();
        ctx.set_default_font(FontHandle::new("mono", 10.0));
        let mut b = Builder::new(&mut tree, &mut ctx);
        b.use_prop("size", Vec2::new(30.0, 2.0)).use_prop("text", "a much longer caption");
        let id = b.create(label("a")).unwrap();

        assert_eq!(tree.transform(id).unwrap().size, Vec2::new(30.0, 2.0));
        tree.set(id, "font_size", 40_i64).unwrap();
        assert_eq!(tree.transform(id).unwrap().size, Vec2::new(30.0, 2.0));
        assert_eq!(tree.paint(id).unwrap().text.as_deref(), Some("a much longer caption"));
    }
}
