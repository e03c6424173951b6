//! Panel widget - colored rectangle backgrounds

use super::core::palette;
use crate::error::{UiError, UiResult};
use crate::foundation::collections::NodeId;
use crate::foundation::math::Vec4;
use crate::ui::builder::Builder;
use crate::ui::node::Paint;
use crate::ui::tree::UiTree;

/// Register the `color` property on a painted node
pub(crate) fn observe_color(tree: &mut UiTree, id: NodeId) -> UiResult<()> {
    tree.observe::<Vec4, _>(id, "color", |tree, id, color| {
        let paint = tree.paint_mut(id).ok_or(UiError::NodeNotFound(id))?;
        paint.color = color;
        Ok(())
    })
}

/// A colored rectangle. Properties: `color`.
pub fn panel(b: &mut Builder<'_>) -> UiResult<()> {
    let id = b.set_root_named("panel")?;
    let tree = b.tree_mut();
    tree.set_paint(id, Some(Paint::solid(palette::PANEL)))?;
    observe_color(tree, id)
}
