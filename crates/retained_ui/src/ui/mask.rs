//! Stencil clip regions.
//!
//! A mask node is laid out as `[on, client, off]`: two invisible full-rect
//! sentinel quads around the client container that receives the mask's
//! children. The `on` sentinel sets this depth's stencil bit inside the rect,
//! the `off` sentinel restores the parent's bits afterwards, and everything
//! painted in between is tested against the bits of every enclosing mask
//! (see [`StencilState`]). Hit testing clips through the `MASKED` flag.
//!
//! The depth is the number of masks enclosing the node. It is recomputed
//! top-down on every tick, so a mask moved under another mask picks up the
//! new depth on the next update.

use crate::error::{UiError, UiResult};
use crate::foundation::collections::NodeId;
use crate::render::commands::StencilState;
use crate::ui::builder::Builder;
use crate::ui::node::{NodeFlags, Paint};
use crate::ui::tree::UiTree;
use crate::ui::widgets::core::{palette, Anchor};

/// Deepest nesting the 8-bit stencil buffer can represent
pub const MAX_MASK_DEPTH: u32 = 7;

/// Handles to the parts of a mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskParts {
    /// Sentinel drawn before the content
    pub on: NodeId,
    /// Container receiving the mask's children
    pub client: NodeId,
    /// Sentinel drawn after the content
    pub off: NodeId,
}

/// Find the parts of a mask built by [`mask`]
pub fn parts(tree: &UiTree, mask: NodeId) -> Option<MaskParts> {
    if !tree.flags(mask).contains(NodeFlags::MASKED) {
        return None;
    }
    match *tree.children(mask) {
        [on, client, off] => Some(MaskParts { on, client, off }),
        _ => None,
    }
}

fn sentinel(tree: &mut UiTree, mask: NodeId, name: &str, stencil: StencilState) -> UiResult<NodeId> {
    let id = tree.create_named(name);
    tree.set(id, "anchor", Anchor::Fill.to_edges())?;
    tree.set_flag(id, NodeFlags::RAYCAST_DISABLED, true)?;
    tree.set_paint(id, Some(Paint { stencil: Some(stencil), ..Paint::solid(palette::TRANSPARENT) }))?;
    tree.add_child(mask, id)?;
    Ok(id)
}

fn set_stencil(tree: &mut UiTree, id: NodeId, stencil: StencilState) -> UiResult<()> {
    tree.paint_mut(id).ok_or(UiError::NodeNotFound(id))?.stencil = Some(stencil);
    Ok(())
}

/// Refresh the sentinel stencil ops of `mask` from its current depth
pub fn update_mask(tree: &mut UiTree, mask: NodeId) -> UiResult<()> {
    let Some(parts) = parts(tree, mask) else {
        return Err(UiError::Build(format!("{mask:?} is not a mask")));
    };
    let depth = tree.clip_depth(mask);
    if depth > MAX_MASK_DEPTH {
        log::warn!("Mask {:?} nested {} deep; stencil bits exhausted", mask, depth);
    }
    set_stencil(tree, parts.on, StencilState::mask_on(depth))?;
    set_stencil(tree, parts.off, StencilState::mask_off(depth))
}

/// A clip region. Children added to the mask land in its client container
/// and are neither painted nor hit outside the mask's rect.
pub fn mask(b: &mut Builder<'_>) -> UiResult<()> {
    let id = b.set_root_named("mask")?;
    let tree = b.tree_mut();
    tree.set_flag(id, NodeFlags::MASKED, true)?;

    sentinel(tree, id, "mask_on", StencilState::mask_on(0))?;
    let client = tree.create_named("mask_client");
    tree.set(client, "anchor", Anchor::Fill.to_edges())?;
    tree.add_child(id, client)?;
    sentinel(tree, id, "mask_off", StencilState::mask_off(0))?;
    tree.set_client_area(id, client)?;

    tree.on_update(id, |tree, id, _dt| update_mask(tree, id))
}
