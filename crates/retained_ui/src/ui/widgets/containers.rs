//! Layout containers - invisible nodes that arrange their children

use crate::error::UiResult;
use crate::foundation::collections::NodeId;
use crate::ui::builder::Builder;
use crate::ui::layout::{self, AutoHeight, Direction, Flex, Grid, LayoutChain, List};
use crate::ui::tree::UiTree;
use std::cell::Cell;
use std::rc::Rc;

/// A plain node with no paint and no layout
pub fn container(b: &mut Builder<'_>) -> UiResult<()> {
    b.set_root_named("container")?;
    Ok(())
}

fn install_list(tree: &mut UiTree, id: NodeId, direction: Direction, spacing: f32) -> UiResult<()> {
    let list = List::new(direction, spacing);
    match direction {
        Direction::Vertical => tree.set_layouter(id, LayoutChain::new().then(list).then(AutoHeight::new(0.0)))?,
        Direction::Horizontal => tree.set_layouter(id, list)?,
    }
    tree.run_layout(id);
    Ok(())
}

/// Stacks children along `direction` with `spacing` between them.
///
/// A vertical list also grows to fit its children. Properties: `direction`,
/// `spacing`.
pub fn list(direction: Direction, spacing: f32) -> impl FnOnce(&mut Builder<'_>) -> UiResult<()> {
    move |b: &mut Builder<'_>| {
        let id = b.set_root_named("list")?;
        let tree = b.tree_mut();
        install_list(tree, id, direction, spacing)?;

        let state = Rc::new(Cell::new((direction, spacing)));
        let on_spacing = Rc::clone(&state);
        tree.observe::<f32, _>(id, "spacing", move |tree, id, spacing| {
            let (direction, _) = on_spacing.get();
            on_spacing.set((direction, spacing));
            install_list(tree, id, direction, spacing)
        })?;
        tree.observe::<Direction, _>(id, "direction", move |tree, id, direction| {
            let (_, spacing) = state.get();
            state.set((direction, spacing));
            install_list(tree, id, direction, spacing)
        })
    }
}

/// Splits the node along `direction` in proportion to `weights`.
///
/// Fails the build when `weights` is empty or holds a non-positive weight.
pub fn flex(direction: Direction, weights: Vec<f32>, spacing: f32) -> impl FnOnce(&mut Builder<'_>) -> UiResult<()> {
    move |b: &mut Builder<'_>| {
        let id = b.set_root_named("flex")?;
        layout::apply(b.tree_mut(), id, Flex::new(direction, weights, spacing))
    }
}

/// Places children row by row into a `cols` x `rows` grid.
///
/// Fails the build when either dimension is zero.
pub fn grid(cols: u32, rows: u32, spacing: f32) -> impl FnOnce(&mut Builder<'_>) -> UiResult<()> {
    move |b: &mut Builder<'_>| {
        let id = b.set_root_named("grid")?;
        layout::apply(b.tree_mut(), id, Grid::new(cols, rows, spacing))
    }
}

/// Grows vertically to fit its children plus `extra`
pub fn auto_height(extra: f32) -> impl FnOnce(&mut Builder<'_>) -> UiResult<()> {
    move |b: &mut Builder<'_>| {
        let id = b.set_root_named("auto_height")?;
        b.tree_mut().set_layouter(id, AutoHeight::new(extra))
    }
}
