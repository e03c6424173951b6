//! Scrollbar widget - a track with a draggable handle

use super::core::palette;
use crate::error::UiResult;
use crate::events::EventType;
use crate::foundation::collections::NodeId;
use crate::foundation::math::{utils, Vec2, Vec3, Vec4};
use crate::ui::builder::Builder;
use crate::ui::layout::Direction;
use crate::ui::node::{NodeFlags, Paint};
use crate::ui::tree::UiTree;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, Default)]
struct ScrollbarState {
    value: f32,
    handle_size: f32,
}

/// The draggable handle of a scrollbar built by [`scrollbar`]
pub fn handle(tree: &UiTree, track: NodeId) -> Option<NodeId> {
    tree.children(track).first().copied()
}

fn place_handle(tree: &mut UiTree, track: NodeId, direction: Direction, state: ScrollbarState) -> UiResult<()> {
    let Some(handle) = handle(tree, track) else {
        return Ok(());
    };
    let main = direction.main();
    let length = tree.content_size(track)[main];
    let size = state.handle_size.clamp(0.0, length);

    let transform = tree.transform_mut(handle)?;
    transform.anchor = match direction {
        Direction::Vertical => Vec4::new(0.0, 0.0, 1.0, 0.0),
        Direction::Horizontal => Vec4::new(0.0, 0.0, 0.0, 1.0),
    };
    transform.pivot = Vec2::zeros();
    transform.size[main] = size;
    transform.position = Vec3::zeros();
    transform.position[main] = state.value * (length - size);
    Ok(())
}

/// A scrollbar along `direction`.
///
/// Properties: `value` (0..1, clamped) and `handle_size` (in track units).
/// Dragging the handle sets `value` on the track, so observers of `value`
/// see user input and programmatic changes alike.
pub fn scrollbar(direction: Direction) -> impl FnOnce(&mut Builder<'_>) -> UiResult<()> {
    move |b: &mut Builder<'_>| {
        let track = b.set_root_named("scrollbar")?;
        let tree = b.tree_mut();
        tree.set_paint(track, Some(Paint::solid(palette::SCROLL_TRACK)))?;

        let grip = tree.create_named("scrollbar_handle");
        tree.set_paint(grip, Some(Paint::solid(palette::SCROLL_HANDLE)))?;
        tree.set_flag(grip, NodeFlags::DRAG_EVENTS, true)?;
        tree.add_child(track, grip)?;

        let state = Rc::new(Cell::new(ScrollbarState::default()));
        place_handle(tree, track, direction, state.get())?;

        let on_value = Rc::clone(&state);
        tree.observe::<f32, _>(track, "value", move |tree, track, value| {
            let next = ScrollbarState { value: utils::clamp(value, 0.0, 1.0), ..on_value.get() };
            on_value.set(next);
            place_handle(tree, track, direction, next)
        })?;
        let on_size = Rc::clone(&state);
        tree.observe::<f32, _>(track, "handle_size", move |tree, track, size| {
            let next = ScrollbarState { handle_size: size.max(0.0), ..on_size.get() };
            on_size.set(next);
            place_handle(tree, track, direction, next)
        })?;

        let on_tick = Rc::clone(&state);
        tree.on_update(track, move |tree, track, _dt| place_handle(tree, track, direction, on_tick.get()))?;

        tree.on(grip, EventType::Drag, move |tree, event| {
            let Some(delta) = event.drag_delta() else {
                return Ok(());
            };
            let Some(track) = tree.parent(event.current) else {
                return Ok(());
            };
            let current = state.get();
            let main = direction.main();
            let travel = tree.content_size(track)[main] - current.handle_size;
            if travel <= 0.0 {
                return Ok(());
            }
            tree.set(track, "value", current.value + delta[main] / travel)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UiConfig;
    use crate::events::{Event, EventArg};
    use crate::ui::context::UiContext;
    use approx::assert_relative_eq;

    fn build(direction: Direction) -> (UiTree, NodeId) {
        let mut tree = UiTree::default();
        let mut ctx = UiContext::init(UiConfig::default()).unwrap();
        let mut b = Builder::new(&mut tree, &mut ctx);
        b.use_prop("size", Vec2::new(10.0, 100.0));
        let track = b.create(scrollbar(direction)).unwrap();
        (tree, track)
    }

    #[test]
    fn test_value_positions_handle() {
        let (mut tree, track) = build(Direction::Vertical);
        tree.set(track, "handle_size", 20.0_f32).unwrap();
        tree.set(track, "value", 0.5_f32).unwrap();

        let grip = handle(&tree, track).unwrap();
        let bounds = tree.outer_bounds(grip);
        assert_relative_eq!(bounds.y, 40.0);
        assert_relative_eq!(bounds.height, 20.0);
        assert_relative_eq!(bounds.width, 10.0);

        tree.set(track, "value", 3.0_f32).unwrap();
        assert_relative_eq!(tree.outer_bounds(grip).y, 80.0);
    }

    #[test]
    fn test_dragging_handle_sets_value() {
        let (mut tree, track) = build(Direction::Vertical);
        tree.set(track, "handle_size", 20.0_f32).unwrap();
        let seen = Rc::new(Cell::new(0.0_f32));
        let sink = Rc::clone(&seen);
        tree.observe::<f32, _>(track, "value", move |_, _, v| {
            sink.set(v);
            Ok(())
        })
        .unwrap();

        let grip = handle(&tree, track).unwrap();
        let mut event = Event::new(EventType::Drag, grip, 0.0).with_arg("drag_delta", EventArg::DragDelta(Vec2::new(0.0, 20.0)));
        tree.dispatch_to(grip, &mut event);

        assert_relative_eq!(seen.get(), 0.25);
        assert_relative_eq!(tree.outer_bounds(grip).y, 20.0);
    }
}
