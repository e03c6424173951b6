//! Scrolling viewport: a mask, a moving container and one scrollbar per axis.
//!
//! The container's position along an axis is the scroll offset. It is zero
//! when the first child is at the top/left edge and negative as content moves
//! up/left, bounded by `content - child_max` where `content` is the visible
//! extent and `child_max` the far edge of the container's children.
//!
//! Each tick, once the scrolled content has been laid out, integrates wheel
//! velocity, damps it exponentially and publishes the offset to the
//! scrollbar as `value = offset / (content - child_max)`.
//! Setting a scrollbar's `value` writes the offset back, so dragging a handle
//! scrolls the view. Axes whose content fits hide their scrollbar and reset
//! the offset.

use crate::error::{UiError, UiResult};
use crate::events::EventType;
use crate::foundation::collections::NodeId;
use crate::foundation::math::{utils, Vec2, Vec4};
use crate::ui::builder::Builder;
use crate::ui::layout::Direction;
use crate::ui::mask;
use crate::ui::node::NodeFlags;
use crate::ui::tree::UiTree;
use crate::ui::widgets::scrollbar::scrollbar;
use std::cell::RefCell;
use std::rc::Rc;

/// Handles to the parts of a scroll view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollParts {
    /// Clip region
    pub mask: NodeId,
    /// Moving container holding the scrolled children
    pub container: NodeId,
    /// Horizontal scrollbar
    pub hbar: NodeId,
    /// Vertical scrollbar
    pub vbar: NodeId,
}

impl ScrollParts {
    /// Scrollbar for `axis` (0 = x, 1 = y)
    pub fn bar(&self, axis: usize) -> NodeId {
        if axis == 0 { self.hbar } else { self.vbar }
    }
}

/// Find the parts of a scroll view built by [`scroll`]
pub fn parts(tree: &UiTree, scroll: NodeId) -> Option<ScrollParts> {
    let [view, vbar, hbar] = *tree.children(scroll) else {
        return None;
    };
    let container = mask::parts(tree, view)?.client;
    Some(ScrollParts { mask: view, container, hbar, vbar })
}

#[derive(Debug)]
struct ScrollState {
    velocity: Vec2,
    wheel_speed: f32,
    damping: f32,
}

type SharedState = Rc<RefCell<ScrollState>>;

/// Extents along one axis
#[derive(Debug, Clone, Copy, PartialEq)]
struct Extent {
    content: f32,
    child_max: f32,
}

impl Extent {
    fn overflows(self) -> bool {
        self.content < self.child_max
    }

    /// Most negative offset
    fn range(self) -> f32 {
        self.content - self.child_max
    }
}

fn extent(tree: &UiTree, parts: &ScrollParts, axis: usize) -> Extent {
    let content = tree.content_size(parts.mask)[axis];
    let child_max = tree
        .children(parts.container)
        .iter()
        .map(|child| {
            let bounds = tree.outer_bounds(*child);
            if axis == 0 { bounds.right() } else { bounds.bottom() }
        })
        .fold(0.0_f32, f32::max);
    Extent { content, child_max }
}

/// Current scroll offset (container position) of a scroll view
pub fn offset(tree: &UiTree, scroll: NodeId) -> Vec2 {
    parts(tree, scroll)
        .and_then(|p| tree.transform(p.container))
        .map_or_else(Vec2::zeros, |t| t.position.xy())
}

fn set_offset(tree: &mut UiTree, container: NodeId, axis: usize, value: f32) -> UiResult<()> {
    tree.transform_mut(container)?.position[axis] = value;
    Ok(())
}

fn tick(tree: &mut UiTree, scroll: NodeId, dt: f32, state: &SharedState) -> UiResult<()> {
    let parts = parts(tree, scroll).ok_or_else(|| UiError::Build(format!("{scroll:?} is not a scroll view")))?;
    for axis in 0..2 {
        let extent = extent(tree, &parts, axis);
        let bar = parts.bar(axis);

        if !extent.overflows() {
            state.borrow_mut().velocity[axis] = 0.0;
            set_offset(tree, parts.container, axis, 0.0)?;
            tree.set(bar, "visible", false)?;
            continue;
        }

        let velocity = {
            let mut state = state.borrow_mut();
            let velocity = state.velocity[axis];
            let t = (dt * state.damping).min(1.0);
            state.velocity[axis] = utils::lerp(velocity, 0.0, t);
            velocity
        };
        let current = tree.transform(parts.container).map_or(0.0, |t| t.position[axis]);
        let range = extent.range();
        let next = utils::clamp(current + velocity * dt, range, 0.0);
        if next <= range || next >= 0.0 {
            state.borrow_mut().velocity[axis] = 0.0;
        }
        set_offset(tree, parts.container, axis, next)?;

        tree.set(bar, "visible", true)?;
        tree.set(bar, "handle_size", extent.content * (extent.content / extent.child_max))?;
        tree.set(bar, "value", next / range)?;
    }
    Ok(())
}

fn on_wheel(tree: &mut UiTree, scroll: NodeId, delta: Vec2, state: &SharedState) -> bool {
    let Some(parts) = parts(tree, scroll) else {
        return false;
    };
    let current = tree.transform(parts.container).map_or_else(Vec2::zeros, |t| t.position.xy());
    let mut consumed = false;
    for axis in 0..2 {
        let extent = extent(tree, &parts, axis);
        let d = delta[axis];
        if d == 0.0 || !extent.overflows() {
            continue;
        }
        let at_extreme = (d > 0.0 && current[axis] >= 0.0) || (d < 0.0 && current[axis] <= extent.range());
        if at_extreme {
            continue;
        }
        let mut state = state.borrow_mut();
        let speed = state.wheel_speed;
        state.velocity[axis] += d * speed;
        consumed = true;
    }
    consumed
}

fn on_drag(tree: &mut UiTree, scroll: NodeId, delta: Vec2, state: &SharedState) -> UiResult<()> {
    let Some(parts) = parts(tree, scroll) else {
        return Ok(());
    };
    state.borrow_mut().velocity = Vec2::zeros();
    for axis in 0..2 {
        let extent = extent(tree, &parts, axis);
        if !extent.overflows() {
            continue;
        }
        let current = tree.transform(parts.container).map_or(0.0, |t| t.position[axis]);
        set_offset(tree, parts.container, axis, utils::clamp(current + delta[axis], extent.range(), 0.0))?;
    }
    Ok(())
}

/// A scrolling viewport. Children added to it land in the moving container.
///
/// Wheel input over the view is consumed (propagation stopped) unless the
/// view is already at the end it would scroll towards. Dragging the content
/// or a scrollbar handle scrolls directly.
pub fn scroll(b: &mut Builder<'_>) -> UiResult<()> {
    let config = b.context().config();
    let thickness = config.scrollbar_thickness;
    let state: SharedState = Rc::new(RefCell::new(ScrollState {
        velocity: Vec2::zeros(),
        wheel_speed: config.wheel_speed,
        damping: config.scroll_damping,
    }));

    let id = b.set_root_named("scroll")?;

    b.use_prop("anchor", Vec4::new(0.0, 0.0, 1.0, 1.0))
        .use_prop("margin", Vec4::new(0.0, 0.0, thickness, thickness));
    let view = b.add(mask::mask)?;

    b.use_prop("anchor", Vec4::new(1.0, 0.0, 1.0, 1.0))
        .use_prop("pivot", Vec2::new(1.0, 0.0))
        .use_prop("size", Vec2::new(thickness, 0.0))
        .use_prop("margin", Vec4::new(0.0, 0.0, 0.0, thickness));
    let vbar = b.add(scrollbar(Direction::Vertical))?;

    b.use_prop("anchor", Vec4::new(0.0, 1.0, 1.0, 1.0))
        .use_prop("pivot", Vec2::new(0.0, 1.0))
        .use_prop("size", Vec2::new(0.0, thickness))
        .use_prop("margin", Vec4::new(0.0, 0.0, thickness, 0.0));
    let hbar = b.add(scrollbar(Direction::Horizontal))?;

    let tree = b.tree_mut();
    let container = mask::parts(tree, view)
        .ok_or_else(|| UiError::Build("scroll mask has no client".to_string()))?
        .client;
    tree.set_flag(container, NodeFlags::DRAG_EVENTS, true)?;
    tree.set_client_area(id, container)?;

    for (axis, bar) in [(0, hbar), (1, vbar)] {
        tree.observe::<f32, _>(bar, "value", move |tree, _bar, value| {
            let Some(parts) = parts(tree, id) else {
                return Ok(());
            };
            let extent = extent(tree, &parts, axis);
            let offset = if extent.overflows() { utils::clamp(value, 0.0, 1.0) * extent.range() } else { 0.0 };
            set_offset(tree, parts.container, axis, offset)
        })?;
    }

    let on_tick = Rc::clone(&state);
    tree.on_late_update(id, move |tree, id, dt| tick(tree, id, dt, &on_tick))?;

    let wheel = Rc::clone(&state);
    tree.on(id, EventType::PointerWheel, move |tree, event| {
        let delta = event.scroll_delta().unwrap_or_else(Vec2::zeros);
        if on_wheel(tree, id, delta, &wheel) {
            log::trace!("Scroll {:?} consumed wheel {:?}", id, delta);
            event.stop_propagation();
        }
        Ok(())
    })?;

    let begin = Rc::clone(&state);
    tree.on(container, EventType::DragBegin, move |_tree, _event| {
        begin.borrow_mut().velocity = Vec2::zeros();
        Ok(())
    })?;
    tree.on(container, EventType::Drag, move |tree, event| {
        let delta = event.drag_delta().unwrap_or_else(Vec2::zeros);
        on_drag(tree, id, delta, &state)
    })
}
