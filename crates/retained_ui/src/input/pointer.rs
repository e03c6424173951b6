//! Pointer state machine
//!
//! Turns the raw pointer stream into node events: hover enter/leave diffing,
//! press/release with click detection, threshold-based drag recognition and
//! wheel delivery. The processor owns no nodes; it keeps handles and checks
//! they are still alive before using them.

use crate::error::UiResult;
use crate::events::{Event, EventArg, EventType};
use crate::foundation::collections::NodeId;
use crate::foundation::math::Vec2;
use crate::input::{MouseButton, PointerEvent, PointerEventKind, Viewport};
use crate::render::camera::UiCamera;
use crate::ui::node::NodeFlags;
use crate::ui::tree::{Hit, UiTree};

/// Coarse pointer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    /// No button held on a node
    Idle,
    /// Button held on a node, below the drag threshold
    Pressed,
    /// A drag gesture is being delivered
    Dragging,
}

/// Per-pointer interaction state
#[derive(Debug, Clone)]
pub struct PointerProcessor {
    /// Hovered node followed by the ancestors that received `PointerEnter`
    hover_path: Vec<NodeId>,
    pressed: Option<NodeId>,
    dragging: Option<NodeId>,
    button: MouseButton,
    press_position: Vec2,
    last_position: Vec2,
    drag_threshold: f32,
}

impl PointerProcessor {
    /// Create a processor with the given drag threshold (UI units, per axis)
    pub fn new(drag_threshold: f32) -> Self {
        Self {
            hover_path: Vec::new(),
            pressed: None,
            dragging: None,
            button: MouseButton::Left,
            press_position: Vec2::zeros(),
            last_position: Vec2::zeros(),
            drag_threshold,
        }
    }

    /// Current phase
    pub fn phase(&self) -> PointerPhase {
        if self.dragging.is_some() {
            PointerPhase::Dragging
        } else if self.pressed.is_some() {
            PointerPhase::Pressed
        } else {
            PointerPhase::Idle
        }
    }

    /// Node currently under the pointer
    pub fn hovered(&self) -> Option<NodeId> {
        self.hover_path.first().copied()
    }

    /// Node the held button went down on
    pub fn pressed(&self) -> Option<NodeId> {
        self.pressed
    }

    /// Node receiving drag events
    pub fn dragging(&self) -> Option<NodeId> {
        self.dragging
    }

    /// Drag threshold
    pub fn drag_threshold(&self) -> f32 {
        self.drag_threshold
    }

    /// Change the drag threshold
    pub fn set_drag_threshold(&mut self, threshold: f32) {
        self.drag_threshold = threshold;
    }

    /// Hit-test `event` through `camera` and process it.
    pub fn process(
        &mut self,
        tree: &mut UiTree,
        camera: &dyn UiCamera,
        viewport: &Viewport,
        event: &PointerEvent,
        timestamp: f64,
    ) -> UiResult<()> {
        let ray = camera.screen_to_ray(event.position, viewport)?;
        let hit = tree.hit_test(&ray);
        self.process_hit(tree, event, hit, timestamp);
        Ok(())
    }

    /// Process `event` given an already computed hit.
    pub fn process_hit(&mut self, tree: &mut UiTree, event: &PointerEvent, hit: Option<Hit>, timestamp: f64) {
        self.forget_dead_nodes(tree);
        let ctx = EventContext { event, hit, timestamp };
        self.update_hover(tree, &ctx);

        match event.kind {
            PointerEventKind::Move => self.on_move(tree, &ctx),
            PointerEventKind::Down => self.on_down(tree, &ctx),
            PointerEventKind::Up => self.on_up(tree, &ctx),
            PointerEventKind::Wheel => self.on_wheel(tree, &ctx),
        }
    }

    /// Removal is recursive, so dead hover entries are always a leading run
    /// of the path and the entered ancestors that survive stay entered.
    fn forget_dead_nodes(&mut self, tree: &UiTree) {
        self.hover_path.retain(|id| tree.contains(*id));
        for slot in [&mut self.pressed, &mut self.dragging] {
            if slot.is_some_and(|id| !tree.contains(id)) {
                *slot = None;
            }
        }
    }

    fn update_hover(&mut self, tree: &mut UiTree, ctx: &EventContext<'_>) {
        let new = ctx.hit.map(|h| h.node).filter(|id| tree.contains(*id));
        if self.hovered() == new {
            return;
        }

        let old_path = std::mem::take(&mut self.hover_path);
        let new_path = new.map(|id| tree.ancestors(id)).unwrap_or_default();
        let common = new_path.iter().copied().find(|id| old_path.contains(id));
        log::trace!("Hover {:?} -> {:?} (common {:?})", old_path.first(), new, common);

        if let Some(&first) = old_path.first() {
            let mut leave = ctx.make(EventType::PointerLeave, first);
            deliver_along(tree, below(&old_path, common), &mut leave);
        }
        if let Some(&first) = new_path.first() {
            let mut enter = ctx.make(EventType::PointerEnter, first);
            deliver_along(tree, below(&new_path, common), &mut enter);
        }
        self.hover_path = new_path;
    }

    fn on_down(&mut self, tree: &mut UiTree, ctx: &EventContext<'_>) {
        // A second button going down ends the running gesture.
        self.end_drag(tree, ctx);
        self.button = ctx.event.button;
        self.press_position = ctx.event.position;
        self.last_position = ctx.event.position;
        self.pressed = ctx.hit.map(|h| h.node);

        if let Some(pressed) = self.pressed {
            let mut down = ctx.make(EventType::PointerDown, pressed);
            tree.bubble(pressed, &mut down, None);
        }
    }

    fn on_move(&mut self, tree: &mut UiTree, ctx: &EventContext<'_>) {
        let position = ctx.event.position;

        if let Some(dragging) = self.dragging {
            let mut drag = ctx
                .make(EventType::Drag, dragging)
                .with_arg("drag_delta", EventArg::DragDelta(position - self.last_position));
            tree.bubble(dragging, &mut drag, None);
        } else if let Some(pressed) = self.pressed {
            let displacement = position - self.press_position;
            if displacement.x.abs() > self.drag_threshold || displacement.y.abs() > self.drag_threshold {
                self.begin_drag(tree, ctx, pressed, displacement);
            }
        }
        self.last_position = position;
    }

    fn begin_drag(&mut self, tree: &mut UiTree, ctx: &EventContext<'_>, pressed: NodeId, displacement: Vec2) {
        let target = tree
            .ancestors(pressed)
            .into_iter()
            .find(|id| tree.flags(*id).contains(NodeFlags::DRAG_EVENTS));
        let Some(target) = target else {
            return;
        };

        log::debug!("Drag begins on {:?} (pressed {:?})", target, pressed);
        self.dragging = Some(target);
        let mut begin = ctx
            .make(EventType::DragBegin, target)
            .with_arg("drag_delta", EventArg::DragDelta(displacement));
        tree.bubble(target, &mut begin, None);
    }

    fn on_up(&mut self, tree: &mut UiTree, ctx: &EventContext<'_>) {
        let pressed = self.pressed.take();

        if let Some(pressed) = pressed {
            let mut up = ctx.make(EventType::PointerUp, pressed);
            tree.bubble(pressed, &mut up, None);
        }

        if self.end_drag(tree, ctx) {
            return;
        }

        let released_over = ctx.hit.map(|h| h.node);
        if let (Some(pressed), Some(over)) = (pressed, released_over) {
            if tree.contains(pressed) && tree.is_ancestor_or_self(pressed, over) {
                let mut click = ctx.make(EventType::Click, pressed);
                tree.bubble(pressed, &mut click, None);
            }
        }
    }

    /// Send `DragEnd` to the running drag target, if any. Returns whether a
    /// drag was running.
    fn end_drag(&mut self, tree: &mut UiTree, ctx: &EventContext<'_>) -> bool {
        let Some(dragging) = self.dragging.take() else {
            return false;
        };
        if tree.contains(dragging) {
            let mut end = ctx
                .make(EventType::DragEnd, dragging)
                .with_arg("drag_delta", EventArg::DragDelta(ctx.event.position - self.press_position));
            tree.bubble(dragging, &mut end, None);
        }
        true
    }

    fn on_wheel(&mut self, tree: &mut UiTree, ctx: &EventContext<'_>) {
        if let Some(hovered) = self.hovered().filter(|id| tree.contains(*id)) {
            let mut wheel = ctx
                .make(EventType::PointerWheel, hovered)
                .with_arg("scroll_delta", EventArg::ScrollDelta(ctx.event.scroll_delta));
            tree.bubble(hovered, &mut wheel, None);
        }
    }
}

impl Default for PointerProcessor {
    fn default() -> Self {
        Self::new(5.0)
    }
}

/// The part of a leaf-to-root `path` strictly below `common`
fn below(path: &[NodeId], common: Option<NodeId>) -> &[NodeId] {
    let end = common.and_then(|c| path.iter().position(|id| *id == c)).unwrap_or(path.len());
    &path[..end]
}

/// Dispatch `event` to each node of `path` in order until a handler stops it.
fn deliver_along(tree: &mut UiTree, path: &[NodeId], event: &mut Event) {
    for &id in path {
        if !tree.contains(id) {
            continue;
        }
        tree.dispatch_to(id, event);
        if event.is_propagation_stopped() {
            break;
        }
    }
}

struct EventContext<'a> {
    event: &'a PointerEvent,
    hit: Option<Hit>,
    timestamp: f64,
}

impl EventContext<'_> {
    fn make(&self, event_type: EventType, target: NodeId) -> Event {
        let mut event = Event::new(event_type, target, self.timestamp)
            .with_arg("position", EventArg::Position(self.event.position))
            .with_arg("button", EventArg::Button(self.event.button));
        if let Some(hit) = self.hit {
            event = event.with_arg("world_point", EventArg::WorldPoint(hit.world_point));
        }
        event
    }
}
