//! UI event types and per-node handler registry.
//! Key principles:
//! - Key-value arguments (no order dependency)
//! - Registration per event type (only notify interested handlers)
//! - Upward delivery (bubbling) that any handler may stop
//! - A failing handler never blocks its siblings

use crate::error::UiError;
use crate::foundation::collections::NodeId;
use crate::foundation::math::{Vec2, Vec3};
use crate::input::MouseButton;
use crate::ui::tree::UiTree;
use std::collections::HashMap;

/// Event type identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Pointer moved onto the node or one of its descendants
    PointerEnter,
    /// Pointer moved off the node and all of its descendants
    PointerLeave,
    /// Button pressed over the node
    PointerDown,
    /// Button released after a press that started on the node
    PointerUp,
    /// Scroll wheel moved over the node
    PointerWheel,
    /// Press and release on the same node without a drag
    Click,
    /// Displacement crossed the drag threshold
    DragBegin,
    /// Pointer moved while dragging
    Drag,
    /// Button released while dragging
    DragEnd,
}

impl EventType {
    /// Whether the event walks up the ancestor chain after the target.
    pub fn bubbles(self) -> bool {
        !matches!(self, Self::DragBegin | Self::Drag | Self::DragEnd)
    }
}

/// Variant for type-safe event arguments
/// Uses key-value pairs to avoid order dependency problems
#[derive(Debug, Clone, PartialEq)]
pub enum EventArg {
    /// Screen-space pointer position
    Position(Vec2),
    /// Pointer button
    Button(MouseButton),
    /// Wheel delta (x, y)
    ScrollDelta(Vec2),
    /// Screen-space movement since the previous drag event
    DragDelta(Vec2),
    /// World-space point where the pick ray hit the target
    WorldPoint(Vec3),
}

/// A UI event delivered to node handlers
#[derive(Debug, Clone)]
pub struct Event {
    /// Type of event
    pub event_type: EventType,
    /// Timestamp when event was created (seconds)
    pub timestamp: f64,
    /// Node the event originated at
    pub target: NodeId,
    /// Node whose handlers are currently running
    pub current: NodeId,
    args: HashMap<&'static str, EventArg>,
    propagation_stopped: bool,
}

impl Event {
    /// Create a new event with the given type, origin node and timestamp
    pub fn new(event_type: EventType, target: NodeId, timestamp: f64) -> Self {
        Self {
            event_type,
            timestamp,
            target,
            current: target,
            args: HashMap::new(),
            propagation_stopped: false,
        }
    }

    /// Add an argument to the event (builder pattern)
    pub fn with_arg(mut self, key: &'static str, value: EventArg) -> Self {
        self.args.insert(key, value);
        self
    }

    /// Get an argument by key
    pub fn get_arg(&self, key: &str) -> Option<&EventArg> {
        self.args.get(key)
    }

    /// Get position argument if present
    pub fn position(&self) -> Option<Vec2> {
        if let Some(EventArg::Position(p)) = self.get_arg("position") {
            Some(*p)
        } else {
            None
        }
    }

    /// Get button argument if present
    pub fn button(&self) -> Option<MouseButton> {
        if let Some(EventArg::Button(b)) = self.get_arg("button") {
            Some(*b)
        } else {
            None
        }
    }

    /// Get scroll delta argument if present
    pub fn scroll_delta(&self) -> Option<Vec2> {
        if let Some(EventArg::ScrollDelta(d)) = self.get_arg("scroll_delta") {
            Some(*d)
        } else {
            None
        }
    }

    /// Get drag delta argument if present
    pub fn drag_delta(&self) -> Option<Vec2> {
        if let Some(EventArg::DragDelta(d)) = self.get_arg("drag_delta") {
            Some(*d)
        } else {
            None
        }
    }

    /// Get world hit point argument if present
    pub fn world_point(&self) -> Option<Vec3> {
        if let Some(EventArg::WorldPoint(p)) = self.get_arg("world_point") {
            Some(*p)
        } else {
            None
        }
    }

    /// Halt delivery to further ancestors of this dispatch
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Whether a handler stopped propagation
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Event handler trait
///
/// Handlers get mutable access to the tree so they may restyle, add or remove
/// nodes. Call [`Event::stop_propagation`] to keep ancestors from seeing the
/// event; return `Err` to report a failure (it is logged and delivery to the
/// remaining handlers continues).
pub trait EventHandler {
    /// Handle an event
    fn on_event(&mut self, tree: &mut UiTree, event: &mut Event) -> Result<(), UiError>;
}

impl<F> EventHandler for F
where
    F: FnMut(&mut UiTree, &mut Event) -> Result<(), UiError>,
{
    fn on_event(&mut self, tree: &mut UiTree, event: &mut Event) -> Result<(), UiError> {
        self(tree, event)
    }
}

/// Box a closure as an [`EventHandler`], letting the compiler infer its signature.
pub fn handler<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&mut UiTree, &mut Event) -> Result<(), UiError> + 'static,
{
    Box::new(f)
}

/// Per-node handler registry
#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<EventType, Vec<Box<dyn EventHandler>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: Vec<_> = self.handlers.iter().map(|(t, h)| (*t, h.len())).collect();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}

impl EventBus {
    /// Create a new empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a specific event type
    pub fn register_handler(&mut self, event_type: EventType, handler: Box<dyn EventHandler>) {
        self.handlers
            .entry(event_type)
            .or_default()
            .push(handler);
    }

    /// Whether any handler listens for `event_type`
    pub fn has_handlers(&self, event_type: EventType) -> bool {
        self.handlers.get(&event_type).is_some_and(|h| !h.is_empty())
    }

    /// Detach the handlers for `event_type` so they can run against the tree
    pub(crate) fn take(&mut self, event_type: EventType) -> Vec<Box<dyn EventHandler>> {
        self.handlers.get_mut(&event_type).map(std::mem::take).unwrap_or_default()
    }

    /// Reattach handlers detached by [`Self::take`], ahead of any new ones
    pub(crate) fn restore(&mut self, event_type: EventType, mut handlers: Vec<Box<dyn EventHandler>>) {
        let slot = self.handlers.entry(event_type).or_default();
        handlers.append(slot);
        *slot = handlers;
    }
}
