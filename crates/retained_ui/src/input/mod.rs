//! Input handling for the UI: the normalized pointer stream the host feeds in,
//! screen/NDC conversion, ray-vs-rect picking and the pointer state machine.

pub mod picking;
pub mod collision;
pub mod pointer;

pub use picking::Viewport;
pub use pointer::{PointerPhase, PointerProcessor};

use crate::foundation::math::Vec2;

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    /// Left mouse button
    #[default]
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

/// Kind of pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Pointer moved
    Move,
    /// Button pressed
    Down,
    /// Button released
    Up,
    /// Wheel scrolled
    Wheel,
}

/// A normalized pointer event from the host application
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// What happened
    pub kind: PointerEventKind,
    /// Button involved (meaningful for `Down`/`Up`)
    pub button: MouseButton,
    /// Screen position in pixels, top-left origin
    pub position: Vec2,
    /// Wheel delta (meaningful for `Wheel`), positive y scrolls up
    pub scroll_delta: Vec2,
}

impl PointerEvent {
    /// Pointer moved to `position`
    pub fn moved(position: Vec2) -> Self {
        Self { kind: PointerEventKind::Move, button: MouseButton::Left, position, scroll_delta: Vec2::zeros() }
    }

    /// `button` pressed at `position`
    pub fn down(position: Vec2, button: MouseButton) -> Self {
        Self { kind: PointerEventKind::Down, button, position, scroll_delta: Vec2::zeros() }
    }

    /// `button` released at `position`
    pub fn up(position: Vec2, button: MouseButton) -> Self {
        Self { kind: PointerEventKind::Up, button, position, scroll_delta: Vec2::zeros() }
    }

    /// Wheel scrolled by `delta` at `position`
    pub fn wheel(position: Vec2, delta: Vec2) -> Self {
        Self { kind: PointerEventKind::Wheel, button: MouseButton::Middle, position, scroll_delta: delta }
    }
}
