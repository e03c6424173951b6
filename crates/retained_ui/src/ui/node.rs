//! The node record stored in the UI arena.

use crate::error::UiError;
use crate::events::EventBus;
use crate::foundation::collections::NodeId;
use crate::foundation::math::Vec4;
use crate::render::commands::StencilState;
use crate::ui::context::TextureHandle;
use crate::ui::layout::Layouter;
use crate::ui::property::PropertyObserver;
use crate::ui::rect_transform::RectTransform;
use crate::ui::tree::UiTree;
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Per-node behaviour switches
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u8 {
        /// The node accepts drag gestures started on it or its descendants
        const DRAG_EVENTS = 1 << 0;
        /// The node and its subtree are ignored by hit testing
        const RAYCAST_DISABLED = 1 << 1;
        /// The node clips hit testing and painting of its subtree to its rect
        const MASKED = 1 << 2;
        /// The node and its subtree are neither painted nor hit
        const HIDDEN = 1 << 3;
    }
}

/// Per-tick callback: `(tree, node, dt)`.
pub type UpdateFn = Box<dyn FnMut(&mut UiTree, NodeId, f32) -> Result<(), UiError>>;

/// What a node contributes to the paint list.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    /// RGBA fill color
    pub color: Vec4,
    /// Optional texture drawn over the rect
    pub texture: Option<TextureHandle>,
    /// Optional text run
    pub text: Option<String>,
    /// Font size for `text`
    pub font_size: f32,
    /// Explicit stencil operation (mask sentinels); `None` uses the clip depth
    pub stencil: Option<StencilState>,
}

impl Paint {
    /// Solid color fill
    pub fn solid(color: Vec4) -> Self {
        Self { color, texture: None, text: None, font_size: 0.0, stencil: None }
    }

    /// Text run drawn in `color`
    pub fn text(text: impl Into<String>, font_size: f32, color: Vec4) -> Self {
        Self { color, texture: None, text: Some(text.into()), font_size, stencil: None }
    }
}

impl Default for Paint {
    fn default() -> Self {
        Self::solid(Vec4::new(1.0, 1.0, 1.0, 1.0))
    }
}

/// A widget in the arena.
///
/// Nodes are owned exclusively by their parent's child list; `parent` and
/// `client_area` are plain handles used only for lookup.
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) transform: RectTransform,
    pub(crate) observer: PropertyObserver,
    pub(crate) events: EventBus,
    pub(crate) client_area: Option<NodeId>,
    pub(crate) layouter: Option<Box<dyn Layouter>>,
    pub(crate) update_handlers: Vec<UpdateFn>,
    pub(crate) late_update_handlers: Vec<UpdateFn>,
    pub(crate) flags: NodeFlags,
    pub(crate) attached: bool,
    pub(crate) clip_depth: u32,
    pub(crate) paint: Option<Paint>,
    pub(crate) name: Option<String>,
}

impl Node {
    pub(crate) fn new() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            transform: RectTransform::default(),
            observer: PropertyObserver::new(),
            events: EventBus::new(),
            client_area: None,
            layouter: None,
            update_handlers: Vec::new(),
            late_update_handlers: Vec::new(),
            flags: NodeFlags::empty(),
            attached: false,
            clip_depth: 0,
            paint: None,
            name: None,
        }
    }

    /// Parent handle, `None` for roots and detached nodes
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in paint order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Placement and sizing
    pub fn transform(&self) -> &RectTransform {
        &self.transform
    }

    /// Behaviour flags
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// Whether the node has been inserted into a live root
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Number of enclosing masks seen by the last update
    pub fn clip_depth(&self) -> u32 {
        self.clip_depth
    }

    /// Paint payload, if the node draws anything
    pub fn paint(&self) -> Option<&Paint> {
        self.paint.as_ref()
    }

    /// Debug name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Property table
    pub fn observer(&self) -> &PropertyObserver {
        &self.observer
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("transform", &self.transform)
            .field("client_area", &self.client_area)
            .field("layouter", &self.layouter)
            .field("update_handlers", &self.update_handlers.len())
            .field("late_update_handlers", &self.late_update_handlers.len())
            .field("flags", &self.flags)
            .field("attached", &self.attached)
            .field("clip_depth", &self.clip_depth)
            .field("paint", &self.paint)
            .finish_non_exhaustive()
    }
}
