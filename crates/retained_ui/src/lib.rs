//! # Retained UI
//!
//! A retained-mode UI layout and interaction engine: a tree of rectangular
//! widgets placed in 3-D space through anchor/pivot/margin arithmetic, laid
//! out by pluggable strategies, clipped with stencil masks and driven by a
//! ray-cast pointer pipeline with enter/leave, click and drag semantics.
//!
//! ## Features
//!
//! - **Rect transforms**: anchors, pivots, margins and borders per axis
//! - **Property observers**: named, type-checked setters on every node
//! - **Layouts**: list, flex, grid and auto-height strategies
//! - **Clipping and scrolling**: nested stencil masks, damped scroll views
//! - **Pointer pipeline**: hover diffing, bubbling, drag threshold
//! - **Builder DSL**: scoped property inheritance and property forwarding
//!
//! The crate does not draw. Each frame it hands an ordered list of
//! [`render::RenderItem`]s to a host-provided [`render::UiRenderBackend`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use retained_ui::prelude::*;
//!
//! fn main() -> Result<(), UiError> {
//!     let mut ui = UIManager::new(UiConfig::default())?;
//!     let root = ui.build_root(panel)?;
//!     ui.tree_mut().set(root, "size", Vec2::new(200.0, 100.0))?;
//!
//!     let mut b = ui.builder_at(root)?;
//!     b.add(label("Hello"))?;
//!
//!     ui.push_pointer_event(PointerEvent::moved(Vec2::new(10.0, 10.0)));
//!     ui.update(1.0 / 60.0);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod core;
pub mod error;
pub mod events;
pub mod foundation;
pub mod input;
pub mod render;
pub mod ui;

pub use error::{UiError, UiResult};

/// Common imports for UI users
pub mod prelude {
    pub use crate::{
        core::{Config, UiConfig},
        error::{UiError, UiResult},
        events::{Event, EventType},
        foundation::{
            collections::NodeId,
            math::{Vec2, Vec3, Vec4},
        },
        input::{MouseButton, PointerEvent},
        render::{RecordingBackend, RenderItem, UiRenderBackend},
        ui::{
            layout::Direction,
            widgets::{auto_height, button, container, flex, grid, image, label, list, mask, panel, scroll, scrollbar, Anchor},
            Builder, ForwardProp, UIManager, UiContext, UiTree,
        },
    };
}
