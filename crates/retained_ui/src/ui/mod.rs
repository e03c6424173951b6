//! UI System Module
//!
//! Architecture:
//! - `rect_transform`: per-node placement and rect sizing
//! - `property`: named, type-checked property observers
//! - `node` / `tree`: the widget arena, update tick, hit testing and events
//! - `layout`: list, flex, grid and auto-height strategies
//! - `mask` / `scroll`: stencil clipping and scroll views
//! - `builder`: the tree-building DSL
//! - `context` / `manager`: explicit shared state and the per-frame driver
//! - `widgets/`: built-in widget build functions

pub mod rect_transform;
pub mod property;
pub mod node;
pub mod tree;
pub mod layout;
pub mod mask;
pub mod scroll;
pub mod builder;
pub mod context;
pub mod manager;
pub mod widgets;

#[cfg(test)]
mod tests;

pub use builder::{Builder, ForwardProp, PropValue, PropertyScope};
pub use context::{FontHandle, ResourceLoader, TextureHandle, TextureInfo, UiContext, UiNotification};
pub use layout::{AutoHeight, Direction, Flex, Grid, LayoutChain, LayoutError, LayoutFrame, Layouter, List};
pub use manager::UIManager;
pub use node::{Node, NodeFlags, Paint};
pub use property::{PropertyError, PropertyKind, PropertyObserver, PropertyType, PropertyValue};
pub use rect_transform::{HasRect, Rect, RectTransform};
pub use tree::{Hit, UiTree};
