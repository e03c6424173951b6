//! UI widgets module
//!
//! Build functions for the built-in widgets (panels, labels, buttons, ...).
//! Each is a `FnOnce(&mut Builder) -> UiResult<()>` handed to
//! [`Builder::add`](crate::ui::Builder::add); parameterized widgets are
//! functions returning such a closure.

pub mod core;
pub mod panel;
pub mod text;
pub mod button;
pub mod image;
pub mod scrollbar;
pub mod containers;

// Re-export core types
pub use self::core::{palette, Anchor};

// Re-export widget builders
pub use panel::panel;
pub use text::label;
pub use button::{button, button_state, ButtonColors, ButtonState};
pub use image::image;
pub use scrollbar::scrollbar;
pub use containers::{auto_height, container, flex, grid, list};
pub use crate::ui::mask::mask;
pub use crate::ui::scroll::scroll;
