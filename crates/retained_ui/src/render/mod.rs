//! # Renderer Collaborator
//!
//! The UI core does not draw. It extracts a flat, ordered list of
//! [`RenderItem`]s (transform, size, paint order, color/texture/text payload
//! and stencil operation) and hands it to whatever backend the host provides.
//!
//! ## Architecture
//!
//! - **Commands**: render items and the stencil model used for clipping
//! - **Camera**: screen-point to world-ray conversion and projection
//! - **Backend**: the trait a host renderer implements

pub mod commands;
pub mod camera;
pub mod backend;

pub use commands::{RenderItem, StencilFunc, StencilOp, StencilState};
pub use camera::{OrthoCamera, PerspectiveCamera, UiCamera};
pub use backend::{RecordingBackend, UiRenderBackend};
