//! Crate-level error type

use crate::config::ConfigError;
use crate::foundation::collections::NodeId;
use crate::ui::layout::LayoutError;
use crate::ui::property::PropertyError;
use thiserror::Error;

/// UI system errors
#[derive(Error, Debug)]
pub enum UiError {
    /// Property registration or conversion failed
    #[error("Property error: {0}")]
    Property(#[from] PropertyError),

    /// Layout strategy was configured with invalid arguments
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A node handle no longer refers to a live node
    #[error("Node {0:?} does not exist")]
    NodeNotFound(NodeId),

    /// A widget build function did not produce a root node
    #[error("Build error: {0}")]
    Build(String),

    /// An external resource (font, texture) failed to load
    #[error("Failed to load resource '{path}': {reason}")]
    ResourceLoad {
        /// Resource path or key
        path: String,
        /// Loader-provided reason
        reason: String,
    },

    /// The camera could not produce a pick ray
    #[error("Camera error: {0}")]
    Camera(String),

    /// An event handler reported a failure
    #[error("Handler error: {0}")]
    Handler(String),

    /// The render backend reported a failure
    #[error("Render error: {0}")]
    Render(String),
}

/// Convenience result alias
pub type UiResult<T> = Result<T, UiError>;
