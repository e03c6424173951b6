//! # Core Module
//!
//! Shared configuration used by every UI subsystem.
//!
//! ## Organization
//!
//! - **Config**: UI tunables loaded from TOML/RON

pub mod config;

pub use config::{UiConfig, Config, ConfigError};
