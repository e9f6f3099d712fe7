//! Configuration
//!
//! The car is configured from a single TOML file loaded at startup. There
//! is no runtime parameter protocol; restart to apply changes.

pub mod config;

pub use config::{CarConfig, ClassifierKind, ConfigError, FrameSourceKind};
