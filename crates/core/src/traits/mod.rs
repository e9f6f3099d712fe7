//! Core traits for platform-agnostic control functionality.
//!
//! This module provides trait abstractions that decouple the control logic
//! from platform-specific implementations (std threads, hardware timers).
//!
//! # Design
//!
//! - Trait definitions are pure and have no feature gates
//! - Mock implementations are always available for host testing
//! - Platform implementations live in the host crate

pub mod time;

pub use time::{Delay, MockTime, TimeSource};
