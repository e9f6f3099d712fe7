//! Run State Machine Types
//!
//! This module provides pure types for the operator-driven run state
//! machine. The listener thread and control loop that use them live in
//! the host crate.
//!
//! # Contents
//!
//! - `RunState` and its transition function
//! - `OperatorCommand` parsing from single-character keys
//! - `SharedRunState`, the atomically read cell shared between threads

mod shared;
mod state;

pub use shared::SharedRunState;
pub use state::{OperatorCommand, RunState, ServoPreset};
