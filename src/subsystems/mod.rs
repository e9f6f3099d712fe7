//! Vehicle subsystems
//!
//! - `perception`: Steering classifiers (external model, label replay, fixed)

pub mod perception;
