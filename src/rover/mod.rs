//! Vehicle control
//!
//! ## Modules
//!
//! - `control_loop`: Frame -> classification -> steering loop, gated by
//!   the operator run state

pub mod control_loop;

pub use control_loop::{ControlLoop, LoopConfig, LoopStats, TickOutcome};
