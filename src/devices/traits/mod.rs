//! Device trait definitions
//!
//! - `frame`: Frame sources and capture devices

pub mod frame;

pub use frame::{Capture, Frame, FrameError, FrameSource};
