//! Device drivers
//!
//! This module contains the camera-side devices: frame sources feeding the
//! control loop and the background recorder.
//!
//! ## Modules
//!
//! - `camera`: Folder and camera frame sources, frame recorder
//! - `traits`: Device trait definitions (FrameSource, Capture)

pub mod camera;
pub mod traits;
