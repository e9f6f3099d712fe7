//! Camera-side frame handling
//!
//! - `folder`: replay images from a directory
//! - `source`: live capture through an external still command
//! - `recorder`: background thread saving stills for training data

pub mod folder;
pub mod recorder;
pub mod source;

pub use folder::FolderSource;
pub use recorder::FrameRecorder;
pub use source::{CameraSource, CommandCapture};
