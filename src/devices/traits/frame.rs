//! Frame Source Trait and Data Types
//!
//! Device-independent interface for anything that hands the control loop
//! one image per tick.
//!
//! ## Usage
//!
//! ```ignore
//! use line_trace_car::devices::traits::{FrameError, FrameSource};
//!
//! fn drain<S: FrameSource>(source: &mut S) {
//!     loop {
//!         match source.next_frame() {
//!             Ok(frame) => println!("{}", frame.path.display()),
//!             Err(FrameError::Exhausted) => break,
//!             Err(e) => eprintln!("{e}"),
//!         }
//!     }
//! }
//! ```

use std::path::PathBuf;

/// Frame source errors
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// No more frames will ever arrive (folder drained)
    #[error("frame source exhausted")]
    Exhausted,

    /// No new frame yet; try again next tick (watch mode)
    #[error("no new frame yet")]
    NotReady,

    /// The device could not deliver a frame (camera read failure)
    #[error("frame source unavailable: {0}")]
    Unavailable(String),

    /// Filesystem error while reading or staging a frame
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameError {
    /// Whether the error ends the current run
    pub fn is_fatal(&self) -> bool {
        !matches!(self, FrameError::NotReady)
    }
}

/// One encoded image on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Sequence number within the source, starting at 0
    pub index: u64,
    /// Location of the encoded image
    pub path: PathBuf,
}

impl Frame {
    pub fn new(index: u64, path: impl Into<PathBuf>) -> Self {
        Self {
            index,
            path: path.into(),
        }
    }

    /// File name component, used as the lookup key for recorded labels
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }
}

/// Source of frames for the control loop
pub trait FrameSource {
    /// Next frame
    ///
    /// # Errors
    ///
    /// - `FrameError::Exhausted`: source drained, no further frames
    /// - `FrameError::NotReady`: nothing new yet, not fatal
    /// - `FrameError::Unavailable` / `FrameError::Io`: device failure
    fn next_frame(&mut self) -> Result<Frame, FrameError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Frame, FrameError> {
        (**self).next_frame()
    }
}

/// Still-image capture device producing encoded (JPEG) bytes
pub trait Capture {
    fn capture(&mut self) -> Result<Vec<u8>, FrameError>;
}
