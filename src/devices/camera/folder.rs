//! Folder frame source
//!
//! Replays images from a directory in file-name order. In watch mode new
//! files dropped into the directory are picked up as they appear.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::devices::traits::{Frame, FrameError, FrameSource};

/// Image extensions accepted as frames (case-insensitive)
pub const FRAME_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Images in a directory, each yielded once
#[derive(Debug)]
pub struct FolderSource {
    dir: PathBuf,
    pending: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
    next_index: u64,
    watch: Option<Duration>,
}

impl FolderSource {
    /// Open a directory; its current images are queued immediately
    ///
    /// # Errors
    ///
    /// Returns `FrameError::Io` if the directory cannot be read.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, FrameError> {
        let mut source = Self {
            dir: dir.into(),
            pending: Vec::new(),
            seen: HashSet::new(),
            next_index: 0,
            watch: None,
        };
        source.rescan()?;
        crate::log_info!(
            "Folder source {}: {} frames",
            source.dir.display(),
            source.pending.len()
        );
        Ok(source)
    }

    /// Keep polling for new files instead of reporting exhaustion
    ///
    /// `next_frame` waits up to `poll` for a new file and then reports
    /// `FrameError::NotReady`.
    pub fn watch(mut self, poll: Duration) -> Self {
        self.watch = Some(poll);
        self
    }

    /// Frames queued but not yet yielded
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    fn rescan(&mut self) -> Result<(), FrameError> {
        let mut found: Vec<PathBuf> = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_frame_file(path))
            .filter(|path| !self.seen.contains(path))
            .collect();
        found.sort();

        // pending is consumed from the back
        found.reverse();
        self.seen.extend(found.iter().cloned());
        found.append(&mut self.pending);
        self.pending = found;
        Ok(())
    }
}

impl FrameSource for FolderSource {
    fn next_frame(&mut self) -> Result<Frame, FrameError> {
        if self.pending.is_empty() {
            match self.watch {
                None => return Err(FrameError::Exhausted),
                Some(poll) => {
                    self.rescan()?;
                    if self.pending.is_empty() {
                        std::thread::sleep(poll);
                        self.rescan()?;
                    }
                    if self.pending.is_empty() {
                        return Err(FrameError::NotReady);
                    }
                }
            }
        }

        let path = self.pending.pop().ok_or(FrameError::Exhausted)?;
        let frame = Frame::new(self.next_index, path);
        self.next_index += 1;
        Ok(frame)
    }
}

/// Whether a path has one of the [`FRAME_EXTENSIONS`]
pub fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            FRAME_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
        .unwrap_or(false)
}
