//! Background frame recorder
//!
//! Saves a camera still to `frame_{n}.jpg` at a fixed interval on its own
//! thread, for collecting training data while driving. Failed captures and
//! failed writes are logged and the frame is dropped; there is no queue and
//! no backpressure on the control loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use line_trace_car_core::mode::SharedRunState;

use crate::devices::traits::Capture;

/// Longest uninterrupted sleep, so shutdown is noticed promptly
const SHUTDOWN_POLL: Duration = Duration::from_millis(50);

/// Handle to the recorder thread
pub struct FrameRecorder {
    handle: JoinHandle<u64>,
}

impl FrameRecorder {
    /// Start recording into `dir` (created if missing)
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created or the
    /// thread cannot be spawned.
    pub fn spawn<C>(
        mut capture: C,
        dir: impl Into<PathBuf>,
        interval: Duration,
        shared: Arc<SharedRunState>,
    ) -> std::io::Result<Self>
    where
        C: Capture + Send + 'static,
    {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        crate::log_info!(
            "Recording frames to {} every {} ms",
            dir.display(),
            interval.as_millis()
        );

        let handle = std::thread::Builder::new()
            .name("frame-recorder".into())
            .spawn(move || {
                let mut saved = 0u64;
                while !shared.is_shutdown() {
                    let started = Instant::now();
                    if save_frame(&mut capture, &dir, saved) {
                        saved += 1;
                    }
                    sleep_until_shutdown(&shared, interval.saturating_sub(started.elapsed()));
                }
                crate::log_info!("Frame recorder stopped after {} frames", saved);
                saved
            })?;

        Ok(Self { handle })
    }

    /// Wait for the thread to exit; returns the number of frames saved
    ///
    /// The thread only exits once the shutdown flag is set.
    pub fn join(self) -> u64 {
        self.handle.join().unwrap_or(0)
    }
}

/// Path of the `n`th recorded frame
pub fn frame_path(dir: &Path, n: u64) -> PathBuf {
    dir.join(format!("frame_{n}.jpg"))
}

fn save_frame<C: Capture>(capture: &mut C, dir: &Path, n: u64) -> bool {
    let bytes = match capture.capture() {
        Ok(bytes) if !bytes.is_empty() => bytes,
        Ok(_) => {
            crate::log_warn!("Recorder: empty frame dropped");
            return false;
        }
        Err(e) => {
            crate::log_warn!("Recorder: capture failed: {}", e);
            return false;
        }
    };

    let path = frame_path(dir, n);
    match std::fs::write(&path, &bytes) {
        Ok(()) => {
            crate::log_debug!("Image saved: {}", path.display());
            true
        }
        Err(e) => {
            crate::log_warn!("Recorder: failed to write {}: {}", path.display(), e);
            false
        }
    }
}

fn sleep_until_shutdown(shared: &SharedRunState, total: Duration) {
    let deadline = Instant::now() + total;
    while !shared.is_shutdown() {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        std::thread::sleep((deadline - now).min(SHUTDOWN_POLL));
    }
}
