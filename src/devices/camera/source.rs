//! Live camera frame source
//!
//! `CameraSource` grabs one encoded still per tick from a [`Capture`]
//! device and stages it to a file for the classifier. `CommandCapture`
//! is the capture device used on the car: an external still-capture tool
//! (`rpicam-still -o - ...` or similar) writing JPEG to stdout.

use std::path::PathBuf;
use std::time::Duration;

use crate::devices::traits::{Capture, Frame, FrameError, FrameSource};
use crate::libraries::ext_command::ExternalCommand;

/// Deadline for one still when none is configured
pub const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_millis(5000);

/// External still-capture command
///
/// A capture that fails or misses its deadline is `Unavailable`.
#[derive(Debug, Clone)]
pub struct CommandCapture {
    command: ExternalCommand,
}

impl CommandCapture {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: ExternalCommand::new(program, args).with_timeout(DEFAULT_CAPTURE_TIMEOUT),
        }
    }

    /// Split a whitespace-separated command line
    ///
    /// Returns `None` for an empty line.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let command = ExternalCommand::from_command_line(line)?;
        Some(Self {
            command: command.with_timeout(DEFAULT_CAPTURE_TIMEOUT),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.command = self.command.with_timeout(timeout);
        self
    }

    pub fn command(&self) -> &ExternalCommand {
        &self.command
    }
}

impl Capture for CommandCapture {
    fn capture(&mut self) -> Result<Vec<u8>, FrameError> {
        self.command
            .run(std::iter::empty::<&str>())
            .map_err(|error| FrameError::Unavailable(error.to_string()))
    }
}

/// Frames captured live and staged to one file
pub struct CameraSource<C: Capture> {
    capture: C,
    staging_path: PathBuf,
    next_index: u64,
}

impl<C: Capture> CameraSource<C> {
    pub fn new(capture: C, staging_path: impl Into<PathBuf>) -> Self {
        Self {
            capture,
            staging_path: staging_path.into(),
            next_index: 0,
        }
    }
}

impl<C: Capture> FrameSource for CameraSource<C> {
    fn next_frame(&mut self) -> Result<Frame, FrameError> {
        let bytes = self.capture.capture()?;
        if bytes.is_empty() {
            return Err(FrameError::Unavailable("camera returned an empty frame".into()));
        }

        std::fs::write(&self.staging_path, &bytes)?;
        let frame = Frame::new(self.next_index, self.staging_path.clone());
        self.next_index += 1;
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Capture device replaying a fixed script
    struct ScriptedCapture {
        frames: Vec<Result<Vec<u8>, FrameError>>,
    }

    impl Capture for ScriptedCapture {
        fn capture(&mut self) -> Result<Vec<u8>, FrameError> {
            if self.frames.is_empty() {
                return Err(FrameError::Unavailable("no more frames".into()));
            }
            self.frames.remove(0)
        }
    }

    #[test]
    fn test_camera_source_stages_frames() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("current.jpg");
        let capture = ScriptedCapture {
            frames: vec![Ok(vec![0xFF, 0xD8, 1]), Ok(vec![0xFF, 0xD8, 2])],
        };
        let mut source = CameraSource::new(capture, &staging);

        let frame = source.next_frame().unwrap();
        assert_eq!(frame.index, 0);
        assert_eq!(std::fs::read(&frame.path).unwrap(), vec![0xFF, 0xD8, 1]);

        let frame = source.next_frame().unwrap();
        assert_eq!(frame.index, 1);
        assert_eq!(std::fs::read(&staging).unwrap(), vec![0xFF, 0xD8, 2]);
    }

    #[test]
    fn test_camera_failure_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let capture = ScriptedCapture {
            frames: vec![Ok(Vec::new())],
        };
        let mut source = CameraSource::new(capture, dir.path().join("current.jpg"));

        assert!(matches!(
            source.next_frame(),
            Err(FrameError::Unavailable(_))
        ));
        assert!(matches!(
            source.next_frame(),
            Err(FrameError::Unavailable(_))
        ));
    }

    #[test]
    fn test_command_line_parsing() {
        let capture = CommandCapture::from_command_line("rpicam-still -n -o -").unwrap();
        assert_eq!(capture.command().program(), "rpicam-still");
        assert_eq!(capture.command().args(), ["-n", "-o", "-"]);
        assert_eq!(capture.command().timeout(), DEFAULT_CAPTURE_TIMEOUT);
        assert!(CommandCapture::from_command_line("   ").is_none());
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let mut capture = CommandCapture::new("line-trace-car-no-such-camera", Vec::new());
        assert!(matches!(
            capture.capture(),
            Err(FrameError::Unavailable(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_capture_reads_stdout() {
        let mut capture = CommandCapture::new("printf", vec!["jpeg".to_string()]);
        assert_eq!(capture.capture().unwrap(), b"jpeg".to_vec());
    }

    #[cfg(unix)]
    #[test]
    fn test_hung_camera_is_unavailable() {
        let mut capture = CommandCapture::new(
            "sh",
            vec!["-c".to_string(), "sleep 5".to_string()],
        )
        .with_timeout(Duration::from_millis(100));

        let started = std::time::Instant::now();
        match capture.capture() {
            Err(FrameError::Unavailable(message)) => assert!(message.contains("timed out")),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
