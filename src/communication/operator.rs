//! Operator keyboard input
//!
//! Reads lines from a terminal (or any `BufRead`) on its own thread. Every
//! non-whitespace character is one key:
//!
//! | Key | Command                      |
//! |-----|------------------------------|
//! | `s` | start autonomous driving     |
//! | `x` | stop                         |
//! | `p` | pause / resume               |
//! | `q` | quit                         |
//! | `j` `r` `k` | servo left / center / right preset (stopped only) |
//!
//! Run-state keys update the [`SharedRunState`] directly. Servo preset keys
//! are forwarded to the control loop, which owns the actuators. There are no
//! drive keys; the motors only turn under autonomous steering. End of input
//! counts as `q`.

use std::io::BufRead;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::JoinHandle;

use line_trace_car_core::mode::{OperatorCommand, SharedRunState};

/// Operator listener thread
pub struct OperatorListener {
    handle: JoinHandle<()>,
}

impl OperatorListener {
    /// Start listening on `reader`
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the thread cannot be spawned.
    pub fn spawn<R>(
        reader: R,
        shared: Arc<SharedRunState>,
        manual: Sender<OperatorCommand>,
    ) -> std::io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let handle = std::thread::Builder::new()
            .name("operator".into())
            .spawn(move || listen(reader, &shared, &manual))?;
        Ok(Self { handle })
    }

    /// Whether the thread has exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Read until quit, end of input, or shutdown
pub fn listen<R: BufRead>(reader: R, shared: &SharedRunState, manual: &Sender<OperatorCommand>) {
    crate::log_info!("Keys: s=start x=stop p=pause q=quit | j/r/k=servo");
    for line in reader.lines() {
        if shared.is_shutdown() {
            return;
        }
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                crate::log_warn!("Operator input error: {}", e);
                break;
            }
        };
        if !handle_line(&line, shared, manual) {
            return;
        }
    }

    crate::log_info!("Operator input closed");
    apply(OperatorCommand::Quit, shared, manual);
}

/// Apply every key on one line
///
/// Returns `false` once a quit has been handled.
pub fn handle_line(line: &str, shared: &SharedRunState, manual: &Sender<OperatorCommand>) -> bool {
    for key in line.chars().filter(|c| !c.is_whitespace()) {
        match OperatorCommand::from_key(key) {
            Some(command) => {
                if !apply(command, shared, manual) {
                    return false;
                }
            }
            None => crate::log_warn!("Unknown key {:?}", key),
        }
    }
    true
}

fn apply(command: OperatorCommand, shared: &SharedRunState, manual: &Sender<OperatorCommand>) -> bool {
    if !command.is_run_control() {
        // The loop may already be gone during shutdown
        let _ = manual.send(command);
        return true;
    }

    let (prev, next) = shared.apply(command);
    if prev != next {
        crate::log_info!("Run state {} -> {}", prev, next);
    }
    command != OperatorCommand::Quit
}
