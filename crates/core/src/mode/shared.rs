//! Run state shared between the operator listener and the control loop
//!
//! The listener is the only writer of the run state; the control loop
//! reads it once per tick, so a stale read costs at most one tick. The
//! shutdown flag is never observed before the final `Stopped` store.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use super::state::{OperatorCommand, RunState};

/// Atomically read run state plus process shutdown flag
#[derive(Debug, Default)]
pub struct SharedRunState {
    state: AtomicU8,
    shutdown: AtomicBool,
}

impl SharedRunState {
    /// Create a cell in the `Stopped` state
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(RunState::Stopped as u8),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Current run state
    pub fn get(&self) -> RunState {
        RunState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Overwrite the run state
    pub fn set(&self, state: RunState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Apply an operator command and return `(previous, next)`
    ///
    /// `Quit` additionally raises the shutdown flag.
    pub fn apply(&self, command: OperatorCommand) -> (RunState, RunState) {
        let mut previous = self.get();
        loop {
            let next = previous.apply(command);
            match self.state.compare_exchange_weak(
                previous as u8,
                next as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    if command == OperatorCommand::Quit {
                        self.request_shutdown();
                    }
                    return (previous, next);
                }
                Err(actual) => previous = RunState::from_u8(actual),
            }
        }
    }

    /// Force `Stopped` and raise the shutdown flag
    pub fn request_shutdown(&self) {
        self.set(RunState::Stopped);
        self.shutdown.store(true, Ordering::Release);
    }

    /// Whether the process is shutting down
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let shared = SharedRunState::new();
        assert_eq!(shared.get(), RunState::Stopped);
        assert!(!shared.is_shutdown());
    }

    #[test]
    fn test_apply_returns_transition() {
        let shared = SharedRunState::new();
        assert_eq!(
            shared.apply(OperatorCommand::Start),
            (RunState::Stopped, RunState::Running)
        );
        assert_eq!(shared.get(), RunState::Running);

        assert_eq!(
            shared.apply(OperatorCommand::TogglePause),
            (RunState::Running, RunState::Paused)
        );
    }

    #[test]
    fn test_quit_sets_shutdown() {
        let shared = SharedRunState::new();
        shared.set(RunState::Running);
        shared.apply(OperatorCommand::Quit);
        assert_eq!(shared.get(), RunState::Stopped);
        assert!(shared.is_shutdown());
    }

    #[test]
    fn test_request_shutdown_forces_stop() {
        let shared = SharedRunState::new();
        shared.set(RunState::Running);
        shared.request_shutdown();
        assert_eq!(shared.get(), RunState::Stopped);
        assert!(shared.is_shutdown());
    }
}
