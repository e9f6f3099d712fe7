//! Run state and operator commands
//!
//! Pure state types for the control loop. `RunState::apply` is the only
//! place transitions are decided.

use core::fmt;

/// Whether the control loop is actively driving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum RunState {
    /// Idle, motors stopped (initial state)
    #[default]
    Stopped = 0,
    /// Autonomous steering active
    Running = 1,
    /// Idle, resumes with the pause toggle
    Paused = 2,
}

impl RunState {
    /// Decode from the atomic representation
    ///
    /// Unknown values decode to `Stopped`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => RunState::Running,
            2 => RunState::Paused,
            _ => RunState::Stopped,
        }
    }

    /// Whether actuation is allowed
    pub fn is_running(&self) -> bool {
        *self == RunState::Running
    }

    /// State after applying an operator command
    ///
    /// | From    | Command      | To      |
    /// |---------|--------------|---------|
    /// | Stopped | Start        | Running |
    /// | Paused  | Start        | Running |
    /// | Running | Stop         | Stopped |
    /// | Paused  | Stop         | Stopped |
    /// | Running | TogglePause  | Paused  |
    /// | Paused  | TogglePause  | Running |
    /// | any     | Quit         | Stopped |
    ///
    /// Every other pair keeps the current state.
    pub fn apply(self, command: OperatorCommand) -> RunState {
        match (self, command) {
            (RunState::Stopped | RunState::Paused, OperatorCommand::Start) => RunState::Running,
            (_, OperatorCommand::Stop) | (_, OperatorCommand::Quit) => RunState::Stopped,
            (RunState::Running, OperatorCommand::TogglePause) => RunState::Paused,
            (RunState::Paused, OperatorCommand::TogglePause) => RunState::Running,
            (state, _) => state,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Stopped => write!(f, "Stopped"),
            RunState::Running => write!(f, "Running"),
            RunState::Paused => write!(f, "Paused"),
        }
    }
}

/// Fixed servo positions reachable from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoPreset {
    Left,
    Center,
    Right,
}

/// Single-character operator command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    /// `s`: start autonomous driving
    Start,
    /// `x`: stop driving
    Stop,
    /// `p`: pause or resume
    TogglePause,
    /// `q`: stop and exit
    Quit,
    /// `j` / `r` / `k`: move the servo to a preset, only while stopped
    Steer(ServoPreset),
}

impl OperatorCommand {
    /// Parse a key
    ///
    /// Keys are case-insensitive; unknown keys return `None`.
    pub fn from_key(key: char) -> Option<Self> {
        let command = match key.to_ascii_lowercase() {
            's' => OperatorCommand::Start,
            'x' => OperatorCommand::Stop,
            'p' => OperatorCommand::TogglePause,
            'q' => OperatorCommand::Quit,
            'j' => OperatorCommand::Steer(ServoPreset::Left),
            'r' => OperatorCommand::Steer(ServoPreset::Center),
            'k' => OperatorCommand::Steer(ServoPreset::Right),
            _ => return None,
        };
        Some(command)
    }

    /// Whether the command changes the run state
    pub fn is_run_control(&self) -> bool {
        matches!(
            self,
            OperatorCommand::Start
                | OperatorCommand::Stop
                | OperatorCommand::TogglePause
                | OperatorCommand::Quit
        )
    }
}
