//! Platform error types
//!
//! Every PWM and GPIO backend maps its own errors onto these.

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    #[error("PWM: {0}")]
    Pwm(PwmError),
    #[error("GPIO: {0}")]
    Gpio(GpioError),
    /// GPIO controller could not be opened
    #[error("platform initialization failed: {0}")]
    InitializationFailed(String),
    /// Output was released or never claimed
    #[error("output not available")]
    ResourceUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PwmError {
    #[error("duty cycle outside [0, 1]")]
    InvalidDutyCycle,
    #[error("frequency must be nonzero")]
    InvalidFrequency,
    #[error("write failed")]
    WriteFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GpioError {
    #[error("no such pin")]
    InvalidPin,
    #[error("pin is not an output")]
    InvalidMode,
    #[error("pin already claimed")]
    PinInUse,
    #[error("write failed")]
    WriteFailed,
}

impl From<PwmError> for PlatformError {
    fn from(error: PwmError) -> Self {
        PlatformError::Pwm(error)
    }
}

impl From<GpioError> for PlatformError {
    fn from(error: GpioError) -> Self {
        PlatformError::Gpio(error)
    }
}
