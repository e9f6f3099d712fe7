//! Time abstraction traits for platform-agnostic timing operations.
//!
//! This module provides the `TimeSource` and `Delay` traits that abstract
//! over wall-clock time and blocking waits, so the control loop and the
//! servo settle logic can be tested on host without sleeping.

use core::cell::Cell;

/// Platform-agnostic time source for control loops and timing.
///
/// # Example
///
/// ```
/// use line_trace_car_core::traits::{TimeSource, MockTime};
///
/// fn tick_due<T: TimeSource>(time: &T, last_tick: u64, period_us: u64) -> bool {
///     time.elapsed_since(last_tick) >= period_us
/// }
///
/// let time = MockTime::new();
/// time.advance(100_000);
/// assert!(tick_due(&time, 0, 100_000));
/// ```
pub trait TimeSource {
    /// Returns current time in milliseconds since start.
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }

    /// Returns current time in microseconds since start.
    fn now_us(&self) -> u64;

    /// Returns elapsed time in microseconds since a reference point.
    ///
    /// Uses saturating subtraction to handle potential overflow.
    fn elapsed_since(&self, reference_us: u64) -> u64 {
        self.now_us().saturating_sub(reference_us)
    }
}

/// Blocking delay used for servo settle time and loop pacing.
pub trait Delay {
    /// Block for the given number of milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Mock time source for testing with controllable time advancement.
///
/// Delays advance the clock instead of sleeping, so a test can assert how
/// long the code under test would have waited.
///
/// # Example
///
/// ```
/// use line_trace_car_core::traits::{Delay, MockTime, TimeSource};
///
/// let mut time = MockTime::new();
/// assert_eq!(time.now_us(), 0);
///
/// time.delay_ms(500);
/// assert_eq!(time.now_ms(), 500);
/// assert_eq!(time.delay_calls(), 1);
/// ```
#[derive(Clone, Default)]
pub struct MockTime {
    current_us: Cell<u64>,
    delay_calls: Cell<u32>,
}

impl MockTime {
    /// Creates a new `MockTime` starting at time 0.
    pub fn new() -> Self {
        Self {
            current_us: Cell::new(0),
            delay_calls: Cell::new(0),
        }
    }

    /// Creates a new `MockTime` starting at the specified time.
    pub fn with_initial(us: u64) -> Self {
        Self {
            current_us: Cell::new(us),
            delay_calls: Cell::new(0),
        }
    }

    /// Sets the current time to an absolute value.
    pub fn set(&self, us: u64) {
        self.current_us.set(us);
    }

    /// Advances the current time by the specified amount.
    pub fn advance(&self, us: u64) {
        self.current_us.set(self.current_us.get() + us);
    }

    /// Number of `delay_ms` calls so far.
    pub fn delay_calls(&self) -> u32 {
        self.delay_calls.get()
    }
}

impl TimeSource for MockTime {
    fn now_us(&self) -> u64 {
        self.current_us.get()
    }
}

impl Delay for MockTime {
    fn delay_ms(&mut self, ms: u32) {
        self.advance(ms as u64 * 1000);
        self.delay_calls.set(self.delay_calls.get() + 1);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_time_initial_value() {
        let time = MockTime::new();
        assert_eq!(time.now_us(), 0);
        assert_eq!(time.now_ms(), 0);
    }

    #[test]
    fn mock_time_with_initial() {
        let time = MockTime::with_initial(5_000_000);
        assert_eq!(time.now_us(), 5_000_000);
        assert_eq!(time.now_ms(), 5000);
    }

    #[test]
    fn mock_time_advance() {
        let time = MockTime::new();
        time.advance(500_000);
        assert_eq!(time.now_us(), 500_000);

        time.advance(500_000);
        assert_eq!(time.now_ms(), 1000);
    }

    #[test]
    fn mock_time_elapsed_since_saturates() {
        let time = MockTime::new();
        time.set(1_000);

        // Reference is in the "future" - should saturate to 0
        assert_eq!(time.elapsed_since(5_000), 0);
        assert_eq!(time.elapsed_since(400), 600);
    }

    #[test]
    fn mock_delay_advances_clock() {
        let mut time = MockTime::new();
        time.delay_ms(20);
        time.delay_ms(30);
        assert_eq!(time.now_ms(), 50);
        assert_eq!(time.delay_calls(), 2);
    }
}
