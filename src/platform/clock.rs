//! Host clock
//!
//! `std` implementation of the core time traits: a monotonic clock for
//! pacing and a sleeping delay for servo settle time.

use std::time::{Duration, Instant};

use line_trace_car_core::traits::{Delay, TimeSource};

/// Monotonic clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn now_us(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}

impl Delay for SystemClock {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(ms as u64));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_advances_clock() {
        let mut clock = SystemClock::new();
        let start = clock.now_us();
        clock.delay_ms(5);
        assert!(clock.elapsed_since(start) >= 5_000);
    }
}
