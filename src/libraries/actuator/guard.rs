//! Drop guard for the actuator driver

use core::ops::{Deref, DerefMut};

use line_trace_car_core::traits::Delay;

use super::{ActuatorDriver, ActuatorPort};

/// Owns an [`ActuatorDriver`] and leaves the hardware safe when dropped
///
/// On drop the guard runs `stop_all()` followed by `release()`, whatever
/// path the owner took out of scope (normal return, `?`, or a panic
/// unwinding through the control loop).
pub struct ActuatorGuard<A: ActuatorPort, D: Delay> {
    driver: ActuatorDriver<A, D>,
}

impl<A: ActuatorPort, D: Delay> ActuatorGuard<A, D> {
    pub fn new(driver: ActuatorDriver<A, D>) -> Self {
        Self { driver }
    }
}

impl<A: ActuatorPort, D: Delay> Deref for ActuatorGuard<A, D> {
    type Target = ActuatorDriver<A, D>;

    fn deref(&self) -> &Self::Target {
        &self.driver
    }
}

impl<A: ActuatorPort, D: Delay> DerefMut for ActuatorGuard<A, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.driver
    }
}

impl<A: ActuatorPort, D: Delay> Drop for ActuatorGuard<A, D> {
    fn drop(&mut self) {
        if let Err(e) = self.driver.stop_all() {
            crate::log_error!("Stop on shutdown failed: {}", e);
        }
        if let Err(e) = self.driver.release() {
            crate::log_error!("Release on shutdown failed: {}", e);
        }
        crate::log_info!("Actuators stopped and released");
    }
}
