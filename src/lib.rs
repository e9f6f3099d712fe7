//! line_trace_car - Camera-guided control loop for a servo-steered robot car
//!
//! This library provides platform abstraction, actuator drivers, perception
//! adapters and the control loop that turns steering predictions into
//! servo and motor signals.

// Logging macros over tracing
pub mod logging;

// Platform abstraction layer (PWM, GPIO)
pub mod platform;

// Frame sources and background frame recorder
pub mod devices;

// Actuator port and driver
pub mod libraries;

// Perception adapters (external classifiers)
pub mod subsystems;

// Operator input
pub mod communication;

// Configuration file
pub mod parameters;

// Control loop
pub mod rover;

pub use line_trace_car_core as car_core;
