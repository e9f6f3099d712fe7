//! line_trace_car_core - Pure no_std control logic for the line trace car
//!
//! This crate contains platform-agnostic algorithms and types
//! that can be tested on host without any hardware bindings.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies outside tests
//! - **Trait abstractions**: Platform services injected via traits
//!
//! # Modules
//!
//! - [`traits`]: Platform-agnostic trait abstractions (TimeSource, Delay)
//! - [`steering`]: Steering classes, label map and class-to-angle table
//! - [`servo`]: Angle clamping and angle-to-duty conversion
//! - [`motor`]: Motor direction, duty clamping and drive maneuvers
//! - [`actuator`]: Snapshot of the commanded actuator outputs
//! - [`mode`]: Run state machine and operator commands

#![cfg_attr(not(test), no_std)]

pub mod actuator;
pub mod mode;
pub mod motor;
pub mod servo;
pub mod steering;
pub mod traits;
