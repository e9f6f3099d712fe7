//! Operator communication
//!
//! - `operator`: keyboard commands from the terminal

pub mod operator;

pub use operator::OperatorListener;
