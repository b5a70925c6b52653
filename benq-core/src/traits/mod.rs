//! Seams between the power policy and the projector engine
//!
//! The power sequencer only needs to observe the projector and issue power
//! and blank commands, so it works against these traits rather than the
//! concrete engine. Tests drive it with a plain struct.

pub mod power;

pub use power::PowerControl;
