//! Power policy
//!
//! Sits between user power requests and the projector, enforcing minimum
//! on/off dwell times, a blank-screen "virtual off" for short sessions, and
//! an optional maximum on time.

pub mod sequencer;

pub use sequencer::{OffReason, PowerOff, PowerOn, PowerRefusal, PowerSequencer, SequencerPhase};
