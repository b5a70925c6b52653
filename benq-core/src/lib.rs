//! Board-agnostic projector bridge core
//!
//! This crate contains everything between the serial link and the front
//! ends, with no dependency on a specific board or runtime:
//!
//! - Outbound command queue and rate-limited send scheduling
//! - Status polling tailored to the projector's power state
//! - Device state reconciliation, including the power-off cool-down and
//!   stepwise volume convergence
//! - Send/receive throughput statistics
//! - Power policy: dwell times, blank-screen virtual off, maximum on time
//! - Structured diagnostics and configuration
//!
//! [`Projector`] is the protocol engine; [`Bridge`] adds the power policy
//! and a clock. Both are driven by a cooperative `tick` and never block.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod bridge;
pub mod config;
pub mod diagnostics;
pub mod power;
pub mod projector;
pub mod queue;
pub mod scheduler;
pub mod state;
pub mod stats;
pub mod time;
pub mod traits;

#[cfg(test)]
mod testing;

pub use bridge::Bridge;
pub use config::{BridgeConfig, PowerPolicy, ProjectorConfig};
pub use diagnostics::{Diagnostic, DiagnosticSink, LinkOp, Severity};
pub use power::{PowerSequencer, SequencerPhase};
pub use projector::{Projector, StatusSnapshot, TickReport};
pub use queue::{CommandQueue, QueueError};
pub use state::{DeviceState, PowerPhase};
