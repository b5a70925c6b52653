//! BenQ Bridge Hardware Abstraction Layer
//!
//! This crate defines the two collaborators the protocol engine needs from
//! the board it runs on: a serial link to the projector and a monotonic
//! millisecond clock. Board support crates implement these traits; the core
//! never touches a peripheral directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Front ends (web, message bus, ...)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  benq-core (engine + power policy)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  benq-hal (this crate - traits)         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`serial::SerialRx`], [`serial::SerialTx`] - Non-blocking RS-232 link
//! - [`serial::Duplex`] - Separate receive and transmit ports as one link
//! - [`clock::Clock`] - Monotonic millisecond counter

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod clock;
pub mod serial;

// Re-export key traits at crate root for convenience
pub use clock::{Clock, Millis};
pub use serial::{Duplex, ErrorType, Serial, SerialRx, SerialTx};
