//! Device state record and reconciliation
//!
//! [`DeviceState`] is the engine's view of the projector, built only from
//! what the projector reports. Commands never update it optimistically; the
//! next poll confirms them.

pub mod device;
pub mod reconcile;

pub use device::{DeviceState, PowerPhase};
pub use reconcile::{Applied, PowerTransition, ValueError, VolumeStep};
