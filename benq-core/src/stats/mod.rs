//! Message throughput statistics
//!
//! Counts sent and received messages overall and over rolling windows.

pub mod throughput;

pub use throughput::{DirectionStats, Throughput, Window, WindowStats, WINDOWS};
