//! Configuration
//!
//! Timing for the protocol engine and the power policy. Configuration is
//! written by hand as a small TOML file and may be persisted as postcard
//! binary data when the `serde` feature is enabled.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;
