//! BenQ RS-232 Control Protocol
//!
//! This crate defines the line-oriented ASCII protocol spoken by BenQ
//! projectors on their RS-232 control port. It covers byte framing, message
//! classification, and command encoding. It holds no device state.
//!
//! # Protocol Overview
//!
//! Commands are wrapped in carriage returns so the projector discards any
//! partial line it was holding:
//! ```text
//! \r*<key>=<value>#\r     set or query (value "?" queries)
//! \r*<command>#\r         bare command (e.g. "enter", "menu")
//! ```
//!
//! Replies arrive one per line, terminated by `\r` (some models send `\r\n`):
//! ```text
//! *POW=ON#                key/value response
//! >*pow=?#                echo of the command the projector received
//! *Block item#            command rejected in the current device state
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod keys;
pub mod messages;
pub mod remote;

pub use frame::{
    encode_command, encode_command_to_vec, FrameError, LineReader, RawFrame, MAX_COMMAND_LEN,
    MAX_ENCODED_LEN, MAX_FRAME_LEN,
};
pub use messages::{
    classify, printable, DeviceError, Key, MalformedReason, Message, Text, Value, MAX_KEY_LEN,
    MAX_VALUE_LEN,
};
pub use remote::RemoteKey;
