//! Inbound message classification
//!
//! Every complete frame is one of:
//! - An echo of a command the projector received (`>` prefix)
//! - A device error reply (`*Illegal format#`, `*Block item#`, `*Unsupported item#`)
//! - A key/value response (`*<key>=<value>#`, or `*<key>#` with no value)
//! - Malformed input, which is reported and otherwise ignored

use heapless::{String, Vec};

use crate::frame::MAX_FRAME_LEN;

/// Maximum key length in a response
pub const MAX_KEY_LEN: usize = 15;

/// Maximum value length in a response
pub const MAX_VALUE_LEN: usize = 31;

/// Prefix of an echoed command
pub const ECHO_MARKER: u8 = b'>';

/// Prefix of every response
pub const RESPONSE_MARKER: u8 = b'*';

/// Separates key from value
pub const KEY_SEPARATOR: u8 = b'=';

/// Terminates key or value
pub const TERMINATOR: u8 = b'#';

/// Response key
pub type Key = String<MAX_KEY_LEN>;

/// Response value
pub type Value = String<MAX_VALUE_LEN>;

/// Printable rendering of a whole frame
pub type Text = String<MAX_FRAME_LEN>;

/// Error replies the projector sends instead of a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError {
    /// The projector could not parse what we sent
    IllegalFormat,
    /// Valid command, but not executable in the current device state
    BlockItem,
    /// The projector does not support this key
    UnsupportedItem,
}

impl DeviceError {
    const ALL: [DeviceError; 3] = [
        DeviceError::IllegalFormat,
        DeviceError::BlockItem,
        DeviceError::UnsupportedItem,
    ];

    /// Reply text as sent by the projector, without markers
    pub const fn prefix(&self) -> &'static str {
        match self {
            DeviceError::IllegalFormat => "Illegal format",
            DeviceError::BlockItem => "Block item",
            DeviceError::UnsupportedItem => "Unsupported item",
        }
    }

    /// Match a frame body (everything after the `*`) case-insensitively
    pub fn from_body(body: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| {
            let prefix = kind.prefix().as_bytes();
            body.len() >= prefix.len() && body[..prefix.len()].eq_ignore_ascii_case(prefix)
        })
    }

    /// True if the reply points at a bug on our side rather than device state
    pub fn is_operational_error(&self) -> bool {
        matches!(self, DeviceError::IllegalFormat | DeviceError::UnsupportedItem)
    }
}

/// Why a frame was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MalformedReason {
    /// Frame did not start with `*` or `>`
    MissingMarker,
    /// No `=` or `#` within [`MAX_KEY_LEN`] bytes
    KeyUnterminated,
    /// No `#` within [`MAX_VALUE_LEN`] bytes after `=`
    ValueUnterminated,
}

impl MalformedReason {
    /// Short human-readable reason
    pub const fn as_str(&self) -> &'static str {
        match self {
            MalformedReason::MissingMarker => "missing leading marker",
            MalformedReason::KeyUnterminated => "key too long or unterminated",
            MalformedReason::ValueUnterminated => "value too long or unterminated",
        }
    }
}

/// A classified inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Message {
    /// The projector reflecting a command back, markers stripped
    Echo(Text),
    /// The projector refused a command
    ErrorReply { kind: DeviceError, text: Text },
    /// A status response
    KeyValue { key: Key, value: Value },
    /// Not a usable frame
    Malformed(MalformedReason),
}

impl Message {
    /// True if the frame carried a protocol marker and counts as received traffic
    pub fn is_counted(&self) -> bool {
        !matches!(self, Message::Malformed(MalformedReason::MissingMarker))
    }
}

/// Classify a complete frame
pub fn classify(frame: &[u8]) -> Message {
    match frame.first() {
        Some(&ECHO_MARKER) => return Message::Echo(echo_text(&frame[1..])),
        Some(&RESPONSE_MARKER) => {}
        _ => return Message::Malformed(MalformedReason::MissingMarker),
    }

    let body = &frame[1..];

    if let Some(kind) = DeviceError::from_body(body) {
        return Message::ErrorReply {
            kind,
            text: printable(body),
        };
    }

    parse_key_value(body)
}

/// Parse `<key>=<value>#` or `<key>#`
fn parse_key_value(body: &[u8]) -> Message {
    let mut key = Vec::<u8, MAX_KEY_LEN>::new();
    let mut idx = 0;

    // Key ends at '=' or '#' (the latter when there is no value)
    loop {
        match body.get(idx) {
            Some(&KEY_SEPARATOR) | Some(&TERMINATOR) => break,
            Some(&byte) => {
                if key.push(byte).is_err() {
                    return Message::Malformed(MalformedReason::KeyUnterminated);
                }
                idx += 1;
            }
            None => return Message::Malformed(MalformedReason::KeyUnterminated),
        }
    }

    let mut value = Vec::<u8, MAX_VALUE_LEN>::new();
    if body[idx] == KEY_SEPARATOR {
        idx += 1;
        loop {
            match body.get(idx) {
                Some(&TERMINATOR) => break,
                Some(&byte) => {
                    if value.push(byte).is_err() {
                        return Message::Malformed(MalformedReason::ValueUnterminated);
                    }
                    idx += 1;
                }
                None => return Message::Malformed(MalformedReason::ValueUnterminated),
            }
        }
    }

    Message::KeyValue {
        key: printable(&key),
        value: printable(&value),
    }
}

/// Strip the `*` and `#` the projector wraps around an echoed command
fn echo_text(echo: &[u8]) -> Text {
    let echo = echo.strip_prefix(&[RESPONSE_MARKER]).unwrap_or(echo);
    let echo = echo.strip_suffix(&[TERMINATOR]).unwrap_or(echo);
    printable(echo)
}

/// Render bytes as ASCII, replacing anything unprintable with `?`
///
/// Input longer than `N` is cut at `N` bytes.
pub fn printable<const N: usize>(bytes: &[u8]) -> String<N> {
    let mut text = String::new();
    for &byte in bytes.iter().take(N) {
        let c = if byte == b' ' || byte.is_ascii_graphic() {
            byte as char
        } else {
            '?'
        };
        // Each char is one byte and we take at most N
        let _ = text.push(c);
    }
    text
}
