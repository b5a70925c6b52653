//! Line framing and command encoding for the BenQ RS-232 protocol.
//!
//! Inbound:
//! - Bytes accumulate until a delimiter (`\r` or `\n`)
//! - The delimiter itself is never part of a frame
//! - Empty lines (e.g. the `\n` of a `\r\n` pair) are dropped
//! - Lines longer than [`MAX_FRAME_LEN`] are discarded whole, never truncated
//!
//! Outbound:
//! - `\r*<command>#\r`

use heapless::Vec;

/// Maximum frame length in bytes, excluding the delimiter
pub const MAX_FRAME_LEN: usize = 64;

/// Maximum command length (without the `*`/`#` markers)
pub const MAX_COMMAND_LEN: usize = 48;

/// Maximum encoded command size (CR + `*` + command + `#` + CR)
pub const MAX_ENCODED_LEN: usize = MAX_COMMAND_LEN + 4;

/// Carriage return, the protocol's line delimiter
pub const CR: u8 = b'\r';

/// Line feed; some models follow every CR with one
pub const LF: u8 = b'\n';

/// One complete inbound line, delimiter stripped
pub type RawFrame = Vec<u8, MAX_FRAME_LEN>;

/// Errors that can occur during framing or encoding
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// A line outgrew the receive buffer; carries the discarded prefix
    Overflow {
        /// The first [`MAX_FRAME_LEN`] bytes of the dropped line
        prefix: RawFrame,
    },
    /// Command exceeds [`MAX_COMMAND_LEN`]
    CommandTooLong,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// Returns true if `byte` terminates a line
pub fn is_delimiter(byte: u8) -> bool {
    byte == CR || byte == LF
}

/// Accumulates bytes into delimiter-terminated frames
#[derive(Debug, Clone, Default)]
pub struct LineReader {
    buffer: RawFrame,
    /// Set after an overflow; bytes are dropped until the next delimiter
    discarding: bool,
}

impl LineReader {
    /// Create an empty reader
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            discarding: false,
        }
    }

    /// Reset the reader, dropping any partial line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }

    /// Number of bytes of the current partial line
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// Feed a single byte to the reader
    ///
    /// Returns `Ok(Some(frame))` when a delimiter completes a non-empty line,
    /// `Ok(None)` when more bytes are needed, or `Err(FrameError::Overflow)`
    /// the moment a line outgrows the buffer. After an overflow the remainder
    /// of that line is silently consumed up to and including its delimiter.
    pub fn feed(&mut self, byte: u8) -> Result<Option<RawFrame>, FrameError> {
        if is_delimiter(byte) {
            if self.discarding {
                self.discarding = false;
                return Ok(None);
            }

            if self.buffer.is_empty() {
                return Ok(None);
            }

            let frame = core::mem::take(&mut self.buffer);
            return Ok(Some(frame));
        }

        if self.discarding {
            return Ok(None);
        }

        if self.buffer.push(byte).is_err() {
            let prefix = core::mem::take(&mut self.buffer);
            self.discarding = true;
            return Err(FrameError::Overflow { prefix });
        }

        Ok(None)
    }
}

/// Encode a command as `\r*<command>#\r` into `buffer`
///
/// Returns the number of bytes written
pub fn encode_command(command: &str, buffer: &mut [u8]) -> Result<usize, FrameError> {
    let command = command.as_bytes();
    if command.len() > MAX_COMMAND_LEN {
        return Err(FrameError::CommandTooLong);
    }

    let frame_len = command.len() + 4;
    if buffer.len() < frame_len {
        return Err(FrameError::BufferTooSmall);
    }

    buffer[0] = CR;
    buffer[1] = b'*';
    buffer[2..2 + command.len()].copy_from_slice(command);
    buffer[2 + command.len()] = b'#';
    buffer[3 + command.len()] = CR;

    Ok(frame_len)
}

/// Encode a command into a heapless Vec
pub fn encode_command_to_vec(command: &str) -> Result<Vec<u8, MAX_ENCODED_LEN>, FrameError> {
    let mut buffer = [0u8; MAX_ENCODED_LEN];
    let len = encode_command(command, &mut buffer)?;
    let mut vec = Vec::new();
    vec.extend_from_slice(&buffer[..len])
        .map_err(|_| FrameError::BufferTooSmall)?;
    Ok(vec)
}
