//! Outbound command queue
//!
//! Commands are owned by the queue from enqueue until they have been written
//! to the link, and leave strictly in submission order. The queue is bounded;
//! a full queue refuses new commands rather than dropping queued ones.

use core::fmt::Write;

use heapless::{Deque, String};

use benq_protocol::keys;
use benq_protocol::MAX_COMMAND_LEN;

/// Maximum number of commands waiting to be sent
pub const SEND_QUEUE_CAPACITY: usize = 32;

/// Command text without the `*`/`#` markers
pub type CommandText = String<MAX_COMMAND_LEN>;

/// Errors that can occur when queueing a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueueError {
    /// The queue already holds [`SEND_QUEUE_CAPACITY`] commands
    Full,
    /// Command text exceeds `MAX_COMMAND_LEN`
    TooLong,
}

/// One outbound command, `key=value` or raw
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingCommand(CommandText);

impl PendingCommand {
    /// A raw command, sent as given
    pub fn raw(text: &str) -> Result<Self, QueueError> {
        let mut command = CommandText::new();
        command.push_str(text).map_err(|_| QueueError::TooLong)?;
        Ok(Self(command))
    }

    /// A `key=value` command
    pub fn key_value(key: &str, value: &str) -> Result<Self, QueueError> {
        let mut command = CommandText::new();
        write!(command, "{}={}", key, value).map_err(|_| QueueError::TooLong)?;
        Ok(Self(command))
    }

    /// A `key=?` query
    pub fn query(key: &str) -> Result<Self, QueueError> {
        Self::key_value(key, keys::QUERY)
    }

    /// Command text
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Take the command text
    pub fn into_text(self) -> CommandText {
        self.0
    }
}

/// FIFO of commands waiting for their send slot
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    pending: Deque<PendingCommand, SEND_QUEUE_CAPACITY>,
}

impl CommandQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            pending: Deque::new(),
        }
    }

    /// Number of queued commands
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True if nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// True if no more commands fit
    pub fn is_full(&self) -> bool {
        self.pending.is_full()
    }

    /// Append a command
    pub fn push(&mut self, command: PendingCommand) -> Result<(), QueueError> {
        self.pending
            .push_back(command)
            .map_err(|_| QueueError::Full)
    }

    /// Append a raw command
    pub fn enqueue_raw(&mut self, text: &str) -> Result<(), QueueError> {
        self.push(PendingCommand::raw(text)?)
    }

    /// Append a `key=value` command
    pub fn enqueue_key_value(&mut self, key: &str, value: &str) -> Result<(), QueueError> {
        self.push(PendingCommand::key_value(key, value)?)
    }

    /// Append a `key=?` query
    pub fn enqueue_query(&mut self, key: &str) -> Result<(), QueueError> {
        self.push(PendingCommand::query(key)?)
    }

    /// Next command to send
    pub fn front(&self) -> Option<&PendingCommand> {
        self.pending.front()
    }

    /// Remove the next command
    pub fn pop(&mut self) -> Option<PendingCommand> {
        self.pending.pop_front()
    }

    /// Iterate queued commands in send order
    pub fn iter(&self) -> impl Iterator<Item = &PendingCommand> {
        self.pending.iter()
    }
}
