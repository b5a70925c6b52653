//! Diagnostic events

use benq_protocol::{DeviceError, Key, MalformedReason, Text, Value};

use crate::power::OffReason;
use crate::queue::{CommandText, QueueError};
use crate::state::{PowerTransition, ValueError, VolumeStep};

/// How a diagnostic should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Severity {
    /// Link traffic: sent commands, echoes and received frames
    Comm,
    Debug,
    Info,
    Error,
}

/// Serial operation that failed without stopping the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkOp {
    Read,
    Flush,
}

/// One event reported by the engine or the power policy
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Diagnostic {
    /// Command written to the link, without markers
    Sent { command: CommandText },
    /// Projector echoed a command back
    Echo { text: Text },
    /// Frame received, before interpretation
    Received { frame: Text },
    /// Frame discarded as unparseable
    Malformed { reason: MalformedReason },
    /// Line longer than the receive buffer was dropped
    Overflow { prefix: Text },
    /// Projector refused a command
    DeviceRejected { kind: DeviceError, text: Text },
    /// Power report changed (or deliberately did not change) the power phase
    Power { transition: PowerTransition },
    /// Volume step queued towards a target
    VolumeStep {
        step: VolumeStep,
        reported: u8,
        target: u8,
    },
    /// Numeric key carried an unusable value
    InvalidValue {
        key: Key,
        value: Value,
        error: ValueError,
    },
    /// Command could not be queued
    QueueRejected { error: QueueError },
    /// Power policy switched the projector off on a deadline
    PolicyOff { reason: OffReason },
    /// Serial link error; reads resume on the next tick
    LinkError { op: LinkOp },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::Sent { .. } | Diagnostic::Echo { .. } | Diagnostic::Received { .. } => {
                Severity::Comm
            }
            Diagnostic::Malformed { .. }
            | Diagnostic::Overflow { .. }
            | Diagnostic::InvalidValue { .. }
            | Diagnostic::QueueRejected { .. }
            | Diagnostic::LinkError { .. } => Severity::Error,
            Diagnostic::DeviceRejected { kind, .. } => {
                if kind.is_operational_error() {
                    Severity::Error
                } else {
                    Severity::Info
                }
            }
            Diagnostic::Power { transition } => match transition {
                PowerTransition::InitialOn
                | PowerTransition::InitialOff
                | PowerTransition::CooldownIgnored => Severity::Debug,
                _ => Severity::Info,
            },
            Diagnostic::VolumeStep { .. } => Severity::Debug,
            Diagnostic::PolicyOff { .. } => Severity::Info,
        }
    }

    /// True for link traffic
    pub fn is_comm(&self) -> bool {
        self.severity() == Severity::Comm
    }
}
