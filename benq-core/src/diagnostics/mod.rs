//! Structured diagnostics
//!
//! The engine reports everything of interest as a [`Diagnostic`] value
//! through a [`DiagnosticSink`] it was constructed with. Formatting for a log
//! view, console or message bus is left to the sink.

pub mod event;
pub mod sink;

pub use event::{Diagnostic, LinkOp, Severity};
#[cfg(feature = "defmt")]
pub use sink::DefmtSink;
pub use sink::DiagnosticSink;
