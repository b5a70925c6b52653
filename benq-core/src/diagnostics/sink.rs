//! Diagnostic sinks

use super::event::Diagnostic;
#[cfg(feature = "defmt")]
use super::event::Severity;

/// Receiver of diagnostics
///
/// Emitting must not block; a sink that cannot keep up drops events.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);
}

/// Discards everything
impl DiagnosticSink for () {
    fn emit(&mut self, _diagnostic: Diagnostic) {}
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &mut T {
    fn emit(&mut self, diagnostic: Diagnostic) {
        (**self).emit(diagnostic)
    }
}

#[cfg(test)]
impl DiagnosticSink for std::vec::Vec<Diagnostic> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Forwards diagnostics to the defmt logger
///
/// Link traffic goes to `trace` so it can be filtered out separately.
#[cfg(feature = "defmt")]
#[derive(Debug, Clone, Copy, Default)]
pub struct DefmtSink;

#[cfg(feature = "defmt")]
impl DiagnosticSink for DefmtSink {
    fn emit(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Comm => defmt::trace!("{}", diagnostic),
            Severity::Debug => defmt::debug!("{}", diagnostic),
            Severity::Info => defmt::info!("{}", diagnostic),
            Severity::Error => defmt::error!("{}", diagnostic),
        }
    }
}
