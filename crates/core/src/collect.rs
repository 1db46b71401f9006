//! Append-only diagnostic accumulation.

use z_toolchain_diagnostics::{Diagnostic, Range, Severity, default_severity};

/// Build a diagnostic whose severity comes from the code table.
pub(crate) fn coded(id: &'static str, message: impl Into<String>, range: Range) -> Diagnostic {
    match default_severity(id) {
        Some(Severity::Error) => Diagnostic::error(id, message, range),
        _ => Diagnostic::warn(id, message, range),
    }
}

/// Collects diagnostics in the order they are reported.
///
/// There is no deduplication: one line may carry several diagnostics.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Append diagnostics produced elsewhere, keeping their order.
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Diagnostics collected so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of collected diagnostics.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// `true` if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// `true` if any collected diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Consume the collector, yielding the diagnostics in report order.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
