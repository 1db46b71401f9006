//! Diagnostics for the Z markup toolchain.
//!
//! Provides [`Diagnostic`], [`Severity`], [`Position`], [`Range`], and
//! [`LineIndex`] used to report problems found by the structural validator
//! and the marker scanner. Diagnostic codes are defined in the [`codes`]
//! module.
//!
//! Positions are **zero-based** line/character pairs, where `character`
//! counts Unicode scalar values within the line. They are directly usable by
//! editor integrations without further conversion.

#![warn(missing_docs)]

/// Diagnostic ID constants generated from the code table.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

// ── Source tags ──────────────────────────────────────────────────────────

/// Source tag for structural markup diagnostics.
pub const SOURCE_MARKUP: &str = "z-markup";
/// Source tag for the supplementary marker scan.
pub const SOURCE_MARKERS: &str = "z-markers";
/// Source tag for registry availability diagnostics.
pub const SOURCE_REGISTRY: &str = "z-registry";

// ── Positions ────────────────────────────────────────────────────────────

/// A zero-based line/character position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Zero-based line number.
    pub line: u32,
    /// Zero-based character offset within the line.
    pub character: u32,
}

impl Position {
    /// Create a position.
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A half-open `[start, end)` source range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    /// First position covered by the range.
    pub start: Position,
    /// Position one past the last covered character.
    pub end: Position,
}

impl Range {
    /// Create a range covering `[start, end)`.
    ///
    /// Panics if `end < start`.
    pub fn new(start: Position, end: Position) -> Self {
        assert!(
            end >= start,
            "Range end ({}:{}) < start ({}:{})",
            end.line,
            end.character,
            start.line,
            start.character
        );
        Self { start, end }
    }

    /// Range covering characters `[start_char, end_char)` of a single line.
    pub fn on_line(line: u32, start_char: u32, end_char: u32) -> Self {
        Self::new(Position::new(line, start_char), Position::new(line, end_char))
    }

    /// Zero-width range at the given position.
    pub fn empty(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }
}

// ── LineIndex ────────────────────────────────────────────────────────────

/// Maps [`Position`]s to absolute offsets in a source string.
///
/// Renderers work on absolute offsets while diagnostics carry line/character
/// pairs. The index records the character offset at which each line starts.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Character offset of the start of each line.
    line_starts: Vec<usize>,
    /// Total number of characters in the source.
    total_chars: usize,
}

impl LineIndex {
    /// Build a `LineIndex` from source text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0usize];
        let mut chars = 0usize;
        for ch in text.chars() {
            chars += 1;
            if ch == '\n' {
                line_starts.push(chars);
            }
        }
        Self {
            line_starts,
            total_chars: chars,
        }
    }

    /// Absolute character offset of `pos`, clamped to the source length.
    ///
    /// Lines past the end clamp to the last line.
    pub fn char_offset(&self, pos: Position) -> usize {
        let line = (pos.line as usize).min(self.line_starts.len() - 1);
        let start = self.line_starts[line];
        (start + pos.character as usize).min(self.total_chars)
    }
}

// ── Diagnostic ───────────────────────────────────────────────────────────

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Severity {
    /// Hard error: the document is structurally invalid.
    Error,
    /// Warning: worth attention, does not fail a check.
    Warn,
}

/// A diagnostic produced by the validator or the marker scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Unique diagnostic code (e.g., `"Z1001"`).
    pub id: Cow<'static, str>,
    /// Severity level.
    pub severity: Severity,
    /// Human-readable diagnostic message.
    pub message: String,
    /// Zero-based source range the diagnostic is anchored to.
    pub range: Range,
    /// Tag of the producer (see [`SOURCE_MARKUP`], [`SOURCE_MARKERS`]).
    pub source: Cow<'static, str>,
    /// Machine-readable context for tooling. Keys and values are free-form strings.
    ///
    /// Uses `BTreeMap` for deterministic key ordering in serialized output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl Diagnostic {
    /// Create a diagnostic. The source tag defaults to the one registered for
    /// `id` in the code table (`"z"` for unknown ids).
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        severity: Severity,
        message: impl Into<String>,
        range: Range,
    ) -> Self {
        let id = id.into();
        let source = default_source(&id).unwrap_or("z");
        Self {
            id,
            severity,
            message: message.into(),
            range,
            source: Cow::Borrowed(source),
            context: None,
        }
    }

    /// Shorthand for an `Error` diagnostic.
    pub fn error(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        range: Range,
    ) -> Self {
        Self::new(id, Severity::Error, message, range)
    }

    /// Shorthand for a `Warn` diagnostic.
    pub fn warn(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        range: Range,
    ) -> Self {
        Self::new(id, Severity::Warn, message, range)
    }

    /// Attach machine-readable context metadata (builder pattern).
    ///
    /// Keys are short descriptors like `"keyword"`, `"parent"`, `"allowed"`.
    pub fn with_context(mut self, ctx: BTreeMap<String, String>) -> Self {
        self.context = Some(ctx);
        self
    }

    /// `true` for `Error` severity.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Returns the human-readable explanation for this diagnostic's code, if available.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.id)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {}[{}]: {}",
            self.range.start.line + 1,
            self.range.start.character + 1,
            self.severity,
            self.id,
            self.message
        )
    }
}

/// Returns the human-readable explanation for a diagnostic code, if known.
///
/// Auto-generated from `spec/diagnostics.jsonc` at build time.
pub fn explain(id: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_explain.rs"))
}

/// Returns the default severity declared for a diagnostic code, if known.
pub fn default_severity(id: &str) -> Option<Severity> {
    include!(concat!(env!("OUT_DIR"), "/generated_severity.rs"))
}

/// Returns the producer source tag declared for a diagnostic code, if known.
pub fn default_source(id: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_source.rs"))
}
