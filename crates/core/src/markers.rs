//! Marker scan: reports every occurrence of a configured substring.
//!
//! The scan works on raw lines, independent of classification and of the
//! registry, so it still produces results when structural checks cannot run.

use crate::collect::coded;
use crate::validate::numbered_lines;
use z_toolchain_diagnostics::{Diagnostic, Range, codes};

/// Scan `text` for each marker, one warning per non-overlapping occurrence.
///
/// Diagnostics are ordered by line, then by column. Each one spans exactly
/// the marker text.
pub fn scan_markers<S: AsRef<str>>(text: &str, markers: &[S]) -> Vec<Diagnostic> {
    let mut found = Vec::new();
    for (number, line) in numbered_lines(text) {
        let mut on_line: Vec<(u32, Diagnostic)> = Vec::new();
        for marker in markers.iter().map(AsRef::as_ref) {
            if marker.is_empty() {
                continue;
            }
            for (at, _) in line.match_indices(marker) {
                let start = char_column(line, at);
                let end = start + char_column(marker, marker.len());
                let note = note_after(&line[at + marker.len()..]);
                let message = match note {
                    Some(note) => format!("{marker}: {note}"),
                    None => format!("{marker} marker"),
                };
                on_line.push((start, coded(codes::MARKER, message, Range::on_line(number, start, end))));
            }
        }
        on_line.sort_by_key(|(start, _)| *start);
        found.extend(on_line.into_iter().map(|(_, d)| d));
    }
    found
}

fn char_column(s: &str, byte: usize) -> u32 {
    u32::try_from(s[..byte].chars().count()).unwrap_or(u32::MAX)
}

/// Text following a marker (`TODO: wire auth` → `wire auth`), if any.
fn note_after(rest: &str) -> Option<&str> {
    let note = rest
        .trim_start_matches(|c: char| c == ':' || c == '(' || c.is_whitespace())
        .trim_end_matches("*/")
        .trim();
    (!note.is_empty()).then_some(note)
}
