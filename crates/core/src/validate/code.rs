//! Brace tracking through embedded code bodies.

use crate::classify::brace_balance;

/// Follows braces through an embedded code body.
///
/// Code is not classified as markup. Only the net brace count per line is
/// tracked; a line that is exactly `}` while no code brace is open closes
/// the body. Braces inside string literals are counted like any other.
#[derive(Debug, Default)]
pub(crate) struct CodeBodyTracker {
    depth: i64,
}

impl CodeBodyTracker {
    /// Start tracking a freshly opened body.
    pub(crate) fn reset(&mut self) {
        self.depth = 0;
    }

    /// Feed one raw line. Returns `true` when the line closes the body.
    pub(crate) fn closes(&mut self, raw: &str) -> bool {
        let line = raw.trim();
        if line == "}" && self.depth == 0 {
            return true;
        }
        self.depth = (self.depth + brace_balance(line)).max(0);
        false
    }
}
