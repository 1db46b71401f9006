//! Document outline: which targets a document declares.

use crate::classify::{LineEvent, classify};
use crate::validate::{CodeBodyTracker, ContextStack, numbered_lines};
use serde::Serialize;
use z_toolchain_registry::{ParseMode, Registry};

/// A target declared at the top level, or directly inside the root marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetDecl {
    /// Target keyword (`next`, `swift`, ...).
    pub keyword: String,
    /// Declared name.
    pub name: String,
    /// Zero-based line of the declaration.
    pub line: u32,
}

/// List the target declarations of `text`, in document order.
///
/// Code bodies are stepped over; unknown keywords are not reported.
pub fn targets(text: &str, registry: &Registry) -> Vec<TargetDecl> {
    let mut stack = ContextStack::new(registry);
    let mut code = CodeBodyTracker::default();
    let mut found = Vec::new();

    for (number, raw) in numbered_lines(text) {
        if stack.current().is_some_and(|s| s.mode == ParseMode::Code) {
            if code.closes(raw) {
                stack.pop();
            }
            continue;
        }

        let event = classify(raw, number);
        if event == LineEvent::CloseScope {
            stack.pop();
            continue;
        }
        let Some(el) = event.element() else {
            continue;
        };

        let top_level = match stack.frames() {
            [] => true,
            [root] => registry.is_root_marker(&root.element_type),
            _ => false,
        };
        if top_level && registry.target(el.keyword).is_some() {
            found.push(TargetDecl {
                keyword: el.keyword.to_string(),
                name: el.name.to_string(),
                line: el.line,
            });
        }

        if el.opens_body {
            stack.push(el.keyword, el.name, el.line);
            code.reset();
        }
    }
    found
}
