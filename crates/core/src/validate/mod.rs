//! Registry-driven structural validation.
//!
//! The validator walks the document top to bottom, one physical line at a
//! time, keeping a [`ContextStack`] that mirrors brace nesting. Every element
//! or child declaration is checked against the innermost open scope (or
//! against the registry's valid roots at depth 0). Violations never stop the
//! walk; the whole document is always checked in one pass.

mod code;
mod context;

pub(crate) use code::CodeBodyTracker;
pub use context::{AllowedChildren, ContextStack, ValidationContext};

use crate::classify::{LineEvent, ParsedElement, classify, classify_code};
use crate::collect::{DiagnosticCollector, coded};
use crate::config::{CheckConfig, CodeBodies};
use std::collections::BTreeMap;
use z_toolchain_diagnostics::{Diagnostic, Range, codes};
use z_toolchain_registry::{ParseMode, Registry, is_identifier};

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
///
/// ```ignore
/// ctx!("keyword" => kw, "parent" => parent)
/// ```
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

/// Iterate over `(zero-based line number, line)` pairs.
pub(crate) fn numbered_lines(text: &str) -> impl Iterator<Item = (u32, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (u32::try_from(i).unwrap_or(u32::MAX), line))
}

/// Checks documents against a registry.
#[derive(Debug, Clone, Copy)]
pub struct StructuralValidator<'a> {
    registry: &'a Registry,
    config: &'a CheckConfig,
}

impl<'a> StructuralValidator<'a> {
    /// Validator for `registry` honoring `config`.
    pub fn new(registry: &'a Registry, config: &'a CheckConfig) -> Self {
        Self { registry, config }
    }

    /// Validate a full document. Never fails; returns diagnostics in line order.
    pub fn validate(&self, text: &str) -> Vec<Diagnostic> {
        let mut stack = ContextStack::new(self.registry);
        let mut code = CodeBodyTracker::default();
        let mut out = DiagnosticCollector::new();
        let mut line_count = 0u32;

        for (number, raw) in numbered_lines(text) {
            line_count = number + 1;

            if self.skips_body(stack.current()) {
                if code.closes(raw) {
                    stack.pop();
                } else if let Some(el) = classify_code(raw, number).element() {
                    // Names are checked in code too; placement and scopes are not.
                    self.check_name(el, &mut out);
                }
                continue;
            }

            let event = classify(raw, number);
            match &event {
                LineEvent::CloseScope => {
                    stack.pop();
                }
                LineEvent::Element { element } => {
                    self.check_name(element, &mut out);
                    self.check_placement(element, false, &stack, &mut out);
                }
                LineEvent::Child { element, .. } => {
                    self.check_name(element, &mut out);
                    self.check_placement(element, true, &stack, &mut out);
                }
                LineEvent::Blank | LineEvent::Comment | LineEvent::Other => {}
            }

            if let Some(el) = event.element()
                && el.opens_body
            {
                stack.push(el.keyword, el.name, el.line);
                code.reset();
            }
        }

        tracing::debug!(
            lines = line_count,
            diagnostics = out.len(),
            open_scopes = stack.depth(),
            "structural validation finished"
        );
        out.into_diagnostics()
    }

    fn skips_body(&self, scope: Option<&ValidationContext>) -> bool {
        self.config.code_bodies == CodeBodies::Skip
            && scope.is_some_and(|s| s.mode == ParseMode::Code)
    }

    // ── Checks ───────────────────────────────────────────────────────────

    fn check_name(&self, el: &ParsedElement<'_>, out: &mut DiagnosticCollector) {
        let range = Range::on_line(el.line, el.name_start, el.name_end);
        if !is_identifier(el.name) {
            out.push(
                coded(
                    codes::INVALID_ELEMENT_NAME,
                    format!(
                        "invalid element name '{}': names must start with a letter and contain only letters, digits, '_' or '-'",
                        el.name
                    ),
                    range,
                )
                .with_context(ctx!("name" => el.name)),
            );
        } else if self.config.is_reserved(el.name) {
            out.push(
                coded(
                    codes::RESERVED_NAME,
                    format!("'{}' is a reserved name and cannot name an element", el.name),
                    range,
                )
                .with_context(ctx!("name" => el.name)),
            );
        }
    }

    fn check_placement(
        &self,
        el: &ParsedElement<'_>,
        child_shaped: bool,
        stack: &ContextStack<'_>,
        out: &mut DiagnosticCollector,
    ) {
        let range = Range::on_line(el.line, el.start_char, el.end_char);
        let Some(parent) = stack.current() else {
            if self.registry.is_valid_root(el.keyword) {
                return;
            }
            let expected = self.registry.valid_roots().join(", ");
            let diagnostic = if child_shaped {
                coded(
                    codes::NO_PARENT_CONTEXT,
                    format!(
                        "'{}' has no parent context; top-level elements must be one of: {expected}",
                        el.keyword
                    ),
                    range,
                )
            } else {
                coded(
                    codes::UNKNOWN_ROOT_ELEMENT,
                    format!(
                        "unknown root element '{}'; expected one of: {expected}",
                        el.keyword
                    ),
                    range,
                )
            };
            out.push(diagnostic.with_context(ctx!("keyword" => el.keyword, "expected" => expected)));
            return;
        };

        if parent.allowed_children.allows(el.keyword) {
            return;
        }
        let allowed = parent.allowed_children.describe();
        out.push(
            coded(
                codes::DISALLOWED_CHILD,
                format!(
                    "'{}' is not allowed inside '{}'; allowed: {allowed}",
                    el.keyword, parent.element_type
                ),
                range,
            )
            .with_context(ctx!(
                "keyword" => el.keyword,
                "parent" => parent.element_type.as_str(),
                "parentName" => parent.element_name.as_str(),
                "allowed" => allowed,
            )),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use z_toolchain_registry::load_registry_from_str;

    fn registry() -> Registry {
        load_registry_from_str(
            r#"{
              "root": { "keyword": "project" },
              "targets": {
                "next": { "allowedChildren": ["Routes", "Components"] },
                "rust": { "mode": "code" }
              },
              "namespaces": {
                "Routes": { "allowedChildren": ["*"] },
                "Components": { "allowedChildren": ["*"] }
              }
            }"#,
        )
        .unwrap()
    }

    fn check(text: &str) -> Vec<Diagnostic> {
        let r = registry();
        let c = CheckConfig::default();
        StructuralValidator::new(&r, &c).validate(text)
    }

    fn ids(diags: &[Diagnostic]) -> Vec<&str> {
        diags.iter().map(|d| &*d.id).collect()
    }

    #[test]
    fn nested_routes_are_accepted() {
        assert!(check("next App {\n  Routes {\n    home\n    [slug] {\n      edit\n    }\n  }\n}").is_empty());
    }

    #[test]
    fn root_marker_scopes_targets() {
        let d = check("project Acme {\n  next Web {\n  }\n  Routes {\n  }\n}");
        assert_eq!(ids(&d), [codes::DISALLOWED_CHILD]);
        assert_eq!(d[0].range.start.line, 3);
        assert!(d[0].message.contains("'project'"), "{}", d[0].message);
        assert!(d[0].message.ends_with("allowed: next, rust"), "{}", d[0].message);
    }

    #[test]
    fn child_shaped_root_is_no_parent_context() {
        let d = check("Routes {\n}");
        assert_eq!(ids(&d), [codes::NO_PARENT_CONTEXT]);
        assert!(d[0].message.contains("project, next, rust"));
    }

    #[test]
    fn child_shaped_valid_root_is_accepted() {
        assert!(check("next {\n  Routes\n}").is_empty());
    }

    #[test]
    fn one_line_can_carry_two_diagnostics() {
        let d = check("bogus class {\n}");
        assert_eq!(ids(&d), [codes::RESERVED_NAME, codes::UNKNOWN_ROOT_ELEMENT]);
        assert_eq!((d[0].range.start.character, d[0].range.end.character), (6, 11));
        assert_eq!((d[1].range.start.character, d[1].range.end.character), (0, 5));
    }

    #[test]
    fn code_body_skips_placement() {
        let text = "rust Core {\n  fn main() {\n    let class = 1;\n    Bogus {\n    }\n  }\n}\nnext App {\n}";
        assert!(check(text).is_empty());
    }

    #[test]
    fn code_body_still_checks_names() {
        let d = check("rust Core {\n  helper class\n  Bogus 9x {\n  }\n}");
        assert_eq!(ids(&d), [codes::RESERVED_NAME, codes::INVALID_ELEMENT_NAME]);
        assert_eq!(d[0].range.start.line, 1);
        assert_eq!(d[1].range.start.line, 2);
        assert_eq!((d[1].range.start.character, d[1].range.end.character), (8, 10));
    }

    #[test]
    fn code_body_closes_at_matching_brace() {
        let d = check("rust Core {\n  struct S {\n  }\n}\nbogus X");
        assert_eq!(ids(&d), [codes::UNKNOWN_ROOT_ELEMENT]);
        assert_eq!(d[0].range.start.line, 4);
    }

    #[test]
    fn code_body_validated_on_request() {
        let r = registry();
        let c = CheckConfig {
            code_bodies: CodeBodies::Validate,
            ..CheckConfig::default()
        };
        let d = StructuralValidator::new(&r, &c).validate("rust Core {\n  helper util\n}");
        assert_eq!(ids(&d), [codes::DISALLOWED_CHILD]);
        assert!(d[0].message.ends_with("allowed: (none)"));
    }

    #[test]
    fn disallowed_child_context() {
        let d = check("next App {\n  Api {\n  }\n}");
        let ctx = d[0].context.as_ref().unwrap();
        assert_eq!(ctx["keyword"], "Api");
        assert_eq!(ctx["parent"], "next");
        assert_eq!(ctx["parentName"], "App");
        assert_eq!(ctx["allowed"], "Routes, Components");
    }

    #[test]
    fn extra_reserved_names_from_config() {
        let r = registry();
        let c = CheckConfig {
            reserved_names: vec!["async".into()],
            ..CheckConfig::default()
        };
        let d = StructuralValidator::new(&r, &c).validate("next async {\n}");
        assert_eq!(ids(&d), [codes::RESERVED_NAME]);
    }

    #[test]
    fn numbered_lines_handles_crlf() {
        let lines: Vec<_> = numbered_lines("a\r\nb\n").collect();
        assert_eq!(lines, [(0, "a"), (1, "b")]);
    }
}
