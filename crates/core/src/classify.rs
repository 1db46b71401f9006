//! Line classification.
//!
//! Every physical line of a Z document is classified on its own, without
//! context, into a [`LineEvent`]. Classification is an ordered list of named
//! matchers ([`MATCHERS`]); the first matcher that accepts the trimmed line
//! decides the event. A line no matcher accepts is [`LineEvent::Other`].
//!
//! All positions are zero-based and count characters, not bytes.

use serde::Serialize;

/// A declaration parsed from one line.
///
/// `keyword` and `name` borrow from the source line. For child declarations
/// the keyword and the name are the same token (with `[dynamic]` brackets
/// removed from the name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedElement<'a> {
    /// Element kind (`next`, `Routes`, `home`, ...).
    pub keyword: &'a str,
    /// Element name (`App`, `home`, `slug`, ...).
    pub name: &'a str,
    /// Zero-based line number.
    pub line: u32,
    /// First character of the keyword token.
    pub start_char: u32,
    /// One past the last character of the keyword token.
    pub end_char: u32,
    /// First character of the name token.
    pub name_start: u32,
    /// One past the last character of the name token.
    pub name_end: u32,
    /// Count of leading whitespace characters.
    pub indent: u32,
    /// Approximate nesting depth (`indent / 2`). Informational only.
    pub depth: u32,
    /// `true` when the line leaves a `{` body open.
    pub opens_body: bool,
}

/// Shape of a single-token child declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildKind {
    /// Plain lowercase-style child (`home`).
    Bare,
    /// Bracketed dynamic segment (`[slug]`).
    Dynamic,
    /// Capitalized, namespace-style child (`Routes`).
    Namespace,
}

/// Classification of one source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum LineEvent<'a> {
    /// Empty or whitespace-only line.
    Blank,
    /// `//` comment line.
    Comment,
    /// A line consisting of exactly `}`.
    CloseScope,
    /// `<keyword> <name> [{...]`.
    Element {
        /// The parsed declaration.
        element: ParsedElement<'a>,
    },
    /// A single child token, optionally followed by a body.
    Child {
        /// The parsed declaration.
        element: ParsedElement<'a>,
        /// Which child shape matched.
        kind: ChildKind,
    },
    /// Anything else: text, embedded expressions, unrecognized syntax.
    Other,
}

impl<'a> LineEvent<'a> {
    /// The parsed declaration carried by element and child events.
    pub fn element(&self) -> Option<&ParsedElement<'a>> {
        match self {
            LineEvent::Element { element } | LineEvent::Child { element, .. } => Some(element),
            _ => None,
        }
    }

    /// `true` for lines that neither declare nor close anything.
    pub fn is_noop(&self) -> bool {
        matches!(self, LineEvent::Blank | LineEvent::Comment | LineEvent::Other)
    }
}

/// A line prepared for the matchers.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    /// Line with surrounding whitespace removed.
    pub trimmed: &'a str,
    /// Zero-based line number.
    pub number: u32,
    /// Leading whitespace, in characters.
    pub indent: u32,
}

impl<'a> Line<'a> {
    /// Prepare `raw` (one line, without its terminator) for matching.
    pub fn new(raw: &'a str, number: u32) -> Self {
        let start = raw.trim_start();
        let indent = char_len(&raw[..raw.len() - start.len()]);
        Self {
            trimmed: start.trim_end(),
            number,
            indent,
        }
    }

    /// Character column of byte offset `byte` within `trimmed`.
    fn column(&self, byte: usize) -> u32 {
        self.indent + char_len(&self.trimmed[..byte])
    }

    /// Byte offset of `part` (a subslice of `trimmed`) within `trimmed`.
    fn offset_of(&self, part: &str) -> usize {
        part.as_ptr() as usize - self.trimmed.as_ptr() as usize
    }
}

/// A named line matcher.
pub type Matcher = for<'a> fn(&Line<'a>) -> Option<LineEvent<'a>>;

/// Matchers in priority order. The first one returning `Some` wins.
pub const MATCHERS: &[(&str, Matcher)] = &[
    ("blank", match_blank),
    ("comment", match_comment),
    ("close_scope", match_close_scope),
    ("element", match_element),
    ("bare_child", match_bare_child),
    ("namespace_child", match_namespace_child),
];

/// Matchers used inside embedded code bodies. Element names are strict
/// tokens there, so calls and signatures (`fn main() {`) stay [`LineEvent::Other`].
pub const CODE_MATCHERS: &[(&str, Matcher)] = &[
    ("blank", match_blank),
    ("comment", match_comment),
    ("close_scope", match_close_scope),
    ("element", match_code_element),
    ("bare_child", match_bare_child),
    ("namespace_child", match_namespace_child),
];

/// Classify one raw line. Never fails; unmatched lines are [`LineEvent::Other`].
pub fn classify(raw: &str, number: u32) -> LineEvent<'_> {
    classify_with(MATCHERS, raw, number)
}

/// Classify one line of an embedded code body (see [`CODE_MATCHERS`]).
pub fn classify_code(raw: &str, number: u32) -> LineEvent<'_> {
    classify_with(CODE_MATCHERS, raw, number)
}

fn classify_with<'a>(matchers: &[(&str, Matcher)], raw: &'a str, number: u32) -> LineEvent<'a> {
    let line = Line::new(raw, number);
    matchers
        .iter()
        .find_map(|(_, matcher)| matcher(&line))
        .unwrap_or(LineEvent::Other)
}

// ── Matchers ─────────────────────────────────────────────────────────────

fn match_blank<'a>(line: &Line<'a>) -> Option<LineEvent<'a>> {
    line.trimmed.is_empty().then_some(LineEvent::Blank)
}

fn match_comment<'a>(line: &Line<'a>) -> Option<LineEvent<'a>> {
    line.trimmed.starts_with("//").then_some(LineEvent::Comment)
}

fn match_close_scope<'a>(line: &Line<'a>) -> Option<LineEvent<'a>> {
    (line.trimmed == "}").then_some(LineEvent::CloseScope)
}

/// `<keyword> <name> [{...]`: keyword is a strict identifier, the name is
/// everything up to whitespace or `{` (checked later by the validator).
fn match_element<'a>(line: &Line<'a>) -> Option<LineEvent<'a>> {
    declaration(line, take_name)
}

fn match_code_element<'a>(line: &Line<'a>) -> Option<LineEvent<'a>> {
    declaration(line, take_token)
}

fn declaration<'a>(line: &Line<'a>, split_name: fn(&str) -> (&str, &str)) -> Option<LineEvent<'a>> {
    let (keyword, rest) = take_identifier(line.trimmed)?;
    let after_ws = rest.trim_start();
    if after_ws.len() == rest.len() {
        return None;
    }
    let (name, rest) = split_name(after_ws);
    if name.is_empty() {
        return None;
    }
    let opens_body = body_opens(rest)?;

    let key_at = line.offset_of(keyword);
    let name_at = line.offset_of(name);
    let element = ParsedElement {
        keyword,
        name,
        line: line.number,
        start_char: line.column(key_at),
        end_char: line.column(key_at + keyword.len()),
        name_start: line.column(name_at),
        name_end: line.column(name_at + name.len()),
        indent: line.indent,
        depth: line.indent / 2,
        opens_body,
    };
    Some(LineEvent::Element { element })
}

/// Single token not starting with an uppercase letter: `home`, `[slug]`.
fn match_bare_child<'a>(line: &Line<'a>) -> Option<LineEvent<'a>> {
    let first = line.trimmed.chars().next()?;
    if first.is_uppercase() {
        return None;
    }
    child(line)
}

/// Single capitalized token: `Routes {`.
fn match_namespace_child<'a>(line: &Line<'a>) -> Option<LineEvent<'a>> {
    let first = line.trimmed.chars().next()?;
    if !first.is_uppercase() {
        return None;
    }
    child(line)
}

fn child<'a>(line: &Line<'a>) -> Option<LineEvent<'a>> {
    let (token, rest) = take_token(line.trimmed);
    if token.is_empty() {
        return None;
    }
    let opens_body = body_opens(rest)?;

    let (name, kind) = match token.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        Some(inner) => (inner, ChildKind::Dynamic),
        None if token.starts_with(char::is_uppercase) => (token, ChildKind::Namespace),
        None => (token, ChildKind::Bare),
    };

    let token_at = line.offset_of(token);
    let name_at = line.offset_of(name);
    let element = ParsedElement {
        keyword: name,
        name,
        line: line.number,
        start_char: line.column(token_at),
        end_char: line.column(token_at + token.len()),
        name_start: line.column(name_at),
        name_end: line.column(name_at + name.len()),
        indent: line.indent,
        depth: line.indent / 2,
        opens_body,
    };
    Some(LineEvent::Child { element, kind })
}

// ── Token helpers ────────────────────────────────────────────────────────

/// `true` if `c` can appear in a declaration token.
fn is_token_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '{' | '}' | '(' | ')' | '<' | '>' | ';' | ':' | '=' | '"' | '\'' | '`' | ',')
}

/// Split a leading `[A-Za-z][A-Za-z0-9_-]*` identifier off `s`.
fn take_identifier(s: &str) -> Option<(&str, &str)> {
    if !s.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    let end = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(s.len());
    Some(s.split_at(end))
}

/// Split everything up to whitespace or `{` off `s` (possibly empty).
fn take_name(s: &str) -> (&str, &str) {
    let end = s
        .find(|c: char| c.is_whitespace() || c == '{')
        .unwrap_or(s.len());
    s.split_at(end)
}

/// Split the leading run of token characters off `s` (possibly empty).
fn take_token(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !is_token_char(c)).unwrap_or(s.len());
    s.split_at(end)
}

/// Interpret what follows a declaration.
///
/// Returns `None` when the remainder is neither empty nor a `{` body (the
/// line is not a declaration), otherwise whether a body is left open.
/// A trailing `//` comment is ignored.
fn body_opens(rest: &str) -> Option<bool> {
    let rest = rest.trim_start();
    if rest.is_empty() || rest.starts_with("//") {
        return Some(false);
    }
    if !rest.starts_with('{') {
        return None;
    }
    let code = rest.find("//").map_or(rest, |at| &rest[..at]);
    Some(brace_balance(code) > 0)
}

/// Net count of `{` minus `}` in `s`.
pub fn brace_balance(s: &str) -> i64 {
    s.chars().fold(0, |n, c| match c {
        '{' => n + 1,
        '}' => n - 1,
        _ => n,
    })
}

fn char_len(s: &str) -> u32 {
    u32::try_from(s.chars().count()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(raw: &str) -> ParsedElement<'_> {
        match classify(raw, 0) {
            LineEvent::Element { element } => element,
            other => panic!("expected element for {raw:?}, got {other:?}"),
        }
    }

    fn matched_by(raw: &str) -> Option<&'static str> {
        let line = Line::new(raw, 0);
        MATCHERS
            .iter()
            .find(|(_, matcher)| matcher(&line).is_some())
            .map(|(name, _)| *name)
    }

    fn child_of(raw: &str) -> (ParsedElement<'_>, ChildKind) {
        match classify(raw, 0) {
            LineEvent::Child { element, kind } => (element, kind),
            other => panic!("expected child for {raw:?}, got {other:?}"),
        }
    }

    #[test]
    fn blank_and_comment_lines_are_noops() {
        assert_eq!(classify("", 0), LineEvent::Blank);
        assert_eq!(classify("   \t ", 0), LineEvent::Blank);
        assert_eq!(classify("  // next App {", 0), LineEvent::Comment);
        assert!(classify("// x", 0).is_noop());
    }

    #[test]
    fn close_scope_must_be_exact() {
        assert_eq!(classify("  }  ", 0), LineEvent::CloseScope);
        assert_eq!(classify("};", 0), LineEvent::Other);
        assert_eq!(classify("} else {", 0), LineEvent::Other);
    }

    #[test]
    fn element_with_body() {
        let e = element("next App {");
        assert_eq!((e.keyword, e.name), ("next", "App"));
        assert_eq!((e.start_char, e.end_char), (0, 4));
        assert_eq!((e.name_start, e.name_end), (5, 8));
        assert!(e.opens_body);
    }

    #[test]
    fn element_without_body() {
        let e = element("    page about");
        assert!(!e.opens_body);
        assert_eq!(e.indent, 4);
        assert_eq!(e.depth, 2);
        assert_eq!(e.start_char, 4);
        assert_eq!(e.name_start, 9);
    }

    #[test]
    fn element_body_closed_on_same_line_does_not_open() {
        assert!(!element("Layout main { }").opens_body);
        assert!(element("Layout main { inner {").opens_body);
    }

    #[test]
    fn element_trailing_comment_is_ignored() {
        assert!(element("next App { // web app").opens_body);
        assert!(!element("page about // static").opens_body);
    }

    #[test]
    fn element_name_is_loose_for_later_checking() {
        assert_eq!(element("next 9App {").name, "9App");
        assert_eq!(element("next my.app").name, "my.app");
        assert_eq!(element("next café {").name, "café");
        assert_eq!(element("next my:app {").name, "my:app");
        let e = element("next App(x) {");
        assert_eq!(e.name, "App(x)");
        assert!(e.opens_body);
    }

    #[test]
    fn element_rejects_non_body_remainder() {
        assert_eq!(classify("return x + y", 0), LineEvent::Other);
        assert_eq!(matched_by("next App (x)"), None);
    }

    #[test]
    fn code_lines_use_strict_names() {
        assert_eq!(classify_code("fn main() {", 0), LineEvent::Other);
        assert_eq!(classify_code("let x: u32 = 1;", 0), LineEvent::Other);
        assert_eq!(classify_code("println!(\"hi\");", 0), LineEvent::Other);
        assert_eq!(element("fn main() {").name, "main()");

        match classify_code("  helper class", 0) {
            LineEvent::Element { element } => assert_eq!(element.name, "class"),
            other => panic!("expected element, got {other:?}"),
        }
        match classify_code("Bogus 9x {", 0) {
            LineEvent::Element { element } => {
                assert_eq!(element.name, "9x");
                assert!(element.opens_body);
            }
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn bare_child() {
        let (e, kind) = child_of("    home");
        assert_eq!(kind, ChildKind::Bare);
        assert_eq!((e.keyword, e.name), ("home", "home"));
        assert_eq!((e.start_char, e.end_char), (4, 8));
        assert!(!e.opens_body);
    }

    #[test]
    fn dynamic_child_strips_brackets() {
        let (e, kind) = child_of("  [slug] {");
        assert_eq!(kind, ChildKind::Dynamic);
        assert_eq!(e.name, "slug");
        assert_eq!((e.start_char, e.end_char), (2, 8));
        assert_eq!((e.name_start, e.name_end), (3, 7));
        assert!(e.opens_body);
    }

    #[test]
    fn namespace_child() {
        let (e, kind) = child_of("  Routes {");
        assert_eq!(kind, ChildKind::Namespace);
        assert_eq!(e.keyword, "Routes");
        assert!(e.opens_body);
        assert_eq!(matched_by("  Routes {"), Some("namespace_child"));
    }

    #[test]
    fn capitalized_two_token_line_is_an_element() {
        let e = element("Routes Main {");
        assert_eq!(e.keyword, "Routes");
        assert_eq!(matched_by("Routes Main {"), Some("element"));
    }

    #[test]
    fn child_without_space_before_brace() {
        let (e, _) = child_of("next{");
        assert_eq!(e.keyword, "next");
        assert!(e.opens_body);
    }

    #[test]
    fn markup_like_text_is_other() {
        assert_eq!(classify("<div className=\"x\">", 0), LineEvent::Other);
        assert_eq!(classify("{children}", 0), LineEvent::Other);
        assert_eq!(classify("x = 1;", 0), LineEvent::Other);
    }

    #[test]
    fn columns_count_characters() {
        let e = element("\u{3000}next Ünïcode {");
        assert_eq!(e.indent, 1);
        assert_eq!((e.start_char, e.end_char), (1, 5));
        assert_eq!((e.name_start, e.name_end), (6, 13));
    }

    #[test]
    fn matcher_order_is_stable() {
        let names: Vec<_> = MATCHERS.iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            ["blank", "comment", "close_scope", "element", "bare_child", "namespace_child"]
        );
    }

    #[test]
    fn brace_balance_counts() {
        assert_eq!(brace_balance("{ { }"), 1);
        assert_eq!(brace_balance("} else {"), 0);
        assert_eq!(brace_balance("})"), -1);
    }
}
