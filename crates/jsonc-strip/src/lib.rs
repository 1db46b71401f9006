//! JSONC preprocessing shared by the registry, config, and diagnostics build.
//!
//! Registry and config files are hand-edited, so they may carry:
//! - `//` line comments
//! - `/* ... */` block comments
//! - trailing commas before `}` or `]`
//!
//! [`strip_jsonc`] rewrites all of these to whitespace so the result parses as
//! plain JSON while every remaining token keeps its original line and column.
//! That keeps `serde_json` error positions meaningful for the original file.

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    Str,
    StrEscape,
    LineComment,
    BlockComment,
}

/// Strip comments and trailing commas from JSONC input.
///
/// Removed bytes are replaced with spaces (newlines are kept), so line and
/// column positions of the surviving JSON are unchanged. Comment-like text
/// and commas inside string literals are preserved.
#[must_use]
pub fn strip_jsonc(input: &str) -> String {
    let bytes = blank_comments(input.as_bytes());
    let bytes = blank_trailing_commas(bytes);
    // Only ASCII bytes were overwritten (with ASCII spaces), so the buffer is
    // still valid UTF-8.
    String::from_utf8_lossy(&bytes).into_owned()
}

fn blank_comments(src: &[u8]) -> Vec<u8> {
    let mut out = src.to_vec();
    let mut state = State::Code;
    let mut i = 0usize;

    while i < src.len() {
        let b = src[i];
        match state {
            State::Code => match b {
                b'"' => state = State::Str,
                b'/' if src.get(i + 1) == Some(&b'/') => {
                    state = State::LineComment;
                    out[i] = b' ';
                    out[i + 1] = b' ';
                    i += 1;
                }
                b'/' if src.get(i + 1) == Some(&b'*') => {
                    state = State::BlockComment;
                    out[i] = b' ';
                    out[i + 1] = b' ';
                    i += 1;
                }
                _ => {}
            },
            State::Str => match b {
                b'\\' => state = State::StrEscape,
                b'"' => state = State::Code,
                _ => {}
            },
            State::StrEscape => state = State::Str,
            State::LineComment => {
                if b == b'\n' {
                    state = State::Code;
                } else {
                    out[i] = b' ';
                }
            }
            State::BlockComment => {
                if b == b'*' && src.get(i + 1) == Some(&b'/') {
                    out[i] = b' ';
                    out[i + 1] = b' ';
                    state = State::Code;
                    i += 1;
                } else if b != b'\n' {
                    out[i] = b' ';
                }
            }
        }
        i += 1;
    }
    out
}

fn blank_trailing_commas(mut buf: Vec<u8>) -> Vec<u8> {
    let mut in_str = false;
    let mut escaped = false;
    let mut pending_comma: Option<usize> = None;

    for i in 0..buf.len() {
        let b = buf[i];
        if in_str {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_str = false;
            }
            continue;
        }
        match b {
            b'"' => {
                in_str = true;
                pending_comma = None;
            }
            b',' => pending_comma = Some(i),
            b'}' | b']' => {
                if let Some(at) = pending_comma.take() {
                    buf[at] = b' ';
                }
            }
            b if b.is_ascii_whitespace() => {}
            _ => pending_comma = None,
        }
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::strip_jsonc;

    #[test]
    fn strips_line_and_block_comments() {
        let input = r#"
{
  // targets follow
  "a": 1, /* inline */ "b": 2
}
"#;
        let stripped = strip_jsonc(input);
        assert!(!stripped.contains("targets follow"));
        assert!(!stripped.contains("inline"));
        let v: serde_json::Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(v["a"], 1);
        assert_eq!(v["b"], 2);
    }

    #[test]
    fn preserves_comment_like_text_in_strings() {
        let input = r#"{ "url": "http://example.com/*x*/", "note":"//keep" }"#;
        let stripped = strip_jsonc(input);
        assert!(stripped.contains("http://example.com/*x*/"));
        assert!(stripped.contains("\"note\":\"//keep\""));
    }

    #[test]
    fn removes_trailing_commas_before_closers() {
        let input = "{ \"a\": [1, 2,], \"b\": { \"c\": 3, },\n}";
        let stripped = strip_jsonc(input);
        assert_eq!(stripped, "{ \"a\": [1, 2 ], \"b\": { \"c\": 3  } \n}");
    }

    #[test]
    fn trailing_comma_followed_by_comment_is_removed() {
        let input = "[1, // last\n]";
        let stripped = strip_jsonc(input);
        assert!(!stripped.contains(','));
        assert_eq!(stripped.lines().count(), 2);
    }

    #[test]
    fn commas_inside_strings_are_kept() {
        let input = r#"{ "list": "a,}", "esc": "q\",]" }"#;
        assert_eq!(strip_jsonc(input), input);
    }

    #[test]
    fn keeps_line_positions_stable() {
        let input = "{\n  /* one\n     two */\n  \"k\": true\n}";
        let stripped = strip_jsonc(input);
        assert_eq!(stripped.lines().count(), input.lines().count());
        let line = stripped.lines().nth(3).unwrap_or_default();
        assert_eq!(line, "  \"k\": true");
    }

    #[test]
    fn multibyte_text_survives() {
        let input = "{ \"d\": \"café\" /* é */ }";
        let stripped = strip_jsonc(input);
        assert!(stripped.contains("café"));
        assert!(!stripped.contains("/*"));
    }
}
