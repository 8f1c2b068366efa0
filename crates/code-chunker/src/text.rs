use regex::Regex;
use std::sync::OnceLock;

/// Words that look like calls but are control flow or builtins.
const NON_CALL_WORDS: &[&str] = &[
    "if", "for", "while", "switch", "return", "let", "var", "guard", "do", "try", "catch",
    "print", "when", "fun", "func", "init",
];

fn call_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b([A-Za-z0-9_]+)\s*\(").expect("valid regex"))
}

/// Replace `\r\n` and lone `\r` with `\n`
pub fn normalize_newlines(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// 1-indexed line containing `offset`; offsets past the end clamp to the last line
pub fn line_at_byte_offset(source: &[u8], offset: usize) -> usize {
    let end = offset.min(source.len());
    source[..end].iter().filter(|b| **b == b'\n').count() + 1
}

/// Slice `[offset, offset + length)` out of `source`, clamped to its bounds
pub fn byte_slice(source: &[u8], offset: usize, length: usize) -> String {
    let start = offset.min(source.len());
    let end = offset.saturating_add(length).min(source.len());
    String::from_utf8_lossy(&source[start..end]).into_owned()
}

/// Names invoked as `name(` inside `body`, first-appearance order, no duplicates.
///
/// `own_name` and control words are skipped.
pub fn extract_calls(body: &str, own_name: &str) -> Vec<String> {
    let mut calls: Vec<String> = Vec::new();
    for caps in call_regex().captures_iter(body) {
        let name = &caps[1];
        if name == own_name
            || NON_CALL_WORDS.contains(&name)
            || name.chars().all(|c| c.is_ascii_digit())
        {
            continue;
        }
        if !calls.iter().any(|c| c == name) {
            calls.push(name.to_string());
        }
    }
    calls
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_newlines() {
        assert_eq!(normalize_newlines("a\r\nb\rc\n"), "a\nb\nc\n");
        assert_eq!(normalize_newlines("plain"), "plain");
    }

    #[test]
    fn test_line_at_byte_offset() {
        let src = b"one\ntwo\nthree";
        assert_eq!(line_at_byte_offset(src, 0), 1);
        assert_eq!(line_at_byte_offset(src, 4), 2);
        assert_eq!(line_at_byte_offset(src, 8), 3);
        assert_eq!(line_at_byte_offset(src, 999), 3);
    }

    #[test]
    fn test_extract_calls_dedups_and_skips_keywords() {
        let body = "func load() {\n  if (ready) { fetch(url); parse(data) }\n  fetch(other)\n  print(x)\n  load()\n}";
        assert_eq!(extract_calls(body, "load"), vec!["fetch", "parse"]);
    }

    #[test]
    fn test_byte_slice_clamps() {
        assert_eq!(byte_slice(b"abcdef", 2, 3), "cde");
        assert_eq!(byte_slice(b"abc", 2, 10), "c");
        assert_eq!(byte_slice(b"abc", 10, 1), "");
    }
}
