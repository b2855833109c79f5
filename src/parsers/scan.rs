//! Balanced-delimiter scanning over source text that may contain string literals.
//!
//! Delimiters and separators inside single, double, or triple quoted strings are
//! ignored. Positions are byte offsets; every delimiter is ASCII so offsets always
//! fall on character boundaries.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    Single(u8),
    Triple(u8),
}

/// Byte iterator that knows whether each byte is code or string content.
struct CodeBytes<'a> {
    bytes: &'a [u8],
    pos: usize,
    quote: Option<Quote>,
}

impl<'a> CodeBytes<'a> {
    fn new(src: &'a str, start: usize) -> Self {
        Self {
            bytes: src.as_bytes(),
            pos: start,
            quote: None,
        }
    }

    fn starts_triple(&self, at: usize, q: u8) -> bool {
        self.bytes.len() >= at + 3 && self.bytes[at..at + 3] == [q, q, q]
    }
}

impl<'a> Iterator for CodeBytes<'a> {
    /// (offset, byte, is_code)
    type Item = (usize, u8, bool);

    fn next(&mut self) -> Option<Self::Item> {
        let at = self.pos;
        let b = *self.bytes.get(at)?;
        self.pos += 1;
        match self.quote {
            None => {
                if b == b'"' || b == b'\'' {
                    if self.starts_triple(at, b) {
                        self.pos = at + 3;
                        self.quote = Some(Quote::Triple(b));
                    } else {
                        self.quote = Some(Quote::Single(b));
                    }
                    return Some((at, b, false));
                }
                Some((at, b, true))
            }
            Some(quote) => {
                if b == b'\\' {
                    self.pos += 1;
                    return Some((at, b, false));
                }
                match quote {
                    Quote::Single(q) if b == q || b == b'\n' => self.quote = None,
                    Quote::Triple(q) if b == q && self.starts_triple(at, q) => {
                        self.pos = at + 3;
                        self.quote = None;
                    }
                    _ => {}
                }
                Some((at, b, false))
            }
        }
    }
}

/// Remove `#` comments that start outside string literals.
pub fn strip_line_comments(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut copied = 0;
    let mut iter = CodeBytes::new(src, 0);
    while let Some((at, b, is_code)) = iter.next() {
        if is_code && b == b'#' {
            out.push_str(&src[copied..at]);
            let end = src[at..].find('\n').map(|i| at + i).unwrap_or(src.len());
            copied = end;
            iter.pos = end;
        }
    }
    out.push_str(&src[copied..]);
    out
}

fn closer_for(open: u8) -> Option<u8> {
    match open {
        b'{' => Some(b'}'),
        b'[' => Some(b']'),
        b'(' => Some(b')'),
        _ => None,
    }
}

/// Offset of the delimiter closing the one at `open_at`, or None when unbalanced.
pub fn find_matching(src: &str, open_at: usize) -> Option<usize> {
    let first = *src.as_bytes().get(open_at)?;
    let mut stack = vec![closer_for(first)?];
    for (at, b, is_code) in CodeBytes::new(src, open_at + 1) {
        if !is_code {
            continue;
        }
        if let Some(closer) = closer_for(b) {
            stack.push(closer);
        } else if matches!(b, b'}' | b']' | b')') {
            if stack.pop() != Some(b) {
                return None;
            }
            if stack.is_empty() {
                return Some(at);
            }
        }
    }
    None
}

/// Split on `sep` where it appears at nesting depth zero outside strings.
pub fn split_top_level(src: &str, sep: u8) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth: usize = 0;
    let mut start = 0;
    for (at, b, is_code) in CodeBytes::new(src, 0) {
        if !is_code {
            continue;
        }
        match b {
            b'{' | b'[' | b'(' => depth += 1,
            b'}' | b']' | b')' => depth = depth.saturating_sub(1),
            _ if b == sep && depth == 0 => {
                parts.push(&src[start..at]);
                start = at + 1;
            }
            _ => {}
        }
    }
    parts.push(&src[start..]);
    parts
}

/// Split at the first top-level occurrence of `sep`.
pub fn split_once_top_level(src: &str, sep: u8) -> Option<(&str, &str)> {
    let mut depth: usize = 0;
    for (at, b, is_code) in CodeBytes::new(src, 0) {
        if !is_code {
            continue;
        }
        match b {
            b'{' | b'[' | b'(' => depth += 1,
            b'}' | b']' | b')' => depth = depth.saturating_sub(1),
            _ if b == sep && depth == 0 => return Some((&src[..at], &src[at + 1..])),
            _ => {}
        }
    }
    None
}

/// Contents of a single- or double-quoted literal, if `src` is exactly one.
pub fn unquote(src: &str) -> Option<&str> {
    let src = src.trim();
    let bytes = src.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' || first == b'\'') && first == last {
            return Some(&src[1..src.len() - 1]);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strip_comments_outside_strings() {
        let src = "a = 1  # note\nb = \"#not a comment\"  # real\n";
        assert_eq!(strip_line_comments(src), "a = 1  \nb = \"#not a comment\"  \n");
    }

    #[test]
    fn test_find_matching_skips_braces_in_strings() {
        let src = r#"{"a": "}", "b": {"c": [1, 2]}} tail"#;
        let end = find_matching(src, 0).unwrap();
        assert_eq!(&src[end + 1..], " tail");
    }

    #[test]
    fn test_find_matching_unbalanced() {
        assert_eq!(find_matching("{ [ }", 0), None);
        assert_eq!(find_matching("{ \"a\": 1", 0), None);
        assert_eq!(find_matching("x", 0), None);
    }

    #[test]
    fn test_triple_quoted_strings() {
        let src = "{\"doc\": \"\"\"has } and\n{ inside\"\"\"}";
        assert_eq!(find_matching(src, 0), Some(src.len() - 1));
    }

    #[test]
    fn test_split_top_level() {
        let parts = split_top_level(r#""a": {"x": 1, "y": 2}, "b": [1, 2], "c": "p,q""#, b',');
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].trim(), r#""c": "p,q""#);
    }

    #[test]
    fn test_split_once_top_level() {
        let (k, v) = split_once_top_level(r#""key": {"n": 1}"#, b':').unwrap();
        assert_eq!(unquote(k), Some("key"));
        assert_eq!(v.trim(), r#"{"n": 1}"#);
    }

    proptest! {
        #[test]
        fn prop_scanners_never_panic(src in "\\PC{0,200}") {
            let _ = strip_line_comments(&src);
            let _ = split_top_level(&src, b',');
            for (i, _) in src.char_indices() {
                let _ = find_matching(&src, i);
            }
        }

        #[test]
        fn prop_nested_lists_match(depth in 1usize..20) {
            let src = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
            prop_assert_eq!(find_matching(&src, 0), Some(src.len() - 1));
        }
    }
}
