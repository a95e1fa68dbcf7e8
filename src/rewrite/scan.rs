//! Boundary-aware reference scanner.
//!
//! A mapped path is only rewritten where it reads as a reference:
//!
//! ```text
//! src="assets/app.js"     ✓  `"` … `"`
//! url(../img/logo.png)    ✓  `(` … `)`, relative prefix kept
//! <img src=logo.png>      ✓  `=` … `>`
//! myapp.jsx / "myapp.js"  ✗  not delimited
//! ```
//!
//! Left of the key, walking backwards, the first delimiter or whitespace
//! must be one of `" ' ( =`. Whatever sits between it and the key is the
//! reference's directory prefix: it may only climb or anchor (`/`, `./`,
//! `../`), never name a directory, so `vendor/app.js` or
//! `https://cdn.example.com/app.js` never match a mapped `app.js`. Right of
//! the key must come one of `" ' ) >` or whitespace.
//!
//! Without a prepend only the key itself is replaced. With a prepend the
//! prefix and key are replaced by `prepend + fingerprinted`.

use std::borrow::Cow;
use std::collections::BTreeMap;

const LEFT_DELIMITERS: [char; 4] = ['"', '\'', '(', '='];
const RIGHT_DELIMITERS: [char; 4] = ['"', '\'', ')', '>'];

#[inline]
fn is_right_delimiter(c: char) -> bool {
    RIGHT_DELIMITERS.contains(&c) || c.is_whitespace()
}

/// A matched reference: bytes `start..end` become `entries[entry].1`.
#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
    entry: usize,
}

/// Rewrites references to mapped paths inside text.
#[derive(Debug, Clone, Default)]
pub struct ReferenceRewriter {
    /// (original, fingerprinted), longest original first.
    entries: Vec<(String, String)>,
    prepend: String,
}

impl ReferenceRewriter {
    pub fn new(mapping: &BTreeMap<String, String>, prepend: impl Into<String>) -> Self {
        let prepend = prepend.into();
        let mut entries: Vec<_> = mapping
            .iter()
            .filter(|(from, to)| !from.is_empty() && (from != to || !prepend.is_empty()))
            .map(|(from, to)| (from.clone(), to.clone()))
            .collect();
        // Longer keys claim their span before any key they contain
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        Self { entries, prepend }
    }

    /// Nothing to rewrite.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrite every delimited reference in `text`.
    ///
    /// Returns `Cow::Borrowed` when nothing matched.
    pub fn rewrite<'t>(&self, text: &'t str) -> Cow<'t, str> {
        let spans = self.find_spans(text);
        if spans.is_empty() {
            return Cow::Borrowed(text);
        }

        let mut out = String::with_capacity(text.len() + spans.len() * 40);
        let mut cursor = 0;
        for span in spans {
            out.push_str(&text[cursor..span.start]);
            out.push_str(&self.prepend);
            out.push_str(&self.entries[span.entry].1);
            cursor = span.end;
        }
        out.push_str(&text[cursor..]);
        Cow::Owned(out)
    }

    /// Non-overlapping spans sorted by start.
    fn find_spans(&self, text: &str) -> Vec<Span> {
        // start -> span, for overlap checks against accepted neighbours
        let mut accepted: BTreeMap<usize, Span> = BTreeMap::new();

        for (entry, (key, _)) in self.entries.iter().enumerate() {
            for (start, _) in text.match_indices(key.as_str()) {
                let end = start + key.len();
                let Some(span) = self.delimited(text, start, end, entry) else {
                    continue;
                };
                if !overlaps(&accepted, &span) {
                    accepted.insert(span.start, span);
                }
            }
        }

        accepted.into_values().collect()
    }

    /// Check the boundary rules around `text[start..end]`.
    fn delimited(&self, text: &str, start: usize, end: usize, entry: usize) -> Option<Span> {
        let right = text[end..].chars().next()?;
        if !is_right_delimiter(right) {
            return None;
        }

        let (left, delim) = text[..start]
            .char_indices()
            .rev()
            .find(|&(_, c)| LEFT_DELIMITERS.contains(&c) || is_right_delimiter(c))?;
        if !LEFT_DELIMITERS.contains(&delim) {
            return None;
        }

        let prefix_start = left + delim.len_utf8();
        let prefix = &text[prefix_start..start];
        if !is_anchor_prefix(prefix) {
            return None;
        }

        let start = if self.prepend.is_empty() {
            start
        } else {
            prefix_start
        };
        Some(Span { start, end, entry })
    }
}

/// Empty, or only `/`, `.` and `..` segments ending in `/`.
fn is_anchor_prefix(prefix: &str) -> bool {
    let Some(dirs) = prefix.strip_suffix('/') else {
        return prefix.is_empty();
    };
    dirs.split('/').all(|seg| matches!(seg, "" | "." | ".."))
}

fn overlaps(accepted: &BTreeMap<usize, Span>, span: &Span) -> bool {
    let before = accepted.range(..=span.start).next_back();
    let after = accepted.range(span.start..).next();
    before.is_some_and(|(_, b)| b.end > span.start) || after.is_some_and(|(_, a)| a.start < span.end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewriter(pairs: &[(&str, &str)], prepend: &str) -> ReferenceRewriter {
        let mapping = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ReferenceRewriter::new(&mapping, prepend)
    }

    #[test]
    fn test_quoted_references() {
        let r = rewriter(&[("app.js", "app-abc.js")], "");
        assert_eq!(
            r.rewrite(r#"<script src="app.js"></script>"#),
            r#"<script src="app-abc.js"></script>"#
        );
        assert_eq!(r.rewrite("import x from 'app.js';"), "import x from 'app-abc.js';");
    }

    #[test]
    fn test_css_url_and_unquoted_attribute() {
        let r = rewriter(&[("img/logo.png", "img/logo-ff.png")], "");
        assert_eq!(
            r.rewrite("a { background: url(img/logo.png); }"),
            "a { background: url(img/logo-ff.png); }"
        );
        assert_eq!(r.rewrite("<img src=img/logo.png>"), "<img src=img/logo-ff.png>");
        assert_eq!(r.rewrite("<img src=img/logo.png alt=x>"), "<img src=img/logo-ff.png alt=x>");
    }

    #[test]
    fn test_longer_identifier_untouched() {
        let r = rewriter(&[("app.js", "app-abc.js")], "");
        let text = r#"<script src="myapp.jsx"></script> "myapp.js" (app.json)"#;
        assert!(matches!(r.rewrite(text), Cow::Borrowed(_)));
    }

    #[test]
    fn test_relative_prefix_preserved() {
        let r = rewriter(&[("images/x.png", "images/x-123.png")], "");
        assert_eq!(
            r.rewrite("url('../images/x.png')"),
            "url('../images/x-123.png')"
        );
        assert_eq!(r.rewrite(r#"src="/images/x.png""#), r#"src="/images/x-123.png""#);
    }

    #[test]
    fn test_prepend_replaces_prefix() {
        let r = rewriter(&[("assets/app.js", "assets/app-abc.js")], "https://cdn.example.com/");
        assert_eq!(
            r.rewrite(r#"<script src="/assets/app.js"></script>"#),
            r#"<script src="https://cdn.example.com/assets/app-abc.js"></script>"#
        );
        assert_eq!(
            r.rewrite(r#"<script src="assets/app.js"></script>"#),
            r#"<script src="https://cdn.example.com/assets/app-abc.js"></script>"#
        );
    }

    #[test]
    fn test_prepend_with_identity_mapping() {
        let r = rewriter(&[("app.js", "app.js")], "/static/");
        assert!(!r.is_empty());
        assert_eq!(r.rewrite(r#"src="app.js""#), r#"src="/static/app.js""#);

        let r = rewriter(&[("app.js", "app.js")], "");
        assert!(r.is_empty());
    }

    #[test]
    fn test_every_occurrence_rewritten() {
        let r = rewriter(&[("a.css", "a-1.css"), ("b.js", "b-2.js")], "");
        let text = r#"<link href="a.css"><script src="b.js"></script><link href="a.css">"#;
        assert_eq!(
            r.rewrite(text),
            r#"<link href="a-1.css"><script src="b-2.js"></script><link href="a-1.css">"#
        );
    }

    #[test]
    fn test_longest_key_wins() {
        let r = rewriter(
            &[("app.js", "app-root.js"), ("dist/app.js", "dist/app-nested.js")],
            "",
        );
        assert_eq!(
            r.rewrite(r#""dist/app.js" "app.js""#),
            r#""dist/app-nested.js" "app-root.js""#
        );
    }

    #[test]
    fn test_named_directory_prefix_not_matched() {
        let r = rewriter(&[("app.js", "app-abc.js")], "");
        let text = concat!(
            r#"<script src="vendor/app.js"></script>"#,
            r#"<script src="https://other.example.com/app.js"></script>"#,
            r#"<script src="app.js"></script>"#,
        );
        assert_eq!(
            r.rewrite(text),
            concat!(
                r#"<script src="vendor/app.js"></script>"#,
                r#"<script src="https://other.example.com/app.js"></script>"#,
                r#"<script src="app-abc.js"></script>"#,
            )
        );
        assert_eq!(r.rewrite(r#""./app.js" "../../app.js""#), r#""./app-abc.js" "../../app-abc.js""#);
        assert_eq!(r.rewrite(r#""./lib/../app.js""#), r#""./lib/../app.js""#);
    }

    #[test]
    fn test_named_directory_prefix_not_matched_with_prepend() {
        let r = rewriter(&[("app.js", "app-abc.js")], "https://cdn.example.com/");
        assert_eq!(
            r.rewrite(r#"<script src="vendor/app.js"></script><script src="//other.example.com/app.js"></script>"#),
            r#"<script src="vendor/app.js"></script><script src="//other.example.com/app.js"></script>"#
        );
        assert_eq!(
            r.rewrite(r#"<script src="../app.js"></script>"#),
            r#"<script src="https://cdn.example.com/app-abc.js"></script>"#
        );
    }

    #[test]
    fn test_anchor_prefix() {
        assert!(is_anchor_prefix(""));
        assert!(is_anchor_prefix("/"));
        assert!(is_anchor_prefix("./"));
        assert!(is_anchor_prefix("../../"));
        assert!(!is_anchor_prefix("vendor/"));
        assert!(!is_anchor_prefix("https://x.com/"));
        assert!(!is_anchor_prefix(".."));
    }

    #[test]
    fn test_boundaries_required() {
        let r = rewriter(&[("app.js", "app-abc.js")], "");
        // End of input is not a right delimiter
        assert_eq!(r.rewrite("src=app.js"), "src=app.js");
        // Whitespace before the key is not a left delimiter
        assert_eq!(r.rewrite("load app.js now"), "load app.js now");
        // Escaped quotes are not special-cased
        assert_eq!(r.rewrite(r#"src=\"app.js\""#), r#"src=\"app.js\""#);
        assert_eq!(r.rewrite("=app.js\n"), "=app-abc.js\n");
    }

    #[test]
    fn test_non_ascii_text_preserved() {
        let r = rewriter(&[("ü.css", "ü-9.css")], "");
        assert_eq!(
            r.rewrite("<!-- é --><link href=\"ü.css\">日本"),
            "<!-- é --><link href=\"ü-9.css\">日本"
        );
    }

    #[test]
    fn test_empty_mapping() {
        let r = ReferenceRewriter::new(&BTreeMap::new(), "");
        assert!(r.is_empty());
        assert!(matches!(r.rewrite("src=\"app.js\""), Cow::Borrowed(_)));
    }
}
