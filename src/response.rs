//! Parsing of free-form reasoning-service answers into an [`Explanation`].
//!
//! The expected shape is `WHAT:` / `WHY:` / `FIX:` / `EXAMPLE:` sections, but
//! the parser never fails: unlabeled prose is split into sentences and a
//! fenced code block anywhere in the text can supply the example.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::knowledge::Explanation;

static SECTION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:#+[ \t]*)?(?:\*\*)?\b(what|why|fix|example)\b(?:\*\*)?[ \t]*:(?:\*\*)?")
        .expect("section marker pattern is valid")
});

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("sentence pattern is valid"));

static CODE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:[\w+#.-]*[ \t]*\r?\n)?(.*?)```").expect("code block pattern is valid")
});

/// Parser output: the explanation plus the untouched input for logging
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedResponse {
    pub explanation: Explanation,
    pub raw: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    What,
    Why,
    Fix,
    Example,
}

impl Section {
    fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "what" => Some(Self::What),
            "why" => Some(Self::Why),
            "fix" => Some(Self::Fix),
            "example" => Some(Self::Example),
            _ => None,
        }
    }
}

/// Find a section label at the start of a line, tolerating markdown bold:
/// `WHAT:`, `**Why:**`, `**FIX**:`. Returns the label and the rest of the line.
pub fn extract_section_label(line: &str) -> Option<(&'static str, &str)> {
    let caps = SECTION_MARKER.captures(line.trim_start())?;
    let marker = caps.get(0)?;
    if marker.start() != 0 {
        return None;
    }
    let label = match Section::from_label(caps.get(1)?.as_str())? {
        Section::What => "what",
        Section::Why => "why",
        Section::Fix => "fix",
        Section::Example => "example",
    };
    Some((label, line.trim_start()[marker.end()..].trim()))
}

/// Parse a reasoning-service answer. Never fails.
pub fn parse_response(raw: &str) -> ParsedResponse {
    let mut explanation = extract_sections(raw);

    let labeled = !(explanation.what.is_empty()
        && explanation.why.is_empty()
        && explanation.fix.is_empty());
    if !labeled {
        tracing::debug!("no labeled sections, falling back to sentence split");
        let prose = prose_before_markers(raw);
        let sentences = split_sentences(&prose);
        let mut rest = sentences.into_iter();
        explanation.what = rest.next().unwrap_or_default();
        explanation.why = rest.next().unwrap_or_default();
        explanation.fix = rest.collect::<Vec<_>>().join(". ");
    }

    if explanation.example.is_none() {
        explanation.example = extract_code_block(raw);
    }

    ParsedResponse {
        explanation,
        raw: raw.to_string(),
    }
}

/// Labeled-section pass. Each section runs until the next marker; the first
/// occurrence of a label wins.
fn extract_sections(raw: &str) -> Explanation {
    let mut explanation = Explanation::default();
    let markers: Vec<_> = SECTION_MARKER.captures_iter(raw).collect();

    for (i, caps) in markers.iter().enumerate() {
        let (Some(whole), Some(label)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Some(section) = Section::from_label(label.as_str()) else {
            continue;
        };
        let end = markers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(raw.len(), |m| m.start());
        let body = raw[whole.end()..end].trim().to_string();

        match section {
            Section::What if explanation.what.is_empty() => explanation.what = body,
            Section::Why if explanation.why.is_empty() => explanation.why = body,
            Section::Fix if explanation.fix.is_empty() => explanation.fix = body,
            Section::Example if explanation.example.is_none() && !is_no_example(&body) => {
                explanation.example = Some(extract_code_block(&body).unwrap_or(body));
            }
            _ => {}
        }
    }

    explanation
}

/// An empty example section, or one that only says there is no example
/// (`none`, `"None."`, `n/a`).
fn is_no_example(body: &str) -> bool {
    let word = body.trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '.') || c.is_whitespace());
    word.is_empty() || word.eq_ignore_ascii_case("none") || word.eq_ignore_ascii_case("n/a")
}

/// Text usable for the sentence fallback: everything before the first
/// marker, with fenced blocks removed.
fn prose_before_markers(raw: &str) -> String {
    let end = SECTION_MARKER.find(raw).map_or(raw.len(), |m| m.start());
    CODE_BLOCK.replace_all(&raw[..end], "").trim().to_string()
}

/// Split on sentence-ending punctuation followed by whitespace. Pieces are
/// trimmed and empty pieces dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    SENTENCE_END
        .split(text.trim())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Inner content of the first fenced code block, trimmed; `None` when there
/// is no block or it is empty.
pub fn extract_code_block(text: &str) -> Option<String> {
    let caps = CODE_BLOCK.captures(text)?;
    let inner = caps.get(1)?.as_str().trim();
    (!inner.is_empty()).then(|| inner.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response_standard_format() {
        let response = "WHAT: The value is undefined.\nWHY: The data has not loaded yet.\nFIX: Use optional chaining.\nEXAMPLE:\n```js\nconst x = data?.items;\n```";
        let parsed = parse_response(response);
        let e = &parsed.explanation;

        assert_eq!(e.what, "The value is undefined.");
        assert_eq!(e.why, "The data has not loaded yet.");
        assert_eq!(e.fix, "Use optional chaining.");
        assert_eq!(e.example.as_deref(), Some("const x = data?.items;"));
        assert_eq!(parsed.raw, response);
    }

    #[test]
    fn test_parse_response_sections_out_of_order() {
        let parsed = parse_response("FIX: do x\nWHAT: it broke\nWHY: because");
        let e = &parsed.explanation;
        assert_eq!(e.what, "it broke");
        assert_eq!(e.why, "because");
        assert_eq!(e.fix, "do x");
        assert!(e.example.is_none());
    }

    #[test]
    fn test_parse_response_partial_sections() {
        let parsed = parse_response("WHY: only the cause is known");
        let e = &parsed.explanation;
        assert!(e.what.is_empty());
        assert_eq!(e.why, "only the cause is known");
        assert!(e.fix.is_empty());
    }

    #[test]
    fn test_parse_response_case_insensitive_and_bold() {
        let parsed = parse_response("**What:** bad index\n**WHY**: too large\nfix: check bounds");
        let e = &parsed.explanation;
        assert_eq!(e.what, "bad index");
        assert_eq!(e.why, "too large");
        assert_eq!(e.fix, "check bounds");
    }

    #[test]
    fn test_parse_response_multiline_sections() {
        let parsed = parse_response(
            "WHAT: line one\nline two\n\nWHY: cause\nFIX:\n1. first\n2. second\n",
        );
        let e = &parsed.explanation;
        assert_eq!(e.what, "line one\nline two");
        assert_eq!(e.fix, "1. first\n2. second");
    }

    #[test]
    fn test_parse_response_markdown_headings() {
        let parsed = parse_response("## WHAT: broken\n## WHY: reasons\n## FIX: repair");
        let e = &parsed.explanation;
        assert_eq!(e.what, "broken");
        assert_eq!(e.why, "reasons");
        assert_eq!(e.fix, "repair");
    }

    #[test]
    fn test_trailing_hash_in_section_is_kept() {
        let parsed = parse_response("WHAT: a\nWHY: b\nFIX: Rewrite the module in C#");
        assert_eq!(parsed.explanation.fix, "Rewrite the module in C#");

        let parsed = parse_response("## WHAT: a port of F#\n## WHY: b\n## FIX: c");
        assert_eq!(parsed.explanation.what, "a port of F#");
        assert_eq!(parsed.explanation.why, "b");
    }

    #[test]
    fn test_example_none_means_no_example() {
        for answer in ["EXAMPLE: none", "EXAMPLE: \"None.\"", "**Example:** n/a", "EXAMPLE:"] {
            let parsed = parse_response(&format!("WHAT: a\nWHY: b\nFIX: c\n{answer}"));
            assert_eq!(parsed.explanation.example, None, "answer: {answer}");
        }
    }

    #[test]
    fn test_first_occurrence_of_label_wins() {
        let parsed = parse_response("WHAT: first\nWHY: cause\nWHAT: second");
        assert_eq!(parsed.explanation.what, "first");
    }

    #[test]
    fn test_parse_response_sentence_fallback() {
        let parsed = parse_response("Foo broke. Because bar! Do x? Then y.");
        let e = &parsed.explanation;
        assert_eq!(e.what, "Foo broke");
        assert_eq!(e.why, "Because bar");
        assert_eq!(e.fix, "Do x. Then y.");
        assert!(e.example.is_none());
    }

    #[test]
    fn test_sentence_fallback_with_code_block_example() {
        let parsed = parse_response(
            "The list is empty. Nothing was loaded. Guard the access:\n```python\nif items:\n    print(items[0])\n```",
        );
        let e = &parsed.explanation;
        assert_eq!(e.what, "The list is empty");
        assert_eq!(e.why, "Nothing was loaded");
        assert_eq!(e.fix, "Guard the access:");
        assert_eq!(e.example.as_deref(), Some("if items:\n    print(items[0])"));
    }

    #[test]
    fn test_single_sentence_fallback() {
        let parsed = parse_response("Something went wrong");
        let e = &parsed.explanation;
        assert_eq!(e.what, "Something went wrong");
        assert!(e.why.is_empty());
        assert!(e.fix.is_empty());
    }

    #[test]
    fn test_parse_response_empty_input() {
        let parsed = parse_response("");
        assert_eq!(parsed.explanation, Explanation::default());
        assert_eq!(parsed.raw, "");

        let parsed = parse_response("   \n\t ");
        assert!(parsed.explanation.is_empty());
        assert_eq!(parsed.raw, "   \n\t ");
    }

    #[test]
    fn test_code_block_supplements_labeled_sections() {
        let parsed = parse_response(
            "WHAT: x\nWHY: y\nFIX: wrap the call:\n```rust\nif let Some(v) = opt {}\n```",
        );
        let e = &parsed.explanation;
        assert_eq!(e.example.as_deref(), Some("if let Some(v) = opt {}"));
        assert!(e.fix.starts_with("wrap the call:"));
    }

    #[test]
    fn test_example_section_without_fence() {
        let parsed = parse_response("WHAT: a\nWHY: b\nFIX: c\nEXAMPLE: x = x or []");
        assert_eq!(parsed.explanation.example.as_deref(), Some("x = x or []"));
    }

    #[test]
    fn test_extract_code_block() {
        assert_eq!(
            extract_code_block("before\n```js\nfoo();\n```\nafter").as_deref(),
            Some("foo();")
        );
        assert_eq!(extract_code_block("```\n  bar  \n```").as_deref(), Some("bar"));
        assert_eq!(extract_code_block("inline ```baz``` here").as_deref(), Some("baz"));
        assert_eq!(extract_code_block("```\n\n```"), None);
        assert_eq!(extract_code_block("no fences"), None);
    }

    #[test]
    fn test_split_sentences() {
        assert_eq!(split_sentences("A. B!  C?\nD"), vec!["A", "B", "C", "D"]);
        assert_eq!(split_sentences("version 1.2.3 is out"), vec!["version 1.2.3 is out"]);
        assert!(split_sentences("  ").is_empty());
    }

    #[test]
    fn test_extract_section_label() {
        assert_eq!(extract_section_label("WHAT: broken"), Some(("what", "broken")));
        assert_eq!(extract_section_label("**Fix:** retry"), Some(("fix", "retry")));
        assert_eq!(extract_section_label("**EXAMPLE**:"), Some(("example", "")));
        assert_eq!(extract_section_label("  why: spaced"), Some(("why", "spaced")));
        assert_eq!(extract_section_label("Whatever: nope"), None);
        assert_eq!(extract_section_label("so what: nope"), None);
        assert_eq!(extract_section_label("## Why: heading"), Some(("why", "heading")));
    }
}
