//! Redaction of outbound diagnostic text.
//!
//! Rules run in a fixed order: Windows paths, Unix paths, credentials, then
//! truncation. Truncation is last so substitutions are never cut in half.
//! Running the filter on its own output changes nothing.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Default upper bound on redacted text length, in characters
pub const DEFAULT_MAX_CHARS: usize = 4000;

/// Replaces the directory part of an absolute path
pub const PATH_PLACEHOLDER: &str = "<path>";

/// Replaces a credential value
pub const REDACTED: &str = "[REDACTED]";

/// Appended after truncated text
pub const TRUNCATION_MARKER: &str = "\n...[truncated]";

static WINDOWS_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z]:(?:[\\/][^\\/\s]+)*([\\/])").expect("windows path pattern is valid")
});

static UNIX_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\B/(?:home|Users|root|usr|var|opt|tmp|etc|mnt|srv)(?:/[^/\s"'()]+)*/"#)
        .expect("unix path pattern is valid")
});

static BEARER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bBearer[ \t]+[\w.~+/-]+=*").expect("bearer pattern is valid")
});

static TOKEN_SHAPES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:sk-[A-Za-z0-9_-]{16,}|gh[pousr]_[A-Za-z0-9]{20,}|AKIA[0-9A-Z]{16}|xox[abpr]-[A-Za-z0-9-]{10,})",
    )
    .expect("token shape pattern is valid")
});

static SECRET_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\b([\w-]*(?:api[_-]?key|secret|passw(?:or)?d|token))(["']?[ \t]*[:=][ \t]*)(\S+)"#,
    )
    .expect("secret assignment pattern is valid")
});

/// Configured redaction filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redactor {
    max_chars: usize,
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHARS)
    }
}

impl Redactor {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn redact(&self, text: &str) -> String {
        truncate(&settle(text), self.max_chars)
    }
}

/// Upper bound on rule passes in [`settle`]
const MAX_PASSES: usize = 8;

/// One pass of every substitution rule, in order
fn apply_rules(text: &str) -> Cow<'_, str> {
    let text = WINDOWS_PATH.replace_all(text, format!("{PATH_PLACEHOLDER}${{1}}").as_str());
    let text = replace_cow(text, &UNIX_PATH, &format!("{PATH_PLACEHOLDER}/"));
    let text = replace_cow(text, &BEARER, &format!("Bearer {REDACTED}"));
    let text = replace_cow(text, &TOKEN_SHAPES, REDACTED);
    replace_cow(text, &SECRET_ASSIGNMENT, &format!("${{1}}${{2}}{REDACTED}"))
}

/// A replacement can expose a new match to an earlier rule
/// (`sk-...` followed by `/tmp/...`), so passes repeat until nothing changes.
fn settle(text: &str) -> String {
    let mut current = apply_rules(text).into_owned();
    for _ in 1..MAX_PASSES {
        let next = apply_rules(&current);
        if next == current.as_str() {
            break;
        }
        current = next.into_owned();
    }
    current
}

fn is_settled(text: &str) -> bool {
    apply_rules(text) == text
}

fn replace_cow<'a>(text: Cow<'a, str>, re: &Regex, replacement: &str) -> Cow<'a, str> {
    let replaced = match re.replace_all(&text, replacement) {
        Cow::Borrowed(_) => None,
        Cow::Owned(replaced) => Some(replaced),
    };
    replaced.map_or(text, Cow::Owned)
}

/// Cut `text` to at most `max_chars` characters, ending on a whitespace
/// boundary when one exists, and append [`TRUNCATION_MARKER`].
///
/// A cut can leave a partial credential or path behind (`password=[RED`), so
/// the cut backs off until the result is untouched by the rules.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let marker_len = TRUNCATION_MARKER.chars().count();
    if max_chars <= marker_len {
        let mut keep = max_chars;
        loop {
            let head: String = text.chars().take(keep).collect();
            if keep == 0 || is_settled(&head) {
                return head;
            }
            keep -= 1;
        }
    }

    let budget = max_chars - marker_len;
    let mut end = text
        .char_indices()
        .nth(budget)
        .map_or(text.len(), |(index, _)| index);
    loop {
        let head = &text[..end];
        let head = match head.rfind(char::is_whitespace) {
            Some(index) if index > 0 => &head[..index],
            _ => head,
        };
        let head = head.trim_end();
        let truncated = format!("{head}{TRUNCATION_MARKER}");
        if head.is_empty() || is_settled(&truncated) {
            tracing::debug!(max_chars, kept = head.len(), "truncated redacted text");
            return truncated;
        }
        end = head.char_indices().last().map_or(0, |(index, _)| index);
    }
}

/// Redact `text` with the default length limit
pub fn redact(text: &str) -> String {
    Redactor::default().redact(text)
}
