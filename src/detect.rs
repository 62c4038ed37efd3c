//! Language detection and generic error sniffing.
//!
//! Detection is a priority-ordered scan: each table's indicators (and its
//! stack-frame indicator) are tested against the whole input and the first
//! language with any hit wins. There is no scoring across languages.

use regex::Regex;
use std::sync::LazyLock;

use crate::language::Language;
use crate::patterns::{LanguagePatternTable, PatternRegistry};

/// Language-agnostic error vocabulary. Deliberately broader than any table's
/// indicators: it decides `is_error`, not the language.
static GENERIC_ERROR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b\w*(?:error|exception)\b|\bfail(?:ed|ure|s)?\b|\bfatal\b|\bpanic(?:ked)?\b|\btraceback\b|\bstack trace\b|\bsegmentation fault\b|\bsegfault\b|\bSIG(?:SEGV|ABRT|BUS|FPE)\b|\bnull pointer\b|\bundefined reference\b|\bcommand not found\b|\bpermission denied\b|\bno such file or directory\b",
    )
    .expect("generic error pattern is valid")
});

impl LanguagePatternTable {
    /// Whether any of this table's detection signals occur in `text`
    pub fn is_indicated_by(&self, text: &str) -> bool {
        self.indicators().iter().any(|re| re.is_match(text))
            || self.stack_indicator().is_match(text)
    }
}

impl PatternRegistry {
    /// Detect the producing language in priority order
    pub fn detect(&self, text: &str) -> Option<Language> {
        let language = self
            .tables()
            .find(|table| table.is_indicated_by(text))
            .map(|table| table.language());

        match language {
            Some(lang) => tracing::debug!(language = %lang, "language detected"),
            None => tracing::debug!("no language indicators matched"),
        }
        language
    }
}

/// Detect the language of `text` using the built-in tables
pub fn detect(text: &str) -> Option<Language> {
    PatternRegistry::builtin().detect(text)
}

/// Check if a string contains common error vocabulary
pub fn looks_like_error(text: &str) -> bool {
    GENERIC_ERROR.is_match(text)
}

/// First non-empty line carrying generic error vocabulary, trimmed
pub fn first_error_line(text: &str) -> Option<&str> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && GENERIC_ERROR.is_match(line))
}
