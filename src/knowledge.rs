//! Offline explanation knowledge base.
//!
//! Three levels: language → error-kind key → case. Keys and case patterns are
//! plain substrings, evaluated in the order they were written. The case
//! pattern `"default"` is a catch-all.

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::EngineError;
use crate::language::Language;

const BUILTIN_KNOWLEDGE: &str = include_str!("data/knowledge.toml");

static BUILTIN: LazyLock<KnowledgeBase> = LazyLock::new(|| {
    KnowledgeBase::from_toml_str(BUILTIN_KNOWLEDGE).expect("embedded knowledge base is valid")
});

/// Reserved case pattern that always matches
pub const DEFAULT_CASE: &str = "default";

/// Structured explanation of an error
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub what: String,
    pub why: String,
    pub fix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

impl Explanation {
    pub fn new(what: impl Into<String>, why: impl Into<String>, fix: impl Into<String>) -> Self {
        Self {
            what: what.into(),
            why: why.into(),
            fix: fix.into(),
            example: None,
        }
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// True when no field carries any text
    pub fn is_empty(&self) -> bool {
        self.what.is_empty()
            && self.why.is_empty()
            && self.fix.is_empty()
            && self.example.as_deref().map_or(true, str::is_empty)
    }
}

/// One sub-pattern under an error-kind key
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KnowledgeCase {
    pub pattern: String,
    #[serde(flatten)]
    pub explanation: Explanation,
}

impl KnowledgeCase {
    pub fn is_default(&self) -> bool {
        self.pattern == DEFAULT_CASE
    }

    fn applies_to(&self, raw_text: &str) -> bool {
        self.is_default() || raw_text.contains(&self.pattern)
    }
}

/// An error-kind key with its ordered cases
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KindEntry {
    pub language: Language,
    pub kind: String,
    #[serde(default, rename = "case")]
    pub cases: Vec<KnowledgeCase>,
}

impl KindEntry {
    fn matches(&self, error_kind: Option<&str>, raw_text: &str) -> bool {
        raw_text.contains(&self.kind) || error_kind.is_some_and(|k| k.contains(&self.kind))
    }
}

#[derive(Debug, Deserialize)]
struct KnowledgeFile {
    #[serde(default)]
    entry: Vec<KindEntry>,
}

/// Ordered, read-only lookup table of explanations
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    branches: Vec<(Language, Vec<KindEntry>)>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in knowledge base, parsed once per process
    pub fn builtin() -> &'static KnowledgeBase {
        &BUILTIN
    }

    /// Parse a TOML document of `[[entry]]` tables. Entries keep file order
    /// within their language.
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        let file: KnowledgeFile = toml::from_str(contents)?;
        let mut kb = Self::new();
        for entry in file.entry {
            kb.push(entry);
        }
        Ok(kb)
    }

    /// Append an entry after the existing ones for its language
    pub fn push(&mut self, entry: KindEntry) {
        self.branch_mut(entry.language).push(entry);
    }

    /// Put every entry of `other` ahead of this base's entries, so that its
    /// keys are consulted first.
    pub fn merge_front(&mut self, other: KnowledgeBase) {
        for (language, mut entries) in other.branches {
            let branch = self.branch_mut(language);
            entries.append(branch);
            *branch = entries;
        }
    }

    fn branch_mut(&mut self, language: Language) -> &mut Vec<KindEntry> {
        let index = match self.branches.iter().position(|(l, _)| *l == language) {
            Some(index) => index,
            None => {
                self.branches.push((language, Vec::new()));
                self.branches.len() - 1
            }
        };
        &mut self.branches[index].1
    }

    /// Entries for `language` in evaluation order
    pub fn entries(&self, language: Language) -> Option<&[KindEntry]> {
        self.branches
            .iter()
            .find(|(l, _)| *l == language)
            .map(|(_, entries)| entries.as_slice())
    }

    pub fn languages(&self) -> Vec<Language> {
        self.branches.iter().map(|(l, _)| *l).collect()
    }

    /// Resolve an explanation.
    ///
    /// The first key (in order) found in the raw text or the classified kind
    /// decides; within it the first case whose pattern occurs in the raw text
    /// (or that is `"default"`) is returned. A later, more specific key is
    /// never consulted once an earlier one matched.
    pub fn resolve(
        &self,
        language: Language,
        error_kind: Option<&str>,
        raw_text: &str,
    ) -> Option<Explanation> {
        let entries = self.entries(language)?;
        let entry = entries.iter().find(|e| e.matches(error_kind, raw_text))?;

        let case = entry
            .cases
            .iter()
            .find(|c| c.applies_to(raw_text))
            .or_else(|| entry.cases.iter().find(|c| c.is_default()));

        match case {
            Some(case) => {
                tracing::debug!(
                    language = %language,
                    key = %entry.kind,
                    case = %case.pattern,
                    "knowledge base hit"
                );
                Some(case.explanation.clone())
            }
            None => {
                tracing::debug!(language = %language, key = %entry.kind, "key matched without a case");
                None
            }
        }
    }
}

/// Resolve an explanation from the built-in knowledge base
pub fn resolve(language: Language, error_kind: Option<&str>, raw_text: &str) -> Option<Explanation> {
    KnowledgeBase::builtin().resolve(language, error_kind, raw_text)
}
