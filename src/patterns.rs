//! Per-language pattern tables.
//!
//! A [`LanguagePatternTable`] holds everything errbuddy knows about the shape
//! of one language's error output:
//! - detection indicators and a stack-frame indicator (used by [`crate::detect`])
//! - ordered error signatures (used by [`crate::classify`])
//! - a file/line/column extraction pattern
//!
//! Tables are data, not code. The built-in set is embedded from
//! `src/data/patterns.toml`; users can replace any language's table with
//! their own TOML file without touching the algorithms.

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

use crate::error::EngineError;
use crate::language::Language;

const BUILTIN_PATTERNS: &str = include_str!("data/patterns.toml");

static BUILTIN: LazyLock<PatternRegistry> = LazyLock::new(|| {
    PatternRegistry::from_toml_str(BUILTIN_PATTERNS).expect("embedded pattern tables are valid")
});

// ============================================================================
// Pattern Entry
// ============================================================================

/// One error signature.
///
/// Capture group 1 is the error kind. Capture group 2 is the message; when it
/// is absent (or empty) the kind doubles as the message.
#[derive(Debug, Clone)]
pub struct PatternEntry {
    regex: Regex,
}

impl PatternEntry {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Match against `text`, returning `(kind, message)` on success.
    pub fn captures(&self, text: &str) -> Option<(String, String)> {
        let caps = self.regex.captures(text)?;
        let whole = caps.get(0)?.as_str();

        let kind = caps
            .get(1)
            .map(|m| m.as_str())
            .unwrap_or(whole)
            .trim()
            .to_string();
        let message = caps
            .get(2)
            .map(|m| m.as_str().trim())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| kind.clone());

        Some((kind, message))
    }
}

/// Where an error happened, as far as the text tells us.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

// ============================================================================
// Language Pattern Table
// ============================================================================

/// Pattern configuration for a single language
#[derive(Debug, Clone)]
pub struct LanguagePatternTable {
    language: Language,
    indicators: Vec<Regex>,
    stack_indicator: Regex,
    signatures: Vec<PatternEntry>,
    location: Regex,
}

impl LanguagePatternTable {
    pub fn language(&self) -> Language {
        self.language
    }

    pub fn indicators(&self) -> &[Regex] {
        &self.indicators
    }

    pub fn stack_indicator(&self) -> &Regex {
        &self.stack_indicator
    }

    /// Signatures in evaluation order
    pub fn signatures(&self) -> &[PatternEntry] {
        &self.signatures
    }

    /// Apply the location pattern once. Numbers that do not fit a `u32` leave
    /// only that field unset.
    pub fn locate(&self, text: &str) -> SourceLocation {
        let Some(caps) = self.location.captures(text) else {
            return SourceLocation::default();
        };

        SourceLocation {
            file: caps
                .name("file")
                .map(|m| m.as_str().trim().to_string())
                .filter(|f| !f.is_empty()),
            line: caps.name("line").and_then(|m| m.as_str().parse().ok()),
            column: caps.name("column").and_then(|m| m.as_str().parse().ok()),
        }
    }

    /// Compile a table from its TOML description.
    pub fn from_spec(spec: TableSpec) -> Result<Self, EngineError> {
        let language = spec.language;
        let compile = |field: &'static str, pattern: &str| {
            Regex::new(pattern).map_err(|source| EngineError::InvalidPattern {
                language,
                field,
                pattern: pattern.to_string(),
                source,
            })
        };

        let indicators = spec
            .indicators
            .iter()
            .map(|p| compile("indicator", p.as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        let stack_indicator = compile("stack", spec.stack.as_str())?;
        let signatures = spec
            .signatures
            .iter()
            .map(|p| compile("signature", p.as_str()).map(|regex| PatternEntry { regex }))
            .collect::<Result<Vec<_>, _>>()?;

        let location = compile("location", spec.location.as_str())?;
        let names: Vec<&str> = location.capture_names().flatten().collect();
        if !names.contains(&"file") || !names.contains(&"line") {
            return Err(EngineError::MissingLocationGroups { language });
        }

        Ok(Self {
            language,
            indicators,
            stack_indicator,
            signatures,
            location,
        })
    }
}

/// Uncompiled table as written in a TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TableSpec {
    pub language: Language,
    #[serde(default)]
    pub indicators: Vec<String>,
    pub stack: String,
    pub location: String,
    #[serde(default)]
    pub signatures: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TableFile {
    #[serde(default)]
    table: Vec<TableSpec>,
}

// ============================================================================
// Registry
// ============================================================================

/// Ordered collection of pattern tables.
///
/// Registration order is detection priority: when indicator sets overlap,
/// the language registered first wins.
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    tables: Vec<LanguagePatternTable>,
}

impl PatternRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in tables, compiled once per process
    pub fn builtin() -> &'static PatternRegistry {
        &BUILTIN
    }

    /// Parse a TOML document of `[[table]]` entries.
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        let file: TableFile = toml::from_str(contents)?;
        let mut registry = Self::new();
        for spec in file.table {
            registry.register(LanguagePatternTable::from_spec(spec)?);
        }
        Ok(registry)
    }

    /// Add a table. A table for an already registered language replaces it
    /// in place, keeping that language's priority.
    pub fn register(&mut self, table: LanguagePatternTable) {
        match self
            .tables
            .iter_mut()
            .find(|t| t.language == table.language)
        {
            Some(existing) => *existing = table,
            None => self.tables.push(table),
        }
    }

    /// Replace or add every table from `other`.
    pub fn merge(&mut self, other: PatternRegistry) {
        for table in other.tables {
            self.register(table);
        }
    }

    pub fn table(&self, language: Language) -> Option<&LanguagePatternTable> {
        self.tables.iter().find(|t| t.language == language)
    }

    /// Tables in priority order
    pub fn tables(&self) -> impl Iterator<Item = &LanguagePatternTable> {
        self.tables.iter()
    }

    pub fn languages(&self) -> Vec<Language> {
        self.tables.iter().map(|t| t.language).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
