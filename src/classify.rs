//! Error classification: error kind, message and source location.

use serde::Serialize;

use crate::error::EngineError;
use crate::language::Language;
use crate::patterns::{LanguagePatternTable, PatternRegistry};

/// What a language's pattern table extracted from a piece of text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub error_kind: Option<String>,
    pub error_message: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl LanguagePatternTable {
    /// Run the signatures in table order (first match wins), then the
    /// location pattern once, independently of whether a signature matched.
    pub fn classify(&self, text: &str) -> Classification {
        let mut result = Classification::default();

        for (index, entry) in self.signatures().iter().enumerate() {
            if let Some((kind, message)) = entry.captures(text) {
                tracing::debug!(
                    language = %self.language(),
                    index,
                    kind = %kind,
                    "signature matched"
                );
                result.error_kind = Some(kind);
                result.error_message = Some(message);
                break;
            }
        }

        let location = self.locate(text);
        result.file = location.file;
        result.line = location.line;
        result.column = location.column;

        result
    }
}

impl PatternRegistry {
    /// Classify `text` as `language`.
    ///
    /// Fails only when no table is registered for `language`; text that
    /// matches nothing yields an empty [`Classification`].
    pub fn classify(&self, text: &str, language: Language) -> Result<Classification, EngineError> {
        self.table(language)
            .map(|table| table.classify(text))
            .ok_or(EngineError::UnconfiguredLanguage(language))
    }
}

/// Classify `text` with the built-in tables
pub fn classify(text: &str, language: Language) -> Result<Classification, EngineError> {
    PatternRegistry::builtin().classify(text, language)
}
