//! Error type for the classification engine.
//!
//! Unrecognised input is never an error: a detector that finds nothing returns
//! `None`. These variants cover configuration mistakes only.

use crate::language::Language;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("No pattern table is configured for {0}")]
    UnconfiguredLanguage(Language),

    #[error("Invalid {field} pattern for {language}: {pattern}")]
    InvalidPattern {
        language: Language,
        field: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Location pattern for {language} must capture named groups `file` and `line`")]
    MissingLocationGroups { language: Language },

    #[error("Malformed table: {0}")]
    InvalidTable(#[from] toml::de::Error),
}
