//! errbuddy - error classification and explanation engine
//!
//! Given raw diagnostic text this library detects the producing language,
//! extracts the error kind, message and source location, and resolves a
//! structured explanation, either from the built-in knowledge base or by
//! parsing a free-form answer from a reasoning service.

pub mod analysis;
pub mod classify;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod input;
pub mod knowledge;
pub mod language;
pub mod output;
pub mod patterns;
pub mod prompt;
pub mod redact;
pub mod response;

// Re-export commonly used types
pub use analysis::{analyze, Analyzer, ErrorAnalysis};
pub use classify::{classify, Classification};
pub use cli::Cli;
pub use config::Config;
pub use detect::{detect, looks_like_error};
pub use error::EngineError;
pub use knowledge::{resolve, Explanation, KnowledgeBase};
pub use language::Language;
pub use output::Diagnosis;
pub use patterns::{LanguagePatternTable, PatternEntry, PatternRegistry};
pub use redact::{redact, Redactor};
pub use response::{parse_response, ParsedResponse};
