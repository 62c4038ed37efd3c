//! End-to-end analysis: detection, classification and offline resolution.

use serde::Serialize;

use crate::detect::{first_error_line, looks_like_error};
use crate::error::EngineError;
use crate::knowledge::{Explanation, KnowledgeBase};
use crate::language::Language;
use crate::patterns::{LanguagePatternTable, PatternRegistry};

/// Everything the engine could determine about a piece of diagnostic text.
///
/// When `language` is `None`, `error_kind`, `file`, `line` and `column` are
/// `None` as well.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorAnalysis {
    pub is_error: bool,
    pub language: Option<Language>,
    pub error_kind: Option<String>,
    pub error_message: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub explanation: Option<Explanation>,
}

/// Detection, classification and offline resolution over a pattern registry
/// and a knowledge base.
#[derive(Debug, Clone, Copy)]
pub struct Analyzer<'a> {
    patterns: &'a PatternRegistry,
    knowledge: &'a KnowledgeBase,
}

impl Analyzer<'static> {
    /// Analyzer over the embedded tables
    pub fn builtin() -> Self {
        Self::new(PatternRegistry::builtin(), KnowledgeBase::builtin())
    }
}

impl<'a> Analyzer<'a> {
    pub fn new(patterns: &'a PatternRegistry, knowledge: &'a KnowledgeBase) -> Self {
        Self {
            patterns,
            knowledge,
        }
    }

    pub fn patterns(&self) -> &'a PatternRegistry {
        self.patterns
    }

    pub fn knowledge(&self) -> &'a KnowledgeBase {
        self.knowledge
    }

    /// Analyze `text`, detecting its language first
    pub fn analyze(&self, text: &str) -> ErrorAnalysis {
        match self
            .patterns
            .detect(text)
            .and_then(|language| self.patterns.table(language))
        {
            Some(table) => self.analyze_with(text, table),
            None => unrecognized(text),
        }
    }

    /// Analyze `text` as `language`, skipping detection
    pub fn analyze_as(&self, text: &str, language: Language) -> Result<ErrorAnalysis, EngineError> {
        let table = self
            .patterns
            .table(language)
            .ok_or(EngineError::UnconfiguredLanguage(language))?;
        Ok(self.analyze_with(text, table))
    }

    fn analyze_with(&self, text: &str, table: &LanguagePatternTable) -> ErrorAnalysis {
        let language = table.language();
        let classification = table.classify(text);
        let explanation =
            self.knowledge
                .resolve(language, classification.error_kind.as_deref(), text);

        ErrorAnalysis {
            is_error: classification.error_kind.is_some() || looks_like_error(text),
            language: Some(language),
            error_kind: classification.error_kind,
            error_message: classification.error_message,
            file: classification.file,
            line: classification.line,
            column: classification.column,
            explanation,
        }
    }
}

fn unrecognized(text: &str) -> ErrorAnalysis {
    let is_error = looks_like_error(text);
    ErrorAnalysis {
        is_error,
        error_message: is_error
            .then(|| first_error_line(text))
            .flatten()
            .map(String::from),
        ..Default::default()
    }
}

/// Analyze `text` with the built-in tables
pub fn analyze(text: &str) -> ErrorAnalysis {
    Analyzer::builtin().analyze(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_javascript_type_error() {
        let input = "TypeError: Cannot read properties of undefined (reading 'map')\n    at app.js:12:5";
        let analysis = analyze(input);

        assert!(analysis.is_error);
        assert_eq!(analysis.language, Some(Language::JavaScript));
        assert_eq!(analysis.error_kind.as_deref(), Some("TypeError"));
        assert!(analysis.file.as_deref().unwrap().contains("app.js"));
        assert_eq!(analysis.line, Some(12));
        assert_eq!(analysis.column, Some(5));

        let explanation = analysis.explanation.unwrap();
        let expected = KnowledgeBase::builtin()
            .resolve(Language::JavaScript, Some("TypeError"), "Cannot read propert")
            .unwrap();
        assert_eq!(explanation, expected);
    }

    #[test]
    fn test_analyze_plain_text_is_not_an_error() {
        let analysis = analyze("Everything compiled and all tests passed.");
        assert_eq!(analysis, ErrorAnalysis::default());
    }

    #[test]
    fn test_analyze_generic_error_without_language() {
        let analysis = analyze("deploy step 3\nERROR: disk quota exceeded\nbye");

        assert!(analysis.is_error);
        assert_eq!(analysis.language, None);
        assert_eq!(
            analysis.error_message.as_deref(),
            Some("ERROR: disk quota exceeded")
        );
        assert!(analysis.error_kind.is_none());
        assert!(analysis.file.is_none());
        assert!(analysis.line.is_none());
        assert!(analysis.column.is_none());
        assert!(analysis.explanation.is_none());
    }

    #[test]
    fn test_analyze_detected_language_without_signature_match() {
        // Java stack frame is enough for detection; no signature matches.
        let input = "something went sideways\n\tat com.acme.Service.run(Service.java:88)";
        let analysis = analyze(input);

        assert_eq!(analysis.language, Some(Language::Java));
        assert!(analysis.error_kind.is_none());
        assert!(!analysis.is_error);
        assert_eq!(analysis.file.as_deref(), Some("Service.java"));
        assert_eq!(analysis.line, Some(88));
    }

    #[test]
    fn test_analyze_as_forces_language() {
        let analyzer = Analyzer::builtin();
        let analysis = analyzer
            .analyze_as("KeyError: 'user'", Language::Python)
            .unwrap();

        assert_eq!(analysis.language, Some(Language::Python));
        assert_eq!(analysis.error_kind.as_deref(), Some("KeyError"));
        assert!(analysis.explanation.is_some());
    }

    #[test]
    fn test_analyze_as_unconfigured_language() {
        let patterns = PatternRegistry::new();
        let knowledge = KnowledgeBase::new();
        let analyzer = Analyzer::new(&patterns, &knowledge);

        let err = analyzer.analyze_as("panic: x", Language::Go).unwrap_err();
        assert!(matches!(err, EngineError::UnconfiguredLanguage(Language::Go)));
    }

    #[test]
    fn test_analyze_with_empty_knowledge_base() {
        let knowledge = KnowledgeBase::new();
        let analyzer = Analyzer::new(PatternRegistry::builtin(), &knowledge);
        let analysis = analyzer.analyze("panic: runtime error: index out of range [5] with length 3\n\ngoroutine 1 [running]:");

        assert_eq!(analysis.language, Some(Language::Go));
        assert_eq!(analysis.error_kind.as_deref(), Some("panic"));
        assert!(analysis.explanation.is_none());
    }

    #[test]
    fn test_error_analysis_serializes_language_id() {
        let analysis = analyze("KeyError: 'user'");
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["language"], "python");
        assert_eq!(json["is_error"], true);
    }
}
