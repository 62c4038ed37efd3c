//! Outbound prompt for the reasoning service.

use crate::analysis::ErrorAnalysis;
use crate::redact::Redactor;

const TEMPLATE_EXPLAIN: &str = include_str!("prompts/explain.txt");

/// Build the prompt asking for a `WHAT:`/`WHY:`/`FIX:`/`EXAMPLE:` answer.
///
/// The error text is always passed through `redactor` first; the analysis
/// only contributes language and kind hints, never raw input.
pub fn build_prompt(analysis: &ErrorAnalysis, error: &str, redactor: &Redactor) -> String {
    let redacted = redactor.redact(error.trim());
    TEMPLATE_EXPLAIN
        .replace("{context}", &context_lines(analysis))
        .replace("{error}", &redacted)
}

fn context_lines(analysis: &ErrorAnalysis) -> String {
    let mut context = String::new();
    if let Some(language) = analysis.language {
        context.push_str(&format!("Language: {}\n", language.display_name()));
    }
    if let Some(kind) = &analysis.error_kind {
        context.push_str(&format!("Error kind: {kind}\n"));
    }
    context
}
