//! Terminal and JSON output.

use colored::Colorize;
use serde::Serialize;

use crate::analysis::ErrorAnalysis;
use crate::knowledge::{Explanation, KnowledgeBase};
use crate::patterns::PatternRegistry;
use crate::response::ParsedResponse;

/// An analysis together with the explanation shown to the user and where
/// that explanation came from.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    pub input: String,
    pub analysis: ErrorAnalysis,
    pub explanation: Option<Explanation>,
    /// True when the explanation came from the built-in knowledge base
    pub offline: bool,
}

impl Diagnosis {
    /// Offline path: the knowledge-base explanation, if any
    pub fn offline(input: impl Into<String>, analysis: ErrorAnalysis) -> Self {
        let explanation = analysis.explanation.clone();
        Self {
            input: input.into(),
            analysis,
            explanation,
            offline: true,
        }
    }

    /// Online path: the parsed reasoning-service answer replaces the offline
    /// explanation unless it came back empty.
    pub fn online(input: impl Into<String>, analysis: ErrorAnalysis, response: ParsedResponse) -> Self {
        if response.explanation.is_empty() {
            tracing::warn!("reasoning service answer had no usable content");
            return Self::offline(input, analysis);
        }
        Self {
            input: input.into(),
            analysis,
            explanation: Some(response.explanation),
            offline: false,
        }
    }
}

/// Language-agnostic advice for errors nothing recognised
pub fn generic_explanation() -> Explanation {
    Explanation::new(
        "The output contains an error that errbuddy does not recognise.",
        "No built-in pattern matched this error message.",
        "Read the first error line carefully, check the file and line it mentions, and search for the exact message. Re-running with --prompt prints a redacted prompt you can paste into an assistant.",
    )
}

/// `file:line:column` without colors, for headers and JSON consumers
pub fn format_location(analysis: &ErrorAnalysis) -> Option<String> {
    let file = analysis.file.as_deref()?;
    let mut result = file.to_string();
    if let Some(line) = analysis.line {
        result.push_str(&format!(":{line}"));
        if let Some(column) = analysis.column {
            result.push_str(&format!(":{column}"));
        }
    }
    Some(result)
}

/// Format a file:line location with color highlighting for terminal output
pub fn format_file_line(file: &str, line: Option<u32>, column: Option<u32>) -> String {
    let mut result = file.cyan().to_string();
    if let Some(l) = line {
        result.push_str(&format!(":{}", l.to_string().yellow()));
        if let Some(c) = column {
            result.push_str(&format!(":{}", c.to_string().yellow()));
        }
    }
    result
}

/// Render markdown text to terminal with colored output.
pub fn render_markdown(text: &str, width: usize, indent: &str) {
    let mut in_code_block = false;

    for line in text.lines() {
        if line.trim().starts_with("```") {
            in_code_block = !in_code_block;
            continue;
        }

        if in_code_block {
            println!("{indent}  {}", line.cyan());
            continue;
        }

        let processed = render_inline_markdown(line);
        for wrapped_line in textwrap::wrap(&processed, width.saturating_sub(indent.len())) {
            println!("{indent}{wrapped_line}");
        }
    }
}

/// Process inline markdown: `code`, **bold**, *italic*
pub fn render_inline_markdown(text: &str) -> String {
    let mut result = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '`' => {
                let code: String = chars.by_ref().take_while(|&next| next != '`').collect();
                result.push_str(&code.cyan().to_string());
            }
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                let bold: String = chars.by_ref().take_while(|&next| next != '*').collect();
                if chars.peek() == Some(&'*') {
                    chars.next();
                }
                result.push_str(&bold.bold().to_string());
            }
            '*' => {
                let italic: String = chars.by_ref().take_while(|&next| next != '*').collect();
                result.push_str(&italic.italic().to_string());
            }
            _ => result.push(c),
        }
    }

    result
}

fn print_section(title: &str, body: &str, width: usize, color: fn(&str) -> colored::ColoredString) {
    if body.trim().is_empty() {
        return;
    }
    println!("{} {}", color("▸"), color(title).bold());
    render_markdown(body, width, "  ");
    println!();
}

pub fn print_colored(diagnosis: &Diagnosis) {
    let width = textwrap::termwidth().min(100);
    let analysis = &diagnosis.analysis;

    if !analysis.is_error && analysis.error_kind.is_none() {
        println!();
        println!("{} {}", "✓".green(), "No error detected".green().bold());
        println!();
        println!(
            "  {}",
            "The input doesn't appear to contain an error message.".dimmed()
        );
        println!();
        return;
    }

    let headline = match (&analysis.error_kind, &analysis.error_message) {
        (Some(kind), Some(message)) if kind != message => format!("{kind}: {message}"),
        (Some(kind), _) => kind.clone(),
        (None, Some(message)) => message.clone(),
        (None, None) => diagnosis.input.lines().next().unwrap_or_default().to_string(),
    };

    println!();
    println!("{} {}", "●".red(), headline.bold());

    let mut meta = Vec::new();
    if let Some(language) = analysis.language {
        meta.push(language.display_name().bright_white().to_string());
    }
    if let Some(file) = &analysis.file {
        meta.push(format_file_line(file, analysis.line, analysis.column));
    }
    if !meta.is_empty() {
        let separator = " · ".dimmed().to_string();
        println!("  {}", meta.join(separator.as_str()));
    }
    println!();

    let fallback;
    let explanation = match &diagnosis.explanation {
        Some(explanation) => explanation,
        None => {
            fallback = generic_explanation();
            &fallback
        }
    };

    print_section("What", &explanation.what, width, |s| s.blue());
    print_section("Why", &explanation.why, width, |s| s.yellow());
    print_section("Fix", &explanation.fix, width, |s| s.green());
    if let Some(example) = &explanation.example {
        let fenced = format!("```\n{example}\n```");
        print_section("Example", &fenced, width, |s| s.magenta());
    }

    let source = if diagnosis.explanation.is_none() {
        "no match, generic advice"
    } else if diagnosis.offline {
        "offline knowledge base"
    } else {
        "reasoning service"
    };
    println!("{}", format!("  source: {source}").dimmed());
    println!();
}

/// Pretty-printed JSON for `--json`
pub fn to_json(diagnosis: &Diagnosis) -> serde_json::Result<String> {
    serde_json::to_string_pretty(diagnosis)
}

pub fn print_debug_section(title: &str, body: &str, footer: Option<String>) {
    eprintln!("{}", format!("=== DEBUG: {title} ===").yellow().bold());
    if body.trim().is_empty() {
        eprintln!("{}", "| <empty>".dimmed());
    } else {
        for line in body.lines() {
            eprintln!("{}", format!("| {line}").bright_white());
        }
    }
    if let Some(footer) = footer {
        eprintln!("{}", footer.dimmed());
    }
    eprintln!();
}

/// One line per configured language: id, display name, table and knowledge
/// sizes.
pub fn language_summary(patterns: &PatternRegistry, knowledge: &KnowledgeBase) -> Vec<String> {
    patterns
        .tables()
        .map(|table| {
            let language = table.language();
            let kinds = knowledge.entries(language).map_or(0, <[_]>::len);
            format!(
                "{:<12}{:<12}{} signatures, {} knowledge entries",
                language.id(),
                language.display_name(),
                table.signatures().len(),
                kinds
            )
        })
        .collect()
}

pub fn print_languages(patterns: &PatternRegistry, knowledge: &KnowledgeBase) {
    println!("{} {}", "▸".cyan(), "Languages (detection order)".cyan().bold());
    for line in language_summary(patterns, knowledge) {
        println!("  {line}");
    }
}
