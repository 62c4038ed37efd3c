use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::io;
use tracing_subscriber::EnvFilter;

use errbuddy::analysis::Analyzer;
use errbuddy::cli::Cli;
use errbuddy::config::{print_default_config, Config};
use errbuddy::input::{read_input, read_text_source};
use errbuddy::output::{
    format_location, print_colored, print_debug_section, print_languages, to_json, Diagnosis,
};
use errbuddy::prompt::build_prompt;
use errbuddy::response::parse_response;

fn format_error(message: &str, tip: Option<&str>) -> String {
    let mut output = format!("{} {}", "Error:".red().bold(), message);
    if let Some(tip) = tip {
        output.push('\n');
        output.push_str(&format!("{} {}", "Tip:".blue().bold(), tip));
    }
    output
}

/// Logs go to stderr. `--debug` turns on engine debug events; otherwise
/// `ERRBUDDY_LOG` is honoured, defaulting to warnings only.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("errbuddy=debug")
    } else {
        EnvFilter::try_from_env("ERRBUDDY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "errbuddy", &mut io::stdout());
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Some(shell) = cli.completions {
        print_completions(shell);
        return Ok(());
    }

    if cli.print_config {
        print_default_config();
        return Ok(());
    }

    let mut config = Config::load();
    config.apply_env_overrides();
    let patterns = config.pattern_registry()?;
    let knowledge = config.knowledge_base()?;

    if cli.list_languages {
        print_languages(&patterns, &knowledge);
        return Ok(());
    }

    if cli.response.as_deref() == Some("-") && cli.error.is_empty() {
        bail!(format_error(
            "--response - reads the answer from stdin, so the error must be given as arguments.",
            Some("errbuddy --response - \"<error text>\" < answer.txt"),
        ));
    }

    let Some(input) = read_input(&cli.error)? else {
        bail!(format_error(
            "No input provided. Usage: errbuddy <error message>",
            Some("Use 2>&1 to capture stderr: command 2>&1 | errbuddy"),
        ));
    };

    let redactor = config.redactor();
    if cli.redact {
        println!("{}", redactor.redact(&input));
        return Ok(());
    }

    let analyzer = Analyzer::new(&patterns, &knowledge);
    let analysis = match cli.language {
        Some(language) => analyzer.analyze_as(&input, language)?,
        None => analyzer.analyze(&input),
    };

    if cli.debug {
        print_debug_section(
            "Input",
            &input,
            Some(format!(
                "({} chars, {} lines)",
                input.chars().count(),
                input.lines().count()
            )),
        );
        print_debug_section(
            "Analysis",
            &serde_json::to_string_pretty(&analysis)?,
            format_location(&analysis).map(|loc| format!("(location {loc})")),
        );
    }

    if cli.prompt {
        println!("{}", build_prompt(&analysis, &input, &redactor));
        return Ok(());
    }

    let diagnosis = match &cli.response {
        Some(source) => {
            let raw = read_text_source(source)
                .with_context(|| format!("could not load reasoning-service answer from {source}"))?;
            let parsed = parse_response(&raw);
            if cli.debug {
                print_debug_section(
                    "Raw Response",
                    &parsed.raw,
                    Some(format!(
                        "({} chars, {} lines)",
                        parsed.raw.chars().count(),
                        parsed.raw.lines().count()
                    )),
                );
            }
            Diagnosis::online(input, analysis, parsed)
        }
        None => Diagnosis::offline(input, analysis),
    };

    if cli.json {
        println!("{}", to_json(&diagnosis)?);
    } else {
        print_colored(&diagnosis);
    }

    Ok(())
}
