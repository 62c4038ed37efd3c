//! Command-line interface definitions for `errbuddy`.

use clap::Parser;
use clap_complete::Shell;

use crate::language::Language;

/// Explain error messages from compilers and runtimes
#[derive(Parser, Debug)]
#[command(
    name = "errbuddy",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("ERRBUDDY_GIT_SHA"), ")"),
    about,
    long_about = None
)]
#[command(
    after_help = "EXAMPLES:\n    errbuddy \"TypeError: Cannot read properties of undefined\"\n    cargo build 2>&1 | errbuddy\n    python app.py 2>&1 | errbuddy --json\n    errbuddy --prompt < crash.log\n    errbuddy --response answer.txt < crash.log"
)]
pub struct Cli {
    /// Error message to explain (reads stdin when omitted)
    #[arg(trailing_var_arg = true)]
    pub error: Vec<String>,

    /// Output as JSON
    #[arg(long, short = 'j')]
    pub json: bool,

    /// Treat the input as this language instead of detecting it
    #[arg(long, short = 'l', value_enum, value_name = "LANG")]
    pub language: Option<Language>,

    /// Explain using a reasoning-service answer read from FILE ('-' for stdin)
    #[arg(long, short = 'r', value_name = "FILE")]
    pub response: Option<String>,

    /// Print the input with paths and secrets redacted, then exit
    #[arg(long)]
    pub redact: bool,

    /// Print the prompt for a reasoning service (input redacted), then exit
    #[arg(long, short = 'p')]
    pub prompt: bool,

    /// Show debug info (analysis details and raw response)
    #[arg(long, short = 'd')]
    pub debug: bool,

    /// Print the default configuration file and exit
    #[arg(long)]
    pub print_config: bool,

    /// List supported languages in detection order and exit
    #[arg(long)]
    pub list_languages: bool,

    /// Generate shell completions
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}
