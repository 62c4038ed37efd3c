//! Language identifiers for diagnostic-producing toolchains and runtimes.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A language (or runtime) whose error output errbuddy can recognise.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Rust,
    Go,
    Python,
    #[value(name = "typescript", alias = "ts")]
    TypeScript,
    #[value(name = "javascript", alias = "js", alias = "node")]
    JavaScript,
    Java,
    #[value(name = "csharp", alias = "cs", alias = "dotnet")]
    CSharp,
    #[value(name = "cpp", alias = "c", alias = "c++")]
    Cpp,
}

impl Language {
    /// Every language, in built-in detection priority order.
    pub const ALL: [Language; 8] = [
        Language::Rust,
        Language::Go,
        Language::Python,
        Language::TypeScript,
        Language::JavaScript,
        Language::Java,
        Language::CSharp,
        Language::Cpp,
    ];

    /// Stable identifier used in configuration files and JSON output.
    pub fn id(self) -> &'static str {
        match self {
            Language::Rust => "rust",
            Language::Go => "go",
            Language::Python => "python",
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Java => "java",
            Language::CSharp => "csharp",
            Language::Cpp => "cpp",
        }
    }

    /// Human-facing name for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::Rust => "Rust",
            Language::Go => "Go",
            Language::Python => "Python",
            Language::TypeScript => "TypeScript",
            Language::JavaScript => "JavaScript",
            Language::Java => "Java",
            Language::CSharp => "C#",
            Language::Cpp => "C/C++",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Language::ALL
            .into_iter()
            .find(|lang| lang.id() == lowered)
            .ok_or_else(|| {
                let valid: Vec<&str> = Language::ALL.iter().map(|l| l.id()).collect();
                format!("Unknown language: {s}. Valid options: {}", valid.join(", "))
            })
    }
}
