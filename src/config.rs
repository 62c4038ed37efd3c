//! Configuration system for `errbuddy`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use crate::knowledge::KnowledgeBase;
use crate::patterns::PatternRegistry;
use crate::redact::{Redactor, DEFAULT_MAX_CHARS};

/// Redaction settings for text leaving the process
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RedactionConfig {
    /// Maximum length of redacted text, in characters
    pub max_chars: usize,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

/// Extra knowledge base consulted before the built-in one
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct KnowledgeConfig {
    pub path: Option<PathBuf>,
}

/// Extra pattern tables replacing or extending the built-in ones
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PatternsConfig {
    pub path: Option<PathBuf>,
}

/// Root configuration structure
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub redaction: RedactionConfig,
    pub knowledge: KnowledgeConfig,
    pub patterns: PatternsConfig,
}

impl Config {
    /// Load config from file, returning default config if file doesn't exist
    pub fn load() -> Self {
        Self::load_from_path(Self::config_path())
    }

    /// Load config from a specific path
    pub fn load_from_path(path: Option<PathBuf>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|contents| toml::from_str(&contents).map_err(anyhow::Error::from))
        {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable config");
                Self::default()
            }
        }
    }

    /// Get the config file path (~/.config/errbuddy/config.toml)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("errbuddy").join("config.toml"))
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // ERRBUDDY_MAX_CHARS=<n> overrides the redaction limit
        if let Some(value) = var("ERRBUDDY_MAX_CHARS") {
            match value.trim().parse() {
                Ok(max_chars) => self.redaction.max_chars = max_chars,
                Err(_) => tracing::warn!(value = %value, "ignoring invalid ERRBUDDY_MAX_CHARS"),
            }
        }
        if let Some(path) = var("ERRBUDDY_KNOWLEDGE").filter(|p| !p.is_empty()) {
            self.knowledge.path = Some(PathBuf::from(path));
        }
        if let Some(path) = var("ERRBUDDY_PATTERNS").filter(|p| !p.is_empty()) {
            self.patterns.path = Some(PathBuf::from(path));
        }
    }

    pub fn redactor(&self) -> Redactor {
        Redactor::new(self.redaction.max_chars)
    }

    /// Built-in knowledge base, with the configured file's entries in front
    pub fn knowledge_base(&self) -> Result<KnowledgeBase> {
        let mut kb = KnowledgeBase::builtin().clone();
        if let Some(path) = &self.knowledge.path {
            let extra = KnowledgeBase::from_toml_str(&read_config_file(path)?)
                .with_context(|| format!("invalid knowledge file {}", path.display()))?;
            kb.merge_front(extra);
        }
        Ok(kb)
    }

    /// Built-in pattern registry, with the configured file's tables merged in
    pub fn pattern_registry(&self) -> Result<PatternRegistry> {
        let mut registry = PatternRegistry::builtin().clone();
        if let Some(path) = &self.patterns.path {
            let extra = PatternRegistry::from_toml_str(&read_config_file(path)?)
                .with_context(|| format!("invalid pattern file {}", path.display()))?;
            registry.merge(extra);
        }
        Ok(registry)
    }
}

fn read_config_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Generate default config as TOML string
pub fn generate_default_config() -> String {
    format!(
        r#"# errbuddy configuration
# Place this file at ~/.config/errbuddy/config.toml

[redaction]
# Maximum length of text sent to a reasoning service, in characters
max_chars = {DEFAULT_MAX_CHARS}

[knowledge]
# Extra explanations, consulted before the built-in ones
# path = "/path/to/knowledge.toml"

[patterns]
# Extra pattern tables; a table replaces the built-in one for its language
# path = "/path/to/patterns.toml"

# Environment variable overrides:
# ERRBUDDY_MAX_CHARS=<n>      - Redaction length limit
# ERRBUDDY_KNOWLEDGE=<path>   - Extra knowledge file
# ERRBUDDY_PATTERNS=<path>    - Extra pattern file
# ERRBUDDY_LOG=<filter>       - Log filter, e.g. errbuddy=debug
"#
    )
}

/// Print the default config to stdout
pub fn print_default_config() {
    print!("{}", generate_default_config());
}
