//! Reading diagnostic text from the command line or stdin.

use anyhow::{Context, Result};
use std::io::{self, IsTerminal, Read};

/// Decode raw bytes as text. A UTF-8 or UTF-16 byte-order mark selects the
/// encoding and is stripped; anything else is read as UTF-8, with invalid
/// sequences replaced rather than rejected.
pub fn decode_input(bytes: &[u8]) -> String {
    let (text, encoding, had_errors) = encoding_rs::UTF_8.decode(bytes);
    if had_errors {
        tracing::warn!(encoding = encoding.name(), "input contained invalid byte sequences");
    }
    text.into_owned()
}

/// Error text from positional arguments, or from stdin when it is piped.
///
/// Returns `Ok(None)` when there is nothing to read.
pub fn read_input(args: &[String]) -> Result<Option<String>> {
    if !args.is_empty() {
        return Ok(non_empty(args.join(" ")));
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut bytes = Vec::new();
    stdin
        .lock()
        .read_to_end(&mut bytes)
        .context("failed to read stdin")?;
    Ok(non_empty(decode_input(&bytes)))
}

/// Read a whole file (or stdin for `-`) as text
pub fn read_text_source(source: &str) -> Result<String> {
    let bytes = if source == "-" {
        let mut bytes = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .context("failed to read stdin")?;
        bytes
    } else {
        std::fs::read(source).with_context(|| format!("failed to read {source}"))?
    };
    Ok(decode_input(&bytes))
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
