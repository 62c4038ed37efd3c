//! Properties that must hold for any input text.

use errbuddy::{parse_response, Redactor};
use proptest::prelude::*;

/// Text assembled from fragments that trigger the redaction and parsing
/// rules, so generated inputs actually exercise them.
fn diagnostic_text() -> impl Strategy<Value = String> {
    let fragment = prop::sample::select(vec![
        r"C:\Users\bob\",
        "D:/work/",
        "/home/alice/",
        "/tmp/",
        "app.py",
        "token=",
        "password: ",
        "API_KEY=",
        "Bearer ",
        "sk-abcdefghijklmnopqrstuv",
        "[REDACTED]",
        "<path>",
        "TokenError: ",
        "WHAT:",
        "**Why:**",
        "## FIX:",
        "EXAMPLE: ",
        "```",
        "C#",
        ". ",
        " ",
        "\n",
        "x",
        "é",
    ]);
    prop::collection::vec(fragment, 0..24).prop_map(|parts| parts.concat())
}

fn any_text() -> impl Strategy<Value = String> {
    prop_oneof![any::<String>(), diagnostic_text()]
}

proptest! {
    #[test]
    fn test_redaction_is_idempotent(text in any_text(), max_chars in 0usize..80) {
        let redactor = Redactor::new(max_chars);
        let once = redactor.redact(&text);
        prop_assert!(once.chars().count() <= max_chars);
        prop_assert_eq!(redactor.redact(&once), once);
    }

    #[test]
    fn test_default_redaction_is_idempotent(text in any_text()) {
        let redactor = Redactor::default();
        let once = redactor.redact(&text);
        prop_assert_eq!(redactor.redact(&once), once);
    }

    #[test]
    fn test_parse_response_keeps_raw_text(text in any_text()) {
        let parsed = parse_response(&text);
        prop_assert_eq!(parsed.raw, text);
    }
}
