//! Placeholder extraction and consistency checks
//!
//! A placeholder is a substring that a runtime formatter substitutes later:
//! printf-style (`%s`, `%d`, `%f`, `%(name)s`) or brace-style (`{name}`).
//! A translation that drops or mistypes one of them breaks formatting at
//! runtime, so translations are checked against their source string whenever
//! the translator leaves a field.
//!
//! # Example
//!
//! ```ignore
//! use trellis_i18n::placeholder::{validate, ValidationOutcome};
//!
//! assert_eq!(validate("%s items", "%s elementos"), ValidationOutcome::Valid);
//! assert!(validate("%s items", "elementos").is_invalid());
//! ```

use crate::markup::normalize_source;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX
        .get_or_init(|| Regex::new(r"%(?:\([^\s)]*\))?[sdf]|\{\w+\}").unwrap())
}

/// A placeholder found in a string, compared by exact text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaceholderToken(String);

impl PlaceholderToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a `{name}` placeholder rather than a printf one
    pub fn is_brace_style(&self) -> bool {
        self.0.starts_with('{')
    }
}

impl fmt::Display for PlaceholderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a translation was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidReason {
    UnmatchedPlaceholder,
}

impl InvalidReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidReason::UnmatchedPlaceholder => "unmatched-placeholder",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of checking a translation against its source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationOutcome {
    Valid,
    Invalid(InvalidReason),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }
}

/// Extract placeholders from already-normalized text
///
/// One left-to-right scan; order and duplicates are preserved.
pub fn extract_tokens(text: &str) -> Vec<PlaceholderToken> {
    placeholder_regex()
        .find_iter(text)
        .map(|m| PlaceholderToken(m.as_str().to_string()))
        .collect()
}

/// Extract placeholders from an HTML-rendered string
///
/// The markup is normalized first so that `<code>%s</code>` or `%(name)s`
/// split by a `<br>` are matched the same way as in plain text.
pub fn extract_placeholders(html: &str) -> Vec<PlaceholderToken> {
    extract_tokens(&normalize_source(html))
}

/// Decide whether `translation` preserves the placeholders of `source_html`
///
/// - both have placeholders: invalid iff some placeholder of the translation
///   does not occur anywhere in the source. Repeating a source placeholder is
///   allowed, and source placeholders missing from the translation are not
///   reported.
/// - neither has placeholders: valid.
/// - only one of them has placeholders: invalid.
pub fn validate(source_html: &str, translation: &str) -> ValidationOutcome {
    let origs = extract_placeholders(source_html);
    let trads = extract_placeholders(translation);

    match (origs.is_empty(), trads.is_empty()) {
        (false, false) => {
            if trads.iter().all(|token| origs.contains(token)) {
                ValidationOutcome::Valid
            } else {
                ValidationOutcome::Invalid(InvalidReason::UnmatchedPlaceholder)
            }
        }
        (true, true) => ValidationOutcome::Valid,
        _ => ValidationOutcome::Invalid(InvalidReason::UnmatchedPlaceholder),
    }
}
