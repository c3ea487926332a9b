//! Request and result types for translation suggestions

use serde::{Deserialize, Serialize};

/// One suggestion to fetch, built fresh for every user action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionRequest {
    /// Source string as rendered in the grid (may contain markup)
    pub source_text: String,
    pub source_lang: String,
    pub target_lang: String,
}

impl SuggestionRequest {
    pub fn new(source_text: &str, source_lang: &str, target_lang: &str) -> Self {
        Self {
            source_text: source_text.to_string(),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
        }
    }
}

/// Outcome of a suggestion request, ready to be shown to the translator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuggestionResult {
    Success(String),
    Failure(String),
}

impl SuggestionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SuggestionResult::Success(_))
    }

    /// View as a `Result`: translated text or failure message
    pub fn into_result(self) -> Result<String, String> {
        match self {
            SuggestionResult::Success(text) => Ok(text),
            SuggestionResult::Failure(message) => Err(message),
        }
    }
}
