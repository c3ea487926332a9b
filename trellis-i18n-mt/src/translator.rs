//! Machine Translation trait and locale helpers
//!
//! `MachineTranslator` is the single seam between the editor and a remote
//! translation service. Each service gets one adapter implementing it; which
//! adapter is used is decided once, from configuration.
//!
//! # Example
//!
//! ```ignore
//! use trellis_i18n_mt::{MachineTranslator, YandexProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = YandexProvider::from_env()?;
//!     let result = provider.translate("Hello, world!", "en", "fr").await?;
//!     println!("{}", result); // "Bonjour, le monde!"
//!     Ok(())
//! }
//! ```

use crate::error::{MtError, MtResult};
use async_trait::async_trait;

/// Generic trait for machine translation providers
///
/// Implementations receive plain text (markup already stripped) and return the
/// raw text produced by the service. Cleaning up that text is the caller's job.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single text string from source to target locale
    ///
    /// # Arguments
    ///
    /// * `text` - The text to translate
    /// * `source_locale` - Source language code (e.g., "en", "en-US")
    /// * `target_locale` - Target language code (e.g., "fr", "pt-br")
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The translated text
    /// * `Err(MtError)` - If translation fails
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String>;

    /// Get the name of this translation provider
    ///
    /// Used for logging to identify which provider handled a translation.
    fn provider_name(&self) -> &str;
}

/// Build the HTTP client shared by every request of one provider
pub(crate) fn http_client() -> MtResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .map_err(|e| MtError::NetworkError(format!("Failed to create HTTP client: {}", e)))
}

/// Turn a non-2xx response into the matching error
pub(crate) async fn ensure_success(response: reqwest::Response) -> MtResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(MtError::from_status(status, &body))
}

/// Normalize a locale code by stripping region information
///
/// Converts locale codes to the base language most services expect:
/// - `en-US` → `en`
/// - `pt_BR` → `pt`
/// - `zh-Hans` → `zh`
/// - `sr.UTF-8` → `sr`
pub fn normalize_locale(locale: &str) -> String {
    locale
        .split(['-', '_', '.'])
        .next()
        .unwrap_or(locale)
        .to_lowercase()
}

/// Drop a gettext codeset suffix: `sr.UTF-8` → `sr`, `pt_BR.utf8` → `pt_BR`
pub fn strip_codeset(locale: &str) -> &str {
    locale.split('.').next().unwrap_or(locale)
}

/// Validate that a locale code is in acceptable format
///
/// Checks that the locale code contains only alphanumeric characters,
/// hyphens, underscores (following ISO 639 conventions) and the dot of a
/// codeset suffix.
pub fn validate_locale(locale: &str) -> MtResult<()> {
    if locale.is_empty() {
        return Err(MtError::InvalidLocale("Locale code is empty".to_string()));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(MtError::InvalidLocale(format!(
            "Invalid characters in locale code: {}",
            locale
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_locale_with_region() {
        assert_eq!(normalize_locale("en-US"), "en");
        assert_eq!(normalize_locale("en-GB"), "en");
        assert_eq!(normalize_locale("pt_BR"), "pt");
    }

    #[test]
    fn test_normalize_locale_with_script() {
        assert_eq!(normalize_locale("zh-Hans"), "zh");
        assert_eq!(normalize_locale("sr-Latn"), "sr");
    }

    #[test]
    fn test_normalize_locale_with_encoding() {
        assert_eq!(normalize_locale("sr.UTF-8"), "sr");
    }

    #[test]
    fn test_normalize_locale_case_insensitive() {
        assert_eq!(normalize_locale("EN"), "en");
        assert_eq!(normalize_locale("FR-ca"), "fr");
    }

    #[test]
    fn test_validate_locale_valid_codes() {
        assert!(validate_locale("en").is_ok());
        assert!(validate_locale("en-US").is_ok());
        assert!(validate_locale("de_DE").is_ok());
        assert!(validate_locale("sr.UTF-8").is_ok());
    }

    #[test]
    fn test_strip_codeset() {
        assert_eq!(strip_codeset("sr.UTF-8"), "sr");
        assert_eq!(strip_codeset("pt_BR.utf8"), "pt_BR");
        assert_eq!(strip_codeset("fr"), "fr");
    }

    #[test]
    fn test_validate_locale_invalid_codes() {
        assert!(validate_locale("").is_err());
        assert!(validate_locale("en@invalid").is_err());
        assert!(validate_locale("fr|de").is_err());
    }

    #[test]
    fn test_validate_locale_error_messages() {
        match validate_locale("en@US") {
            Err(MtError::InvalidLocale(msg)) => {
                assert!(msg.contains("Invalid characters"));
            }
            _ => panic!("Expected InvalidLocale error"),
        }
    }
}
