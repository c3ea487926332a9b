//! Suggestion client
//!
//! Wraps the configured [`MachineTranslator`] with the steps every provider
//! shares: markup is stripped from the source before the request, the
//! provider's answer is cleaned up afterwards, slow providers are cut off by a
//! timeout, and every error is turned into a message for the translator.

use crate::data::{SuggestionRequest, SuggestionResult};
use crate::error::{MtError, MtResult};
use crate::translator::{MachineTranslator, validate_locale};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use trellis_i18n::markup::{denormalize_translation, normalize_source};

#[derive(Clone)]
pub struct SuggestionClient {
    provider: Arc<dyn MachineTranslator>,
    timeout: Duration,
}

impl SuggestionClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(provider: Arc<dyn MachineTranslator>) -> Self {
        Self {
            provider,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch a suggestion, keeping the error type
    pub async fn try_suggest(&self, request: &SuggestionRequest) -> MtResult<String> {
        validate_locale(&request.source_lang)?;
        validate_locale(&request.target_lang)?;

        let text = normalize_source(&request.source_text);
        debug!(
            provider = self.provider_name(),
            source = %request.source_lang,
            target = %request.target_lang,
            "requesting suggestion"
        );

        let translated = tokio::time::timeout(
            self.timeout,
            self.provider
                .translate(&text, &request.source_lang, &request.target_lang),
        )
        .await
        .map_err(|_| MtError::Timeout)??;

        Ok(denormalize_translation(&translated))
    }

    /// Fetch a suggestion; failures come back as a message to display
    pub async fn suggest(&self, request: &SuggestionRequest) -> SuggestionResult {
        match self.try_suggest(request).await {
            Ok(text) => SuggestionResult::Success(text),
            Err(err) => {
                warn!(
                    provider = self.provider_name(),
                    kind = err.kind(),
                    "suggestion failed: {}",
                    err
                );
                SuggestionResult::Failure(err.to_string())
            }
        }
    }
}

impl std::fmt::Debug for SuggestionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionClient")
            .field("provider", &self.provider_name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockMode, MockTranslator};
    use std::collections::HashMap;

    fn client(mock: MockTranslator) -> SuggestionClient {
        SuggestionClient::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_source_is_normalized() {
        let client = client(MockTranslator::new(MockMode::NoOp));
        let request = SuggestionRequest::new(
            "Hello <code>%(name)s</code>,<br>Tom &amp; Jerry &lt;3",
            "en",
            "fr",
        );
        assert_eq!(
            client.suggest(&request).await,
            SuggestionResult::Success("Hello %(name)s,\nTom & Jerry <3".to_string())
        );
    }

    #[tokio::test]
    async fn test_translation_is_denormalized() {
        let mut map = HashMap::new();
        map.insert(
            ("Hello %(name)s".to_string(), "fr".to_string()),
            "Bonjour % (name)s, l&#39;ami".to_string(),
        );
        let client = client(MockTranslator::new(MockMode::Mappings(map)));
        let request = SuggestionRequest::new("Hello %(name)s", "en", "fr");
        assert_eq!(
            client.suggest(&request).await,
            SuggestionResult::Success("Bonjour  %(name)s , l'ami".to_string())
        );
    }

    #[tokio::test]
    async fn test_provider_error_becomes_failure() {
        let client = client(MockTranslator::new(MockMode::Error(MtError::ProviderError(
            "Daily quota exceeded".to_string(),
        ))));
        let request = SuggestionRequest::new("Hello", "en", "fr");
        assert_eq!(
            client.suggest(&request).await,
            SuggestionResult::Failure("Daily quota exceeded".to_string())
        );
    }

    #[tokio::test]
    async fn test_timeout_becomes_failure() {
        let client = client(MockTranslator::with_delay(MockMode::Suffix, 500))
            .with_timeout(Duration::from_millis(20));
        let request = SuggestionRequest::new("Hello", "en", "fr");
        assert_eq!(
            client.suggest(&request).await,
            SuggestionResult::Failure("timeout".to_string())
        );
    }

    #[tokio::test]
    async fn test_invalid_locale_never_reaches_provider() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let client = client(mock.clone());
        let request = SuggestionRequest::new("Hello", "en", "fr;drop");
        assert!(!client.suggest(&request).await.is_success());
        assert_eq!(mock.call_count(), 0);
    }

    #[test]
    fn test_default_timeout() {
        let client = client(MockTranslator::new(MockMode::NoOp));
        assert_eq!(client.timeout(), Duration::from_secs(10));
        assert!(format!("{:?}", client).contains("Mock Translator"));
    }
}
