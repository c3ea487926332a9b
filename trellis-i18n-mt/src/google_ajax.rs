//! Google AJAX Language API provider (script-style, JSONP)
//!
//! The legacy AJAX endpoint is meant to be loaded as a `<script>` that calls a
//! global function with the result. Here the request is a plain GET carrying a
//! per-request callback name, and the JSONP body is unwrapped for that name
//! only. The callback argument is either the translated text itself, an object
//! with a `translation` field, or an error object:
//!
//! ```text
//! trellis_3("Bonjour le monde");
//! trellis_4({"translation": "Bonjour"});
//! trellis_5({"error": {"code": 403, "message": "Please use a valid key"}});
//! ```
//!
//! # Authentication
//!
//! The API key is sent in the `key` query parameter and loaded from
//! `GOOGLE_AJAX_API_KEY` by [`GoogleAjaxProvider::from_env`].

use crate::error::{MtError, MtResult};
use crate::jsonp::CallbackRegistry;
use crate::translator::{
    MachineTranslator, ensure_success, http_client, normalize_locale, validate_locale,
};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

#[derive(Clone)]
pub struct GoogleAjaxProvider {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
    callbacks: CallbackRegistry,
}

impl GoogleAjaxProvider {
    const DEFAULT_BASE_URL: &'static str =
        "https://ajax.googleapis.com/ajax/services/language/translate";

    pub fn new(api_key: String) -> MtResult<Self> {
        if api_key.trim().is_empty() {
            return Err(MtError::ConfigError("API key cannot be empty".to_string()));
        }

        Ok(Self {
            api_key,
            client: http_client()?,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            callbacks: CallbackRegistry::new("trellis"),
        })
    }

    pub fn from_env() -> MtResult<Self> {
        let api_key = std::env::var("GOOGLE_AJAX_API_KEY").map_err(|_| {
            MtError::ConfigError("GOOGLE_AJAX_API_KEY environment variable not set".to_string())
        })?;

        Self::new(api_key)
    }

    /// Point the provider at another endpoint (mirrors, tests)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    /// Interpret the argument the endpoint passed to our callback
    fn parse_payload(payload: Value) -> MtResult<String> {
        match payload {
            Value::String(text) => Ok(text),
            Value::Object(mut map) => {
                if let Some(Value::String(text)) = map.remove("translation") {
                    return Ok(text);
                }
                match map.remove("error") {
                    Some(error) => {
                        let message = error["message"]
                            .as_str()
                            .or_else(|| error.as_str())
                            .unwrap_or("Translation failed")
                            .to_string();
                        Err(match error["code"].as_u64() {
                            Some(401) | Some(403) => MtError::AuthError(message),
                            _ => MtError::ProviderError(message),
                        })
                    }
                    None => Err(MtError::MalformedResponse(
                        "callback argument has neither 'translation' nor 'error'".to_string(),
                    )),
                }
            }
            other => Err(MtError::MalformedResponse(format!(
                "unexpected callback argument: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Debug for GoogleAjaxProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleAjaxProvider")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for GoogleAjaxProvider {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        if text.is_empty() {
            return Ok(String::new());
        }

        let mut pending = self.callbacks.register();
        let langpair = format!(
            "{}|{}",
            normalize_locale(source_locale),
            normalize_locale(target_locale)
        );
        debug!(callback = pending.name(), %langpair, "requesting Google AJAX translation");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("v", "1.0"),
                ("q", text),
                ("langpair", langpair.as_str()),
                ("key", self.api_key.as_str()),
                ("callback", pending.name()),
            ])
            .send()
            .await?;
        let body = ensure_success(response).await?.text().await?;

        Self::parse_payload(pending.resolve(&body)?)
    }

    fn provider_name(&self) -> &str {
        "Google AJAX Language API"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::JsonpResponder;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn provider_for(server: &MockServer) -> GoogleAjaxProvider {
        GoogleAjaxProvider::new("test-key".to_string())
            .unwrap()
            .with_base_url(&format!("{}/translate", server.uri()))
    }

    #[test]
    fn test_new_with_empty_key() {
        match GoogleAjaxProvider::new("  ".to_string()) {
            Err(MtError::ConfigError(msg)) => assert!(msg.contains("empty")),
            _ => panic!("Expected ConfigError"),
        }
    }

    #[test]
    fn test_debug_masks_key() {
        let provider = GoogleAjaxProvider::new("secret-key".to_string()).unwrap();
        let debug_str = format!("{:?}", provider);
        assert!(debug_str.contains("***"));
        assert!(!debug_str.contains("secret-key"));
    }

    #[test]
    fn test_parse_payload_variants() {
        assert_eq!(
            GoogleAjaxProvider::parse_payload(json!("Hola")).unwrap(),
            "Hola"
        );
        assert_eq!(
            GoogleAjaxProvider::parse_payload(json!({"translation": "Hola"})).unwrap(),
            "Hola"
        );
        assert_eq!(
            GoogleAjaxProvider::parse_payload(json!({"error": {"code": 400, "message": "bad"}})),
            Err(MtError::ProviderError("bad".to_string()))
        );
        assert!(matches!(
            GoogleAjaxProvider::parse_payload(json!({"error": {"code": 403, "message": "key"}})),
            Err(MtError::AuthError(_))
        ));
        assert!(matches!(
            GoogleAjaxProvider::parse_payload(json!([1, 2])),
            Err(MtError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_translate_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate"))
            .and(query_param("q", "Hello %(name)s"))
            .and(query_param("langpair", "en|fr"))
            .and(query_param("key", "test-key"))
            .respond_with(JsonpResponder::new(json!("Bonjour %(name)s")))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let result = provider.translate("Hello %(name)s", "en", "fr-CA").await;
        assert_eq!(result.unwrap(), "Bonjour %(name)s");
        assert_eq!(provider.callbacks().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_translate_error_object() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(JsonpResponder::new(
                json!({"error": {"code": 400, "message": "Unsupported language pair"}}),
            ))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let result = provider.translate("Hello", "en", "xx").await;
        assert_eq!(
            result,
            Err(MtError::ProviderError("Unsupported language pair".to_string()))
        );
    }

    #[tokio::test]
    async fn test_translate_wrong_callback_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(JsonpResponder::with_callback(json!("Hola"), "someone_else"))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let result = provider.translate("Hello", "en", "es").await;
        assert!(matches!(result, Err(MtError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_translate_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let result = provider.translate("Hello", "en", "es").await;
        assert!(matches!(result, Err(MtError::ProviderError(_))));
        assert_eq!(provider.callbacks().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_translate_empty_text_skips_request() {
        let provider = GoogleAjaxProvider::new("test-key".to_string())
            .unwrap()
            .with_base_url("http://127.0.0.1:9/unreachable");
        assert_eq!(provider.translate("", "en", "fr").await.unwrap(), "");
    }

    #[tokio::test]
    #[ignore] // Run with: cargo test --ignored
    async fn test_real_api_single_translation() {
        if std::env::var("GOOGLE_AJAX_API_KEY").is_err() {
            eprintln!("Skipping: GOOGLE_AJAX_API_KEY not set");
            return;
        }

        let provider = GoogleAjaxProvider::from_env().unwrap();
        let result = provider.translate("Hello", "en", "fr").await.unwrap();
        assert!(!result.is_empty());
    }
}
