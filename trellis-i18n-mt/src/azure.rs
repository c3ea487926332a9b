//! Microsoft Azure Translator provider
//!
//! Uses the Translator Text v3 REST API. The subscription key travels in the
//! `Ocp-Apim-Subscription-Key` header; errors come back as
//! `{"error": {"code": 401000, "message": "..."}}`, successes as
//! `[{"translations": [{"text": "...", "to": "fr"}]}]`.

use crate::error::{MtError, MtResult};
use crate::translator::{
    MachineTranslator, http_client, normalize_locale, strip_codeset, validate_locale,
};
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

#[derive(Clone)]
pub struct AzureProvider {
    subscription_key: String,
    client: reqwest::Client,
    base_url: String,
}

impl AzureProvider {
    const DEFAULT_BASE_URL: &'static str = "https://api.cognitive.microsofttranslator.com/translate";

    pub fn new(subscription_key: String) -> MtResult<Self> {
        if subscription_key.trim().is_empty() {
            return Err(MtError::ConfigError(
                "Azure subscription key cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            subscription_key,
            client: http_client()?,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn from_env() -> MtResult<Self> {
        let key = std::env::var("AZURE_CLIENT_SECRET").map_err(|_| {
            MtError::ConfigError("AZURE_CLIENT_SECRET environment variable not set".to_string())
        })?;

        Self::new(key)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Build the error for an `{"error": {...}}` body
    fn api_error(error: &Value) -> MtError {
        let code = error["code"].as_u64().unwrap_or_default();
        let message = format!(
            "Microsoft Translation API error: Error code {}, {}",
            code,
            error["message"].as_str().unwrap_or("unknown error")
        );
        // 401xxx: missing or invalid credentials
        if (401_000..402_000).contains(&code) {
            MtError::AuthError(message)
        } else {
            MtError::ProviderError(message)
        }
    }

    fn parse_body(status: reqwest::StatusCode, body: &str) -> MtResult<String> {
        let value: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(_) if !status.is_success() => return Err(MtError::from_status(status, body)),
            Err(e) => return Err(e.into()),
        };

        if let Some(error) = value.get("error") {
            return Err(Self::api_error(error));
        }
        if !status.is_success() {
            return Err(MtError::from_status(status, body));
        }

        value[0]["translations"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                MtError::MalformedResponse(
                    "Invalid API response: missing 'translations[0].text'".to_string(),
                )
            })
    }
}

impl std::fmt::Debug for AzureProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureProvider")
            .field("subscription_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for AzureProvider {
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

        let from = normalize_locale(source_locale);
        let to = strip_codeset(target_locale).replace('_', "-");
        debug!(%from, %to, "requesting Azure translation");

        let response = self
            .client
            .post(&self.base_url)
            .query(&[("api-version", "3.0"), ("from", from.as_str()), ("to", to.as_str())])
            .header("Ocp-Apim-Subscription-Key", &self.subscription_key)
            .json(&json!([{ "Text": text }]))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        Self::parse_body(status, &body)
    }

    fn provider_name(&self) -> &str {
        "Microsoft Azure Translator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> AzureProvider {
        AzureProvider::new("azure-key".to_string())
            .unwrap()
            .with_base_url(&format!("{}/translate", server.uri()))
    }

    #[tokio::test]
    async fn test_translate_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("api-version", "3.0"))
            .and(query_param("from", "en"))
            .and(query_param("to", "zh-Hans"))
            .and(header("Ocp-Apim-Subscription-Key", "azure-key"))
            .and(body_json(json!([{"Text": "{count} files"}])))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"translations": [{"text": "{count} 个文件", "to": "zh-Hans"}]}
            ])))
            .mount(&server)
            .await;

        let result = provider_for(&server)
            .translate("{count} files", "en", "zh_Hans")
            .await;
        assert_eq!(result.unwrap(), "{count} 个文件");
    }

    #[tokio::test]
    async fn test_translate_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"code": 401000, "message": "The request is not authorized"}
            })))
            .mount(&server)
            .await;

        match provider_for(&server).translate("Hi", "en", "fr").await {
            Err(MtError::AuthError(msg)) => {
                assert!(msg.contains("Error code 401000"));
                assert!(msg.contains("not authorized"));
            }
            other => panic!("Expected AuthError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_translate_bad_gateway_html() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let result = provider_for(&server).translate("Hi", "en", "fr").await;
        assert!(matches!(result, Err(MtError::ProviderError(_))));
    }

    #[tokio::test]
    async fn test_translate_unexpected_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"translations": []}])))
            .mount(&server)
            .await;

        let result = provider_for(&server).translate("Hi", "en", "fr").await;
        assert!(matches!(result, Err(MtError::MalformedResponse(_))));
    }
}
