//! Yandex Translate provider (JSONP)
//!
//! Calls the `tr.json/translate` endpoint cross-origin with a per-request
//! callback. A successful payload looks like
//! `{"code": 200, "lang": "en-fr", "text": ["Bonjour"]}`; any other `code` is
//! an error and usually carries a `message`.
//!
//! The API key goes in the `key` query parameter (`YANDEX_TRANSLATE_KEY`).

use crate::error::{MtError, MtResult};
use crate::jsonp::CallbackRegistry;
use crate::translator::{
    MachineTranslator, ensure_success, http_client, normalize_locale, validate_locale,
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct YandexPayload {
    code: u16,
    #[serde(default)]
    text: Vec<String>,
    message: Option<String>,
}

#[derive(Clone)]
pub struct YandexProvider {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
    callbacks: CallbackRegistry,
}

impl YandexProvider {
    const DEFAULT_BASE_URL: &'static str = "https://translate.yandex.net/api/v1.5/tr.json/translate";

    pub fn new(api_key: String) -> MtResult<Self> {
        if api_key.trim().is_empty() {
            return Err(MtError::ConfigError("API key cannot be empty".to_string()));
        }

        Ok(Self {
            api_key,
            client: http_client()?,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            callbacks: CallbackRegistry::new("yandex"),
        })
    }

    pub fn from_env() -> MtResult<Self> {
        let api_key = std::env::var("YANDEX_TRANSLATE_KEY").map_err(|_| {
            MtError::ConfigError("YANDEX_TRANSLATE_KEY environment variable not set".to_string())
        })?;

        Self::new(api_key)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    fn into_translation(payload: YandexPayload) -> MtResult<String> {
        match payload.code {
            200 => payload.text.into_iter().next().ok_or_else(|| {
                MtError::MalformedResponse("Yandex response has an empty 'text' array".to_string())
            }),
            // 401: invalid key, 402: blocked key
            401 | 402 => Err(MtError::AuthError(
                payload
                    .message
                    .unwrap_or_else(|| "API key is invalid or blocked".to_string()),
            )),
            code => Err(MtError::ProviderError(
                payload
                    .message
                    .unwrap_or_else(|| format!("Yandex error code {}", code)),
            )),
        }
    }
}

impl std::fmt::Debug for YandexProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YandexProvider")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for YandexProvider {
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
        let lang = format!(
            "{}-{}",
            normalize_locale(source_locale),
            normalize_locale(target_locale)
        );
        debug!(callback = pending.name(), %lang, "requesting Yandex translation");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("lang", lang.as_str()),
                ("text", text),
                ("callback", pending.name()),
            ])
            .send()
            .await?;
        let body = ensure_success(response).await?.text().await?;

        let payload: YandexPayload = serde_json::from_value(pending.resolve(&body)?)?;
        Self::into_translation(payload)
    }

    fn provider_name(&self) -> &str {
        "Yandex Translate"
    }
}
