//! DeepL REST provider
//!
//! Posts a JSON body to `/v2/translate` with the secret carried in the body
//! itself (`auth_key`), and reads `{"translations": [{"text": "..."}]}` back.
//! Free-plan keys use the `api-free` host.

use crate::error::{MtError, MtResult};
use crate::translator::{
    MachineTranslator, ensure_success, http_client, normalize_locale, strip_codeset,
    validate_locale,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Serialize)]
struct DeepLRequest<'a> {
    auth_key: &'a str,
    text: [&'a str; 1],
    source_lang: String,
    target_lang: String,
}

#[derive(Deserialize)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Deserialize)]
struct DeepLTranslation {
    text: String,
}

#[derive(Clone)]
pub struct DeepLProvider {
    auth_key: String,
    client: reqwest::Client,
    base_url: String,
}

impl DeepLProvider {
    const FREE_BASE_URL: &'static str = "https://api-free.deepl.com/v2/translate";
    const PRO_BASE_URL: &'static str = "https://api.deepl.com/v2/translate";

    pub fn new(auth_key: String, free_api: bool) -> MtResult<Self> {
        if auth_key.trim().is_empty() {
            return Err(MtError::ConfigError(
                "DeepL auth key cannot be empty".to_string(),
            ));
        }

        let base_url = if free_api {
            Self::FREE_BASE_URL
        } else {
            Self::PRO_BASE_URL
        };
        Ok(Self {
            auth_key,
            client: http_client()?,
            base_url: base_url.to_string(),
        })
    }

    pub fn from_env() -> MtResult<Self> {
        let auth_key = std::env::var("DEEPL_AUTH_KEY").map_err(|_| {
            MtError::ConfigError("DEEPL_AUTH_KEY environment variable not set".to_string())
        })?;
        let free_api = std::env::var("DEEPL_FREE_API")
            .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true);

        Self::new(auth_key, free_api)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// DeepL wants upper-case codes and keeps regional targets (`PT-BR`)
    fn target_code(locale: &str) -> String {
        strip_codeset(locale).replace('_', "-").to_uppercase()
    }
}

impl std::fmt::Debug for DeepLProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepLProvider")
            .field("auth_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for DeepLProvider {
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

        let request = DeepLRequest {
            auth_key: &self.auth_key,
            text: [text],
            source_lang: normalize_locale(source_locale).to_uppercase(),
            target_lang: Self::target_code(target_locale),
        };
        debug!(target_lang = %request.target_lang, "requesting DeepL translation");

        let response = self
            .client
            .post(&self.base_url)
            .json(&request)
            .send()
            .await?;
        let body: DeepLResponse =
            serde_json::from_str(&ensure_success(response).await?.text().await?)?;

        body.translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| {
                MtError::MalformedResponse("DeepL response has no translations".to_string())
            })
    }

    fn provider_name(&self) -> &str {
        "DeepL"
    }
}
