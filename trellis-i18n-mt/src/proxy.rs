//! Same-origin translation proxy provider
//!
//! The editor page posts `from`, `to` and `text` as a form to a server-side
//! endpoint that holds the real provider credential (see the
//! `trellis-i18n-mt-web` crate). The endpoint answers with
//! `{"success": true, "translation": "..."}` or
//! `{"success": false, "error": "..."}`.

use crate::error::{MtError, MtResult};
use crate::translator::{MachineTranslator, ensure_success, http_client, validate_locale};
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Body returned by the proxy endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProxyResponse {
    pub fn ok(translation: String) -> Self {
        Self {
            success: true,
            translation: Some(translation),
            error: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            success: false,
            translation: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProxyProvider {
    endpoint: Url,
    client: reqwest::Client,
}

impl ProxyProvider {
    /// `endpoint` must be an absolute `http` or `https` URL
    pub fn new(endpoint: &str) -> MtResult<Self> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(MtError::ConfigError(
                "Proxy endpoint cannot be empty".to_string(),
            ));
        }

        let endpoint = Url::parse(endpoint).map_err(|e| {
            MtError::ConfigError(format!("Invalid proxy endpoint '{}': {}", endpoint, e))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(MtError::ConfigError(format!(
                "Proxy endpoint must be http or https, got '{}'",
                endpoint
            )));
        }

        Ok(Self {
            endpoint,
            client: http_client()?,
        })
    }

    pub fn from_env() -> MtResult<Self> {
        let endpoint = std::env::var("TRELLIS_PROXY_URL").map_err(|_| {
            MtError::ConfigError("TRELLIS_PROXY_URL environment variable not set".to_string())
        })?;

        Self::new(&endpoint)
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}

#[async_trait]
impl MachineTranslator for ProxyProvider {
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

        debug!(endpoint = %self.endpoint, "requesting translation from proxy");
        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&[
                ("from", source_locale),
                ("to", target_locale),
                ("text", text),
            ])
            .send()
            .await?;
        let body: ProxyResponse =
            serde_json::from_str(&ensure_success(response).await?.text().await?)?;

        match body {
            ProxyResponse {
                success: true,
                translation: Some(translation),
                ..
            } => Ok(translation),
            ProxyResponse { success: true, .. } => Err(MtError::MalformedResponse(
                "proxy reported success without a translation".to_string(),
            )),
            ProxyResponse { error, .. } => Err(MtError::ProviderError(
                error.unwrap_or_else(|| "Translation failed".to_string()),
            )),
        }
    }

    fn provider_name(&self) -> &str {
        "Translation proxy"
    }
}
