//! Google Cloud Translation provider (v3 REST)
//!
//! Authenticates with a credentials file in the format `gcloud` writes:
//!
//! - `"type": "service_account"`: a JWT assertion signed with the account's
//!   private key is exchanged for an access token
//! - `"type": "authorized_user"`: the refresh token is exchanged instead
//!
//! The access token is cached until a minute before it expires.
//!
//! # Configuration
//!
//! `GOOGLE_APPLICATION_CREDENTIALS_PATH` points at the credentials file and
//! `GOOGLE_PROJECT_ID` names the project billed for the requests.
//!
//! # Example
//!
//! ```ignore
//! use trellis_i18n_mt::{GoogleCloudProvider, MachineTranslator};
//!
//! let provider = GoogleCloudProvider::from_env()?;
//! let text = provider.translate("Hello, world!", "en", "fr").await?;
//! ```

use crate::error::{MtError, MtResult};
use crate::translator::{
    MachineTranslator, ensure_success, http_client, strip_codeset, validate_locale,
};
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::debug;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const TRANSLATION_SCOPE: &str = "https://www.googleapis.com/auth/cloud-translation";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Contents of a Google credentials file
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GoogleCredentials {
    ServiceAccount {
        client_email: String,
        private_key: String,
        #[serde(default)]
        private_key_id: Option<String>,
        #[serde(default = "default_token_uri")]
        token_uri: String,
    },
    AuthorizedUser {
        client_id: String,
        client_secret: String,
        refresh_token: String,
        #[serde(default = "default_token_uri")]
        token_uri: String,
    },
}

impl GoogleCredentials {
    pub fn from_file(path: &str) -> MtResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MtError::ConfigError(format!("Cannot read Google credentials '{}': {}", path, e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            MtError::ConfigError(format!("Invalid Google credentials '{}': {}", path, e))
        })
    }

    fn token_uri(&self) -> &str {
        match self {
            GoogleCredentials::ServiceAccount { token_uri, .. }
            | GoogleCredentials::AuthorizedUser { token_uri, .. } => token_uri,
        }
    }
}

impl std::fmt::Debug for GoogleCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GoogleCredentials::ServiceAccount { client_email, .. } => f
                .debug_struct("ServiceAccount")
                .field("client_email", client_email)
                .field("private_key", &"***")
                .finish(),
            GoogleCredentials::AuthorizedUser { client_id, .. } => f
                .debug_struct("AuthorizedUser")
                .field("client_id", client_id)
                .field("refresh_token", &"***")
                .finish(),
        }
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_lifetime")]
    expires_in: u64,
}

fn default_token_lifetime() -> u64 {
    3600
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Clone)]
pub struct GoogleCloudProvider {
    credentials: GoogleCredentials,
    project_id: String,
    client: reqwest::Client,
    base_url: String,
    token: Arc<Mutex<Option<CachedToken>>>,
}

impl GoogleCloudProvider {
    const DEFAULT_BASE_URL: &'static str = "https://translation.googleapis.com";

    pub fn new(credentials: GoogleCredentials, project_id: String) -> MtResult<Self> {
        if project_id.trim().is_empty() {
            return Err(MtError::ConfigError(
                "Google project id cannot be empty".to_string(),
            ));
        }
        if let GoogleCredentials::ServiceAccount { private_key, .. } = &credentials {
            encoding_key(private_key)?;
        }

        Ok(Self {
            credentials,
            project_id,
            client: http_client()?,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            token: Arc::new(Mutex::new(None)),
        })
    }

    pub fn from_credentials_file(path: &str, project_id: String) -> MtResult<Self> {
        Self::new(GoogleCredentials::from_file(path)?, project_id)
    }

    pub fn from_env() -> MtResult<Self> {
        let path = std::env::var("GOOGLE_APPLICATION_CREDENTIALS_PATH").map_err(|_| {
            MtError::ConfigError(
                "GOOGLE_APPLICATION_CREDENTIALS_PATH environment variable not set".to_string(),
            )
        })?;
        let project_id = std::env::var("GOOGLE_PROJECT_ID").map_err(|_| {
            MtError::ConfigError("GOOGLE_PROJECT_ID environment variable not set".to_string())
        })?;

        Self::from_credentials_file(&path, project_id)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Return a valid access token, fetching a new one when needed
    async fn access_token(&self) -> MtResult<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.expires_at > Instant::now()) {
            return Ok(token.value.clone());
        }

        let token = self.fetch_token().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn fetch_token(&self) -> MtResult<CachedToken> {
        let token_uri = self.credentials.token_uri();
        debug!(%token_uri, "requesting Google access token");

        let request = match &self.credentials {
            GoogleCredentials::ServiceAccount {
                client_email,
                private_key,
                private_key_id,
                token_uri,
            } => {
                let assertion =
                    sign_assertion(client_email, private_key, private_key_id.clone(), token_uri)?;
                self.client.post(token_uri).form(&[
                    ("grant_type", JWT_BEARER_GRANT),
                    ("assertion", assertion.as_str()),
                ])
            }
            GoogleCredentials::AuthorizedUser {
                client_id,
                client_secret,
                refresh_token,
                token_uri,
            } => self.client.post(token_uri).form(&[
                ("grant_type", "refresh_token"),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
            ]),
        };

        let response = request.send().await?;
        // OAuth answers 400 for revoked or malformed grants.
        let response = ensure_success(response).await.map_err(|e| match e {
            MtError::ProviderError(msg) => {
                MtError::AuthError(format!("Google token request failed: {}", msg))
            }
            other => other,
        })?;
        let token: TokenResponse = serde_json::from_str(&response.text().await?)?;

        Ok(CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in.saturating_sub(60)),
        })
    }
}

fn encoding_key(private_key: &str) -> MtResult<EncodingKey> {
    EncodingKey::from_rsa_pem(private_key.as_bytes()).map_err(|e| {
        MtError::ConfigError(format!("Invalid service account private key: {}", e))
    })
}

/// Build the signed JWT a service account trades for an access token
fn sign_assertion(
    client_email: &str,
    private_key: &str,
    private_key_id: Option<String>,
    token_uri: &str,
) -> MtResult<String> {
    let iat = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let claims = AssertionClaims {
        iss: client_email,
        scope: TRANSLATION_SCOPE,
        aud: token_uri,
        iat,
        exp: iat + 3600,
    };
    let mut header = Header::new(Algorithm::RS256);
    header.kid = private_key_id;

    jsonwebtoken::encode(&header, &claims, &encoding_key(private_key)?)
        .map_err(|e| MtError::ConfigError(format!("Cannot sign token request: {}", e)))
}

impl std::fmt::Debug for GoogleCloudProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleCloudProvider")
            .field("credentials", &self.credentials)
            .field("project_id", &self.project_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for GoogleCloudProvider {
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

        let source = strip_codeset(source_locale).replace('_', "-");
        let target = strip_codeset(target_locale).replace('_', "-");
        let url = format!(
            "{}/v3/projects/{}/locations/global:translateText",
            self.base_url, self.project_id
        );
        let token = self.access_token().await?;
        debug!(%source, %target, "requesting Google Cloud translation");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&json!({
                "contents": [text],
                "mimeType": "text/plain",
                "sourceLanguageCode": source,
                "targetLanguageCode": target,
            }))
            .send()
            .await?;
        let response = ensure_success(response).await.map_err(|e| match e {
            MtError::ProviderError(msg) => {
                MtError::ProviderError(format!("Google API error: {}", msg))
            }
            other => other,
        })?;
        let body: TranslateResponse = serde_json::from_str(&response.text().await?)?;

        body.translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| {
                MtError::MalformedResponse("Google response has no translations".to_string())
            })
    }

    fn provider_name(&self) -> &str {
        "Google Cloud Translation"
    }
}
