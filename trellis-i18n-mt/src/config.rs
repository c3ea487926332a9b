//! Suggestion configuration
//!
//! One provider is active per deployment. It is chosen once, from environment
//! variables, either explicitly through `TRELLIS_PROVIDER` or by looking at
//! which credential is present:
//!
//! | Variable | Provider |
//! |---|---|
//! | `AZURE_CLIENT_SECRET` | Azure Translator |
//! | `GOOGLE_APPLICATION_CREDENTIALS_PATH` + `GOOGLE_PROJECT_ID` | Google Cloud Translation |
//! | `DEEPL_AUTH_KEY` (+ `DEEPL_FREE_API`) | DeepL |
//! | `YANDEX_TRANSLATE_KEY` | Yandex |
//! | `GOOGLE_AJAX_API_KEY` | Google AJAX |
//! | `TRELLIS_PROXY_URL` | same-origin proxy |
//!
//! The first match in this order wins. Parsing goes through a lookup function
//! so tests can feed variables without touching the process environment.

use crate::azure::AzureProvider;
use crate::client::SuggestionClient;
use crate::deepl::DeepLProvider;
use crate::error::{MtError, MtResult};
use crate::google_ajax::GoogleAjaxProvider;
use crate::google_cloud::GoogleCloudProvider;
use crate::mock::{MockMode, MockTranslator};
use crate::proxy::ProxyProvider;
use crate::translator::MachineTranslator;
use crate::yandex::YandexProvider;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    GoogleAjax { api_key: String },
    Yandex { api_key: String },
    Proxy { endpoint: String },
    DeepL { auth_key: String, free_api: bool },
    Azure { subscription_key: String },
    GoogleCloud {
        credentials_path: String,
        project_id: String,
    },
    Mock,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Proxy { endpoint } => f
                .debug_struct("Proxy")
                .field("endpoint", endpoint)
                .finish(),
            ProviderConfig::DeepL { free_api, .. } => f
                .debug_struct("DeepL")
                .field("auth_key", &"***")
                .field("free_api", free_api)
                .finish(),
            ProviderConfig::GoogleCloud {
                credentials_path,
                project_id,
            } => f
                .debug_struct("GoogleCloud")
                .field("credentials_path", credentials_path)
                .field("project_id", project_id)
                .finish(),
            ProviderConfig::Mock => f.write_str("Mock"),
            other => f
                .debug_struct(other.name())
                .field("key", &"***")
                .finish(),
        }
    }
}

fn require(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> MtResult<String> {
    lookup(key).ok_or_else(|| MtError::ConfigError(format!("{} not set", key)))
}

fn parse_flag(key: &str, value: &str) -> MtResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(MtError::ConfigError(format!(
            "{} must be a boolean, got '{}'",
            key, value
        ))),
    }
}

impl ProviderConfig {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderConfig::GoogleAjax { .. } => "google-ajax",
            ProviderConfig::Yandex { .. } => "yandex",
            ProviderConfig::Proxy { .. } => "proxy",
            ProviderConfig::DeepL { .. } => "deepl",
            ProviderConfig::Azure { .. } => "azure",
            ProviderConfig::GoogleCloud { .. } => "google-cloud",
            ProviderConfig::Mock => "mock",
        }
    }

    /// Resolve the provider from a variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> MtResult<Self> {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let deepl = |auth_key: String| -> MtResult<Self> {
            let free_api = match lookup("DEEPL_FREE_API") {
                Some(v) => parse_flag("DEEPL_FREE_API", &v)?,
                None => true,
            };
            Ok(ProviderConfig::DeepL { auth_key, free_api })
        };

        if let Some(name) = lookup("TRELLIS_PROVIDER") {
            return match name.trim().to_ascii_lowercase().as_str() {
                "google-ajax" => Ok(ProviderConfig::GoogleAjax {
                    api_key: require(&lookup, "GOOGLE_AJAX_API_KEY")?,
                }),
                "yandex" => Ok(ProviderConfig::Yandex {
                    api_key: require(&lookup, "YANDEX_TRANSLATE_KEY")?,
                }),
                "proxy" => Ok(ProviderConfig::Proxy {
                    endpoint: require(&lookup, "TRELLIS_PROXY_URL")?,
                }),
                "deepl" => deepl(require(&lookup, "DEEPL_AUTH_KEY")?),
                "azure" => Ok(ProviderConfig::Azure {
                    subscription_key: require(&lookup, "AZURE_CLIENT_SECRET")?,
                }),
                "google-cloud" => Ok(ProviderConfig::GoogleCloud {
                    credentials_path: require(&lookup, "GOOGLE_APPLICATION_CREDENTIALS_PATH")?,
                    project_id: require(&lookup, "GOOGLE_PROJECT_ID")?,
                }),
                "mock" => Ok(ProviderConfig::Mock),
                other => Err(MtError::ConfigError(format!(
                    "Unknown translation provider '{}'",
                    other
                ))),
            };
        }

        if let Some(subscription_key) = lookup("AZURE_CLIENT_SECRET") {
            Ok(ProviderConfig::Azure { subscription_key })
        } else if let (Some(credentials_path), Some(project_id)) = (
            lookup("GOOGLE_APPLICATION_CREDENTIALS_PATH"),
            lookup("GOOGLE_PROJECT_ID"),
        ) {
            Ok(ProviderConfig::GoogleCloud {
                credentials_path,
                project_id,
            })
        } else if let Some(auth_key) = lookup("DEEPL_AUTH_KEY") {
            deepl(auth_key)
        } else if let Some(api_key) = lookup("YANDEX_TRANSLATE_KEY") {
            Ok(ProviderConfig::Yandex { api_key })
        } else if let Some(api_key) = lookup("GOOGLE_AJAX_API_KEY") {
            Ok(ProviderConfig::GoogleAjax { api_key })
        } else if let Some(endpoint) = lookup("TRELLIS_PROXY_URL") {
            Ok(ProviderConfig::Proxy { endpoint })
        } else {
            Err(MtError::ConfigError(
                "No translation API service is configured.".to_string(),
            ))
        }
    }

    /// Instantiate the provider this configuration names
    pub fn build(&self) -> MtResult<Arc<dyn MachineTranslator>> {
        let provider: Arc<dyn MachineTranslator> = match self {
            ProviderConfig::GoogleAjax { api_key } => {
                Arc::new(GoogleAjaxProvider::new(api_key.clone())?)
            }
            ProviderConfig::Yandex { api_key } => Arc::new(YandexProvider::new(api_key.clone())?),
            ProviderConfig::Proxy { endpoint } => Arc::new(ProxyProvider::new(endpoint)?),
            ProviderConfig::DeepL { auth_key, free_api } => {
                Arc::new(DeepLProvider::new(auth_key.clone(), *free_api)?)
            }
            ProviderConfig::Azure { subscription_key } => {
                Arc::new(AzureProvider::new(subscription_key.clone())?)
            }
            ProviderConfig::GoogleCloud {
                credentials_path,
                project_id,
            } => Arc::new(GoogleCloudProvider::from_credentials_file(
                credentials_path,
                project_id.clone(),
            )?),
            ProviderConfig::Mock => Arc::new(MockTranslator::new(MockMode::Suffix)),
        };
        Ok(provider)
    }
}

/// Everything the editor needs to offer suggestions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionConfig {
    pub enabled: bool,
    /// Language of the source strings
    pub source_language: String,
    pub timeout: Duration,
    /// `None` when suggestions are disabled
    pub provider: Option<ProviderConfig>,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            source_language: "en".to_string(),
            timeout: SuggestionClient::DEFAULT_TIMEOUT,
            provider: None,
        }
    }
}

impl SuggestionConfig {
    pub fn from_env() -> MtResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> MtResult<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup("TRELLIS_ENABLE_SUGGESTIONS") {
            config.enabled = parse_flag("TRELLIS_ENABLE_SUGGESTIONS", &v)?;
        }
        if let Some(lang) = lookup("TRELLIS_SOURCE_LANGUAGE").filter(|v| !v.trim().is_empty()) {
            config.source_language = lang.trim().to_string();
        }
        if let Some(secs) = lookup("TRELLIS_SUGGESTION_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                MtError::ConfigError(format!(
                    "TRELLIS_SUGGESTION_TIMEOUT_SECS must be a number of seconds, got '{}'",
                    secs
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        if config.enabled {
            config.provider = Some(ProviderConfig::from_lookup(&lookup)?);
        }

        Ok(config)
    }

    /// Build the client for the configured provider
    pub fn build_client(&self) -> MtResult<SuggestionClient> {
        let provider = match (&self.provider, self.enabled) {
            (Some(provider), true) => provider,
            _ => {
                return Err(MtError::ConfigError(
                    "Translation suggestions are disabled".to_string(),
                ));
            }
        };
        Ok(SuggestionClient::new(provider.build()?).with_timeout(self.timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SuggestionConfig::from_lookup(vars(&[])).unwrap();
        assert_eq!(config, SuggestionConfig::default());
        assert!(config.build_client().is_err());
    }

    #[test]
    fn test_enabled_without_provider() {
        let result = SuggestionConfig::from_lookup(vars(&[("TRELLIS_ENABLE_SUGGESTIONS", "true")]));
        assert_eq!(
            result,
            Err(MtError::ConfigError(
                "No translation API service is configured.".to_string()
            ))
        );
    }

    #[test]
    fn test_inference_order() {
        let provider = ProviderConfig::from_lookup(vars(&[
            ("YANDEX_TRANSLATE_KEY", "y"),
            ("AZURE_CLIENT_SECRET", "a"),
            ("TRELLIS_PROXY_URL", "http://localhost:3000/translate/"),
        ]))
        .unwrap();
        assert_eq!(provider.name(), "azure");

        let provider = ProviderConfig::from_lookup(vars(&[
            ("GOOGLE_AJAX_API_KEY", "g"),
            ("TRELLIS_PROXY_URL", "http://localhost:3000/translate/"),
        ]))
        .unwrap();
        assert_eq!(provider.name(), "google-ajax");

        let provider = ProviderConfig::from_lookup(vars(&[
            ("DEEPL_AUTH_KEY", "d"),
            ("GOOGLE_APPLICATION_CREDENTIALS_PATH", "/etc/trellis/google.json"),
            ("GOOGLE_PROJECT_ID", "demo"),
        ]))
        .unwrap();
        assert_eq!(
            provider,
            ProviderConfig::GoogleCloud {
                credentials_path: "/etc/trellis/google.json".to_string(),
                project_id: "demo".to_string()
            }
        );

        let provider = ProviderConfig::from_lookup(vars(&[
            ("AZURE_CLIENT_SECRET", "a"),
            ("GOOGLE_APPLICATION_CREDENTIALS_PATH", "/etc/trellis/google.json"),
            ("GOOGLE_PROJECT_ID", "demo"),
        ]))
        .unwrap();
        assert_eq!(provider.name(), "azure");
    }

    #[test]
    fn test_google_cloud_needs_project() {
        let provider = ProviderConfig::from_lookup(vars(&[
            ("GOOGLE_APPLICATION_CREDENTIALS_PATH", "/etc/trellis/google.json"),
            ("YANDEX_TRANSLATE_KEY", "y"),
        ]))
        .unwrap();
        assert_eq!(provider.name(), "yandex");

        let result = ProviderConfig::from_lookup(vars(&[
            ("TRELLIS_PROVIDER", "google-cloud"),
            ("GOOGLE_APPLICATION_CREDENTIALS_PATH", "/etc/trellis/google.json"),
        ]));
        assert_eq!(
            result,
            Err(MtError::ConfigError("GOOGLE_PROJECT_ID not set".to_string()))
        );
    }

    #[test]
    fn test_build_reports_unreadable_credentials() {
        let config = ProviderConfig::GoogleCloud {
            credentials_path: "/nonexistent/google.json".to_string(),
            project_id: "demo".to_string(),
        };
        assert!(matches!(config.build(), Err(MtError::ConfigError(_))));
    }

    #[test]
    fn test_build_rejects_relative_proxy_url() {
        let config = ProviderConfig::Proxy {
            endpoint: "/translate/".to_string(),
        };
        assert!(matches!(config.build(), Err(MtError::ConfigError(_))));
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let provider = ProviderConfig::from_lookup(vars(&[
            ("AZURE_CLIENT_SECRET", "  "),
            ("YANDEX_TRANSLATE_KEY", "y"),
        ]))
        .unwrap();
        assert_eq!(
            provider,
            ProviderConfig::Yandex {
                api_key: "y".to_string()
            }
        );
    }

    #[test]
    fn test_explicit_provider() {
        let provider = ProviderConfig::from_lookup(vars(&[
            ("TRELLIS_PROVIDER", "Proxy"),
            ("AZURE_CLIENT_SECRET", "a"),
            ("TRELLIS_PROXY_URL", "http://localhost:3000/translate/"),
        ]))
        .unwrap();
        assert_eq!(
            provider,
            ProviderConfig::Proxy {
                endpoint: "http://localhost:3000/translate/".to_string()
            }
        );
    }

    #[test]
    fn test_explicit_provider_missing_key() {
        let result = ProviderConfig::from_lookup(vars(&[("TRELLIS_PROVIDER", "deepl")]));
        assert_eq!(
            result,
            Err(MtError::ConfigError("DEEPL_AUTH_KEY not set".to_string()))
        );
    }

    #[test]
    fn test_unknown_provider() {
        let result = ProviderConfig::from_lookup(vars(&[("TRELLIS_PROVIDER", "babelfish")]));
        assert!(matches!(result, Err(MtError::ConfigError(msg)) if msg.contains("babelfish")));
    }

    #[test]
    fn test_deepl_free_flag() {
        let provider = ProviderConfig::from_lookup(vars(&[
            ("DEEPL_AUTH_KEY", "d"),
            ("DEEPL_FREE_API", "false"),
        ]))
        .unwrap();
        assert_eq!(
            provider,
            ProviderConfig::DeepL {
                auth_key: "d".to_string(),
                free_api: false
            }
        );
    }

    #[test]
    fn test_full_config() {
        let config = SuggestionConfig::from_lookup(vars(&[
            ("TRELLIS_ENABLE_SUGGESTIONS", "1"),
            ("TRELLIS_SOURCE_LANGUAGE", "de"),
            ("TRELLIS_SUGGESTION_TIMEOUT_SECS", "3"),
            ("TRELLIS_PROVIDER", "mock"),
        ]))
        .unwrap();
        assert_eq!(config.source_language, "de");
        assert_eq!(config.timeout, Duration::from_secs(3));

        let client = config.build_client().unwrap();
        assert_eq!(client.provider_name(), "Mock Translator");
        assert_eq!(client.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_values() {
        assert!(
            SuggestionConfig::from_lookup(vars(&[("TRELLIS_ENABLE_SUGGESTIONS", "maybe")])).is_err()
        );
        assert!(
            SuggestionConfig::from_lookup(vars(&[("TRELLIS_SUGGESTION_TIMEOUT_SECS", "soon")]))
                .is_err()
        );
    }

    #[test]
    fn test_debug_masks_keys() {
        let debug_str = format!(
            "{:?}",
            ProviderConfig::Azure {
                subscription_key: "top-secret".to_string()
            }
        );
        assert!(!debug_str.contains("top-secret"));
        assert!(debug_str.contains("azure"));
    }
}
