//! Machine translation suggestions for trellis-i18n
//!
//! This crate fetches translation suggestions for the fields of an editing
//! grid. One [`MachineTranslator`] adapter exists per remote service; the
//! active one is picked from configuration and wrapped in a
//! [`SuggestionClient`], which strips markup before the request, cleans up the
//! answer and turns every error into a message for the translator.
//!
//! | Adapter | Transport |
//! |---|---|
//! | [`GoogleAjaxProvider`] | script-style JSONP with per-request callback |
//! | [`YandexProvider`] | JSONP with API key in the query string |
//! | [`ProxyProvider`] | form POST to a same-origin proxy |
//! | [`DeepLProvider`] | JSON POST, secret in the body |
//! | [`AzureProvider`] | JSON POST, secret in a header |
//! | [`GoogleCloudProvider`] | JSON POST, OAuth bearer token from a credentials file |
//!
//! # Workflow Example
//!
//! ```ignore
//! use trellis_i18n::EditingGrid;
//! use trellis_i18n_mt::{Editor, SuggestionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SuggestionConfig::from_env()?;
//!     let client = config.build_client()?;
//!
//!     let mut grid = EditingGrid::new();
//!     let field = grid.add_row("Hello <code>%(name)s</code>", "");
//!
//!     let editor = Editor::new(grid, client, &config.source_language, "fr");
//!     if let Some(handle) = editor.request_suggestion(field)? {
//!         handle.await?;
//!     }
//!     editor.leave_field(field)?;
//!     Ok(())
//! }
//! ```

pub mod azure;
pub mod client;
pub mod config;
pub mod data;
pub mod deepl;
pub mod editor;
pub mod error;
pub mod google_ajax;
pub mod google_cloud;
pub mod jsonp;
pub mod mock;
pub mod proxy;
pub mod translator;
pub mod yandex;

#[cfg(test)]
mod test_support;


pub use azure::AzureProvider;
pub use client::SuggestionClient;
pub use config::{ProviderConfig, SuggestionConfig};
pub use data::{SuggestionRequest, SuggestionResult};
pub use deepl::DeepLProvider;
pub use editor::Editor;
pub use error::{MtError, MtResult};
pub use google_ajax::GoogleAjaxProvider;
pub use google_cloud::{GoogleCloudProvider, GoogleCredentials};
pub use jsonp::{CallbackRegistry, PendingCallback};
pub use mock::{MockMode, MockTranslator};
pub use proxy::{ProxyProvider, ProxyResponse};
pub use translator::{MachineTranslator, normalize_locale, strip_codeset, validate_locale};
pub use yandex::YandexProvider;
