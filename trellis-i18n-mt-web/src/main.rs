//! Same-origin translation proxy
//!
//! Serves the endpoint the [`ProxyProvider`](trellis_i18n_mt::ProxyProvider)
//! posts to. The browser-side editor never holds a provider secret; this server
//! does, and forwards each `{from, to, text}` form to the configured upstream.

use axum::{
    Form, Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use trellis_i18n_mt::{
    MachineTranslator, MtError, MtResult, ProviderConfig, ProxyResponse, SuggestionConfig,
    normalize_locale,
};

const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Debug, Deserialize)]
pub struct TranslateForm {
    pub from: String,
    pub to: String,
    pub text: String,
}

#[derive(Clone)]
pub struct AppState {
    pub translator: Arc<dyn MachineTranslator>,
    pub timeout: Duration,
}

impl AppState {
    /// Resolve the upstream provider from a variable lookup
    ///
    /// The proxy cannot forward to itself, so a proxy provider is rejected.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> MtResult<Self> {
        let provider = ProviderConfig::from_lookup(&lookup)?;
        if let ProviderConfig::Proxy { endpoint } = &provider {
            return Err(MtError::ConfigError(format!(
                "the proxy server needs a real upstream provider, not another proxy ({})",
                endpoint
            )));
        }
        let timeout = SuggestionConfig::from_lookup(&lookup)?.timeout;

        Ok(Self {
            translator: provider.build()?,
            timeout,
        })
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/translate/", post(translate_text))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    let state = AppState::from_lookup(|key| env::var(key).ok())
        .map_err(|e| format!("Failed to initialize translator: {}", e))?;
    info!(
        provider = state.translator.provider_name(),
        timeout = ?state.timeout,
        "starting trellis translation proxy"
    );

    let bind = env::var("TRELLIS_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("listening on http://{}", bind);

    axum::serve(listener, app(state)).await?;

    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

/// Always answers 200; failures are reported in the body
///
/// A request whose two languages share a base code gets its text back
/// without an upstream call.
async fn translate_text(
    State(state): State<AppState>,
    Form(form): Form<TranslateForm>,
) -> Json<ProxyResponse> {
    if normalize_locale(&form.from) == normalize_locale(&form.to) {
        return Json(ProxyResponse::ok(form.text));
    }

    let result = tokio::time::timeout(
        state.timeout,
        state.translator.translate(&form.text, &form.from, &form.to),
    )
    .await
    .unwrap_or(Err(MtError::Timeout));

    match result {
        Ok(translation) => {
            let chars = form.text.chars().count();
            info!(from = %form.from, to = %form.to, "translated {} chars", chars);
            Json(ProxyResponse::ok(translation))
        }
        Err(e) => {
            warn!(from = %form.from, to = %form.to, kind = e.kind(), "upstream failed: {}", e);
            Json(ProxyResponse::failed(e.to_string()))
        }
    }
}
