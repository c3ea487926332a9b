//! Helpers shared by the provider tests

use serde_json::Value;
use wiremock::{Request, Respond, ResponseTemplate};

/// Answers a JSONP request by invoking the callback named in its query string
pub(crate) struct JsonpResponder {
    payload: Value,
    callback_override: Option<String>,
}

impl JsonpResponder {
    pub(crate) fn new(payload: Value) -> Self {
        Self {
            payload,
            callback_override: None,
        }
    }

    /// Invoke a fixed callback name instead of the requested one
    pub(crate) fn with_callback(payload: Value, callback: &str) -> Self {
        Self {
            payload,
            callback_override: Some(callback.to_string()),
        }
    }
}

impl Respond for JsonpResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let callback = self.callback_override.clone().unwrap_or_else(|| {
            request
                .url
                .query_pairs()
                .find(|(key, _)| key == "callback")
                .map(|(_, value)| value.into_owned())
                .unwrap_or_default()
        });
        ResponseTemplate::new(200)
            .insert_header("content-type", "text/javascript")
            .set_body_string(format!("{}({});", callback, self.payload))
    }
}
