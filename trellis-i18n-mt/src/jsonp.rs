//! JSONP callbacks for script-style providers
//!
//! Script-style endpoints answer with `callbackName({...});` instead of plain
//! JSON. Every request registers its own callback name with a
//! [`CallbackRegistry`] and gets back a [`PendingCallback`] holding the
//! receiving half of a oneshot channel. [`CallbackRegistry::dispatch`] routes a
//! body to the channel of the callback it invokes; a body naming a callback
//! that is not pending is a malformed response. Dropping the
//! [`PendingCallback`] removes the registration.

use crate::error::{MtError, MtResult};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;
use tracing::debug;

#[derive(Debug, Default)]
struct RegistryInner {
    prefix: String,
    next_id: AtomicU64,
    pending: Mutex<HashMap<String, oneshot::Sender<Value>>>,
}

/// Hands out unique callback names and routes JSONP bodies to their request
#[derive(Debug, Clone, Default)]
pub struct CallbackRegistry {
    inner: Arc<RegistryInner>,
}

impl CallbackRegistry {
    pub fn new(prefix: &str) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                prefix: prefix.to_string(),
                ..Default::default()
            }),
        }
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<String, oneshot::Sender<Value>>> {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a fresh callback name for one request
    pub fn register(&self) -> PendingCallback {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let name = if self.inner.prefix.is_empty() {
            format!("cb{}", id)
        } else {
            format!("{}_{}", self.inner.prefix, id)
        };
        let (sender, receiver) = oneshot::channel();
        self.pending().insert(name.clone(), sender);
        PendingCallback {
            registry: self.clone(),
            name,
            receiver,
        }
    }

    /// Deliver a JSONP body to the pending request whose callback it invokes
    ///
    /// Returns the name of the callback that was completed. Each callback
    /// fires at most once.
    pub fn dispatch(&self, body: &str) -> MtResult<String> {
        let (name, payload) = split_jsonp(body)?;
        let payload: Value = serde_json::from_str(payload)?;

        let sender = self.pending().remove(name).ok_or_else(|| {
            MtError::MalformedResponse(format!(
                "response invoked unknown callback '{}'",
                name
            ))
        })?;
        if sender.send(payload).is_err() {
            debug!(callback = name, "request gave up before its callback fired");
        }
        Ok(name.to_string())
    }

    /// Number of requests currently waiting for their callback
    pub fn pending_count(&self) -> usize {
        self.pending().len()
    }

    fn release(&self, name: &str) {
        self.pending().remove(name);
    }
}

/// A registered callback; deregistered on drop
#[derive(Debug)]
pub struct PendingCallback {
    registry: CallbackRegistry,
    name: String,
    receiver: oneshot::Receiver<Value>,
}

impl PendingCallback {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dispatch the response body and take the payload sent to this callback
    ///
    /// A body that invokes another pending callback completes that request
    /// instead and leaves this one with a malformed response.
    pub fn resolve(&mut self, body: &str) -> MtResult<Value> {
        self.registry.dispatch(body)?;
        self.receiver.try_recv().map_err(|_| {
            MtError::MalformedResponse(format!(
                "response did not invoke callback '{}'",
                self.name
            ))
        })
    }
}

impl Drop for PendingCallback {
    fn drop(&mut self) {
        self.registry.release(&self.name);
    }
}

/// Split `name(payload);` into its callback name and raw payload
fn split_jsonp(body: &str) -> MtResult<(&str, &str)> {
    let body = body.trim();
    let body = body.strip_prefix("/**/").unwrap_or(body).trim_start();
    let body = body.strip_suffix(';').unwrap_or(body).trim_end();

    let malformed = || MtError::MalformedResponse("response is not a JSONP callback".to_string());
    let open = body.find('(').ok_or_else(malformed)?;
    if !body.ends_with(')') {
        return Err(malformed());
    }

    let name = body[..open].trim();
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '.')
    {
        return Err(malformed());
    }

    Ok((name, &body[open + 1..body.len() - 1]))
}
