//! Editor controller
//!
//! Connects an [`EditingGrid`] with a [`SuggestionClient`]. User actions come in
//! as method calls (`set_translation`, `leave_field`, `request_suggestion`,
//! `translate_all`). Suggestion requests run as independent Tokio tasks; each
//! task carries the [`FieldId`] captured when it was started and writes its
//! result into that field only.
//!
//! The grid sits behind a mutex that is never held across an `.await`.

use crate::client::SuggestionClient;
use crate::data::{SuggestionRequest, SuggestionResult};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use trellis_i18n::{EditingGrid, FieldId, GridResult, TranslationField, ValidationOutcome};

#[derive(Debug, Clone)]
pub struct Editor {
    grid: Arc<Mutex<EditingGrid>>,
    client: SuggestionClient,
    source_lang: String,
    target_lang: String,
}

impl Editor {
    pub fn new(
        grid: EditingGrid,
        client: SuggestionClient,
        source_lang: &str,
        target_lang: &str,
    ) -> Self {
        Self {
            grid: Arc::new(Mutex::new(grid)),
            client,
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
        }
    }

    /// Lock the grid for inspection or direct edits
    pub fn grid(&self) -> MutexGuard<'_, EditingGrid> {
        self.grid.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current state of one field
    pub fn field(&self, id: FieldId) -> GridResult<TranslationField> {
        self.grid().field(id).cloned()
    }

    pub fn set_translation(&self, id: FieldId, text: &str) -> GridResult<()> {
        self.grid().set_translation(id, text)
    }

    /// The translator left a field: check its placeholders
    pub fn leave_field(&self, id: FieldId) -> GridResult<Option<ValidationOutcome>> {
        self.grid().leave_field(id)
    }

    /// Start fetching a suggestion for one field
    ///
    /// Returns immediately. `None` means the field's control was not idle and
    /// nothing was started. Must be called from within a Tokio runtime.
    pub fn request_suggestion(
        &self,
        id: FieldId,
    ) -> GridResult<Option<JoinHandle<SuggestionResult>>> {
        let Some(source_text) = self.grid().begin_suggestion(id)? else {
            debug!(field = %id, "suggestion control busy or finished, ignoring request");
            return Ok(None);
        };

        let request = SuggestionRequest::new(&source_text, &self.source_lang, &self.target_lang);
        let client = self.client.clone();
        let grid = Arc::clone(&self.grid);

        Ok(Some(tokio::spawn(async move {
            let result = client.suggest(&request).await;
            let mut grid = grid.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(err) = grid.complete_suggestion(id, result.clone().into_result()) {
                warn!(field = %id, "dropping suggestion: {}", err);
            }
            result
        })))
    }

    /// Request a suggestion for every untranslated field
    ///
    /// The requests are independent and not throttled.
    pub fn translate_all(&self) -> Vec<(FieldId, JoinHandle<SuggestionResult>)> {
        let fields = self.grid().untranslated_fields();
        debug!(count = fields.len(), "translating all untranslated fields");

        fields
            .into_iter()
            .filter_map(|id| match self.request_suggestion(id) {
                Ok(Some(handle)) => Some((id, handle)),
                Ok(None) => None,
                Err(err) => {
                    warn!(field = %id, "cannot request suggestion: {}", err);
                    None
                }
            })
            .collect()
    }
}
