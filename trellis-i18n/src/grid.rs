//! Editing grid state
//!
//! The grid holds one [`TranslationField`] per editable translation: a singular
//! row owns one field, a plural row one field per plural form. Fields are
//! addressed by an explicit [`FieldId`] so that validation and suggestion
//! results always land on the field they were computed for.

use crate::placeholder::{ValidationOutcome, validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Text of the warning attached to a field with unmatched placeholders
pub const UNMATCHED_VARIABLES: &str = "Unmatched variables";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowId(pub usize);

/// Identifies one translation field: a row, plus the plural form for plural rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldId {
    pub row: RowId,
    pub plural_form: Option<usize>,
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.plural_form {
            Some(form) => write!(f, "row {} form {}", self.row.0, form),
            None => write!(f, "row {}", self.row.0),
        }
    }
}

/// A source string and the translation being edited for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationUnit {
    /// HTML rendering of the source string, as shown in the grid
    pub source_text: String,
    pub translation_text: String,
    pub is_plural: bool,
    pub plural_form_index: Option<usize>,
}

/// Inline note shown next to a translation field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub message: String,
    pub outcome: ValidationOutcome,
}

/// State of the "suggest" control of a field
///
/// `Idle -> Requesting -> Filled | Errored`. The terminal states are never left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerState {
    Idle,
    Requesting,
    Filled,
    Errored(String),
}

impl TriggerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TriggerState::Filled | TriggerState::Errored(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationField {
    pub unit: TranslationUnit,
    pub annotation: Option<Annotation>,
    pub trigger: TriggerState,
}

impl TranslationField {
    fn new(unit: TranslationUnit) -> Self {
        Self {
            unit,
            annotation: None,
            trigger: TriggerState::Idle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    UnknownField(FieldId),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::UnknownField(id) => write!(f, "Unknown translation field: {}", id),
        }
    }
}

impl std::error::Error for GridError {}

pub type GridResult<T> = Result<T, GridError>;

#[derive(Debug, Clone, Default)]
pub struct EditingGrid {
    fields: BTreeMap<FieldId, TranslationField>,
    next_row: usize,
}

impl EditingGrid {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_row(&mut self) -> RowId {
        let row = RowId(self.next_row);
        self.next_row += 1;
        row
    }

    /// Add a singular row holding one translation field
    pub fn add_row(&mut self, source_text: &str, translation: &str) -> FieldId {
        let id = FieldId {
            row: self.next_row(),
            plural_form: None,
        };
        let unit = TranslationUnit {
            source_text: source_text.to_string(),
            translation_text: translation.to_string(),
            is_plural: false,
            plural_form_index: None,
        };
        self.fields.insert(id, TranslationField::new(unit));
        id
    }

    /// Add a plural row with one field per plural form of the target language
    ///
    /// Languages with a single plural form (ja, zh, ko) still get a plural row
    /// whose only field is form 0.
    pub fn add_plural_row(&mut self, source_text: &str, forms: &[&str]) -> Vec<FieldId> {
        let row = self.next_row();
        forms
            .iter()
            .enumerate()
            .map(|(form, translation)| {
                let id = FieldId {
                    row,
                    plural_form: Some(form),
                };
                let unit = TranslationUnit {
                    source_text: source_text.to_string(),
                    translation_text: translation.to_string(),
                    is_plural: true,
                    plural_form_index: Some(form),
                };
                self.fields.insert(id, TranslationField::new(unit));
                id
            })
            .collect()
    }

    pub fn field(&self, id: FieldId) -> GridResult<&TranslationField> {
        self.fields.get(&id).ok_or(GridError::UnknownField(id))
    }

    fn field_mut(&mut self, id: FieldId) -> GridResult<&mut TranslationField> {
        self.fields.get_mut(&id).ok_or(GridError::UnknownField(id))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn source_text(&self, id: FieldId) -> GridResult<&str> {
        Ok(&self.field(id)?.unit.source_text)
    }

    pub fn translation(&self, id: FieldId) -> GridResult<&str> {
        Ok(&self.field(id)?.unit.translation_text)
    }

    /// Replace the translation with what the translator typed
    pub fn set_translation(&mut self, id: FieldId, text: &str) -> GridResult<()> {
        self.field_mut(id)?.unit.translation_text = text.to_string();
        Ok(())
    }

    pub fn annotation(&self, id: FieldId) -> GridResult<Option<&Annotation>> {
        Ok(self.field(id)?.annotation.as_ref())
    }

    pub fn trigger(&self, id: FieldId) -> GridResult<&TriggerState> {
        Ok(&self.field(id)?.trigger)
    }

    /// Validate a field when it loses focus
    ///
    /// An empty field is not validated and keeps whatever annotation it had;
    /// `None` is returned. Otherwise the old annotation is cleared and a
    /// warning is attached if the placeholders do not match.
    pub fn leave_field(&mut self, id: FieldId) -> GridResult<Option<ValidationOutcome>> {
        let field = self.field_mut(id)?;
        if field.unit.translation_text.is_empty() {
            return Ok(None);
        }

        field.annotation = None;
        let outcome = validate(&field.unit.source_text, &field.unit.translation_text);
        if outcome.is_invalid() {
            field.annotation = Some(Annotation {
                message: UNMATCHED_VARIABLES.to_string(),
                outcome,
            });
        }
        Ok(Some(outcome))
    }

    /// Mark the suggest control of a field as busy
    ///
    /// Returns the source text to translate, or `None` if the control is not
    /// idle (a request is already running or has finished).
    pub fn begin_suggestion(&mut self, id: FieldId) -> GridResult<Option<String>> {
        let field = self.field_mut(id)?;
        if field.trigger != TriggerState::Idle {
            return Ok(None);
        }
        field.trigger = TriggerState::Requesting;
        Ok(Some(field.unit.source_text.clone()))
    }

    /// Record the outcome of a suggestion request
    ///
    /// On success the whole translation is replaced; on failure the
    /// translation is left alone and the error is kept on the control. Results
    /// for a field that is not `Requesting` are dropped and `false` is returned.
    pub fn complete_suggestion(
        &mut self,
        id: FieldId,
        result: Result<String, String>,
    ) -> GridResult<bool> {
        let field = self.field_mut(id)?;
        if field.trigger != TriggerState::Requesting {
            return Ok(false);
        }
        match result {
            Ok(text) => {
                field.unit.translation_text = text;
                field.trigger = TriggerState::Filled;
            }
            Err(message) => {
                field.trigger = TriggerState::Errored(message);
            }
        }
        Ok(true)
    }

    /// Fields with an empty translation, in grid order
    pub fn untranslated_fields(&self) -> Vec<FieldId> {
        self.fields
            .iter()
            .filter(|(_, field)| field.unit.translation_text.is_empty())
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn field_ids(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.fields.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::InvalidReason;

    fn grid_with(source: &str, translation: &str) -> (EditingGrid, FieldId) {
        let mut grid = EditingGrid::new();
        let id = grid.add_row(source, translation);
        (grid, id)
    }

    #[test]
    fn test_add_singular_row() {
        let mut grid = EditingGrid::new();
        let id = grid.add_row("Hello", "");
        assert_eq!(id.plural_form, None);
        let unit = &grid.field(id).unwrap().unit;
        assert!(!unit.is_plural);
        assert_eq!(unit.plural_form_index, None);
    }

    #[test]
    fn test_add_plural_row() {
        let mut grid = EditingGrid::new();
        grid.add_row("first", "");
        let ids = grid.add_plural_row("%(n)s item", &["", "%(n)s éléments"]);
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[1].row, RowId(1));
        assert_eq!(ids[1].plural_form, Some(1));
        let unit = &grid.field(ids[1]).unwrap().unit;
        assert!(unit.is_plural);
        assert_eq!(unit.plural_form_index, Some(1));
        assert_eq!(unit.translation_text, "%(n)s éléments");
    }

    #[test]
    fn test_single_form_plural_row_stays_plural() {
        let mut grid = EditingGrid::new();
        let ids = grid.add_plural_row("%(n)s item", &["%(n)s 個"]);
        assert_eq!(
            ids,
            vec![FieldId {
                row: RowId(0),
                plural_form: Some(0),
            }]
        );
        let unit = &grid.field(ids[0]).unwrap().unit;
        assert!(unit.is_plural);
        assert_eq!(unit.plural_form_index, Some(0));
        assert_eq!(ids[0].to_string(), "row 0 form 0");
    }

    #[test]
    fn test_plural_row_without_forms() {
        let mut grid = EditingGrid::new();
        assert!(grid.add_plural_row("%(n)s item", &[]).is_empty());
        assert!(grid.is_empty());
        assert_eq!(
            grid.add_row("next", ""),
            FieldId {
                row: RowId(1),
                plural_form: None,
            }
        );
    }

    #[test]
    fn test_unknown_field() {
        let grid = EditingGrid::new();
        let id = FieldId {
            row: RowId(7),
            plural_form: None,
        };
        assert_eq!(grid.translation(id), Err(GridError::UnknownField(id)));
    }

    #[test]
    fn test_leave_invalid_field_attaches_warning() {
        let (mut grid, id) = grid_with("%s items", "elementos");
        let outcome = grid.leave_field(id).unwrap();
        assert_eq!(
            outcome,
            Some(ValidationOutcome::Invalid(InvalidReason::UnmatchedPlaceholder))
        );
        let note = grid.annotation(id).unwrap().unwrap();
        assert_eq!(note.message, UNMATCHED_VARIABLES);
        // The translation is never touched by validation.
        assert_eq!(grid.translation(id).unwrap(), "elementos");
    }

    #[test]
    fn test_leave_valid_field_clears_warning() {
        let (mut grid, id) = grid_with("%s items", "elementos");
        grid.leave_field(id).unwrap();
        grid.set_translation(id, "%s elementos").unwrap();
        assert_eq!(
            grid.leave_field(id).unwrap(),
            Some(ValidationOutcome::Valid)
        );
        assert!(grid.annotation(id).unwrap().is_none());
    }

    #[test]
    fn test_leave_empty_field_keeps_previous_state() {
        let (mut grid, id) = grid_with("%s items", "elementos");
        grid.leave_field(id).unwrap();
        grid.set_translation(id, "").unwrap();
        assert_eq!(grid.leave_field(id).unwrap(), None);
        assert!(grid.annotation(id).unwrap().is_some());
    }

    #[test]
    fn test_leave_empty_field_without_history() {
        let (mut grid, id) = grid_with("", "");
        assert_eq!(grid.leave_field(id).unwrap(), None);
        assert!(grid.annotation(id).unwrap().is_none());
    }

    #[test]
    fn test_suggestion_success_flow() {
        let (mut grid, id) = grid_with("Hello", "");
        assert_eq!(grid.begin_suggestion(id).unwrap(), Some("Hello".to_string()));
        assert_eq!(grid.trigger(id).unwrap(), &TriggerState::Requesting);
        // Repeat clicks are ignored while requesting.
        assert_eq!(grid.begin_suggestion(id).unwrap(), None);

        assert!(grid.complete_suggestion(id, Ok("Bonjour".into())).unwrap());
        assert_eq!(grid.translation(id).unwrap(), "Bonjour");
        assert_eq!(grid.trigger(id).unwrap(), &TriggerState::Filled);
        assert_eq!(grid.begin_suggestion(id).unwrap(), None);
    }

    #[test]
    fn test_suggestion_failure_keeps_translation() {
        let (mut grid, id) = grid_with("Hello", "draft");
        grid.begin_suggestion(id).unwrap();
        grid.complete_suggestion(id, Err("quota exceeded".into()))
            .unwrap();
        assert_eq!(grid.translation(id).unwrap(), "draft");
        assert_eq!(
            grid.trigger(id).unwrap(),
            &TriggerState::Errored("quota exceeded".into())
        );
        assert!(grid.trigger(id).unwrap().is_terminal());
    }

    #[test]
    fn test_result_without_request_is_dropped() {
        let (mut grid, id) = grid_with("Hello", "draft");
        assert!(!grid.complete_suggestion(id, Ok("Bonjour".into())).unwrap());
        assert_eq!(grid.translation(id).unwrap(), "draft");
        assert_eq!(grid.trigger(id).unwrap(), &TriggerState::Idle);
    }

    #[test]
    fn test_untranslated_fields_in_order() {
        let mut grid = EditingGrid::new();
        let a = grid.add_row("a", "");
        grid.add_row("b", "bee");
        let c = grid.add_plural_row("%(n)s c", &["%(n)s cé", ""]);
        assert_eq!(grid.untranslated_fields(), vec![a, c[1]]);
        assert_eq!(grid.len(), 4);
    }

    #[test]
    fn test_field_id_display() {
        let id = FieldId {
            row: RowId(3),
            plural_form: Some(1),
        };
        assert_eq!(id.to_string(), "row 3 form 1");
    }
}
