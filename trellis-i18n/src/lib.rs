//! Translation editing core for trellis-i18n
//!
//! - [`markup`] turns the HTML rendering of source strings into plain text and
//!   cleans up machine translations on the way back
//! - [`placeholder`] extracts `%s`, `%(name)s` and `{name}` placeholders and
//!   checks that a translation keeps them
//! - [`grid`] holds the editable fields, their warnings and the state of their
//!   suggestion controls
//!
//! # Example
//!
//! ```ignore
//! use trellis_i18n::{EditingGrid, ValidationOutcome};
//!
//! let mut grid = EditingGrid::new();
//! let field = grid.add_row("%s items", "");
//! grid.set_translation(field, "elementos")?;
//! assert!(grid.leave_field(field)?.unwrap().is_invalid());
//! ```

pub mod grid;
pub mod markup;
pub mod placeholder;

pub use grid::{
    Annotation, EditingGrid, FieldId, GridError, GridResult, RowId, TranslationField,
    TranslationUnit, TriggerState, UNMATCHED_VARIABLES,
};
pub use markup::{denormalize_translation, normalize_source, unescape_entities};
pub use placeholder::{
    InvalidReason, PlaceholderToken, ValidationOutcome, extract_placeholders, extract_tokens,
    validate,
};
