//! Field search for the settings screens.
//!
//! Finds configuration fields whose display label or category contains a
//! free-text query, ignoring case and diacritics, and groups the hits by
//! display category in their original order.
//!
//! Labels come from a [`Translator`] at query time and may embed the
//! field's live value, so nothing is normalized ahead of time.

mod index;
mod normalize;
mod translate;

pub use index::{DEFAULT_CATEGORY, FieldIndex, SearchResults};
pub use normalize::normalize;
pub use translate::{CatalogTranslator, Translator, Untranslated, VALUE_PLACEHOLDER};
