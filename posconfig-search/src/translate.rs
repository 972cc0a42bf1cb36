//! Label translation seam.

use posconfig_types::{FieldDescriptor, FieldKind};
use serde_json::Value;
use std::collections::HashMap;

/// Marker replaced with the live value in value-interpolated labels.
pub const VALUE_PLACEHOLDER: &str = "{value}";

/// Produces display text for field labels and categories in one locale.
///
/// Called on every search, so implementations may return different text
/// whenever the locale or a field's value changes.
pub trait Translator {
    fn locale(&self) -> &str;

    /// Display label for `field`, given its current value.
    fn label(&self, field: &FieldDescriptor, live_value: Option<&Value>) -> String;

    /// Display name for a category key.
    fn category(&self, category: &str) -> String;
}

/// Shows label and category keys as-is.
pub struct Untranslated;

impl Translator for Untranslated {
    fn locale(&self) -> &str {
        "und"
    }

    fn label(&self, field: &FieldDescriptor, live_value: Option<&Value>) -> String {
        render(&field.label, field.kind, live_value)
    }

    fn category(&self, category: &str) -> String {
        category.to_string()
    }
}

/// String table for one locale. Unknown keys fall back to the key itself.
#[derive(Clone, Debug, Default)]
pub struct CatalogTranslator {
    locale: String,
    entries: HashMap<String, String>,
}

impl CatalogTranslator {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            entries: HashMap::new(),
        }
    }

    /// Builds a catalog from a flat JSON object of key → text.
    pub fn from_json(locale: impl Into<String>, json: &str) -> serde_json::Result<Self> {
        Ok(Self {
            locale: locale.into(),
            entries: serde_json::from_str(json)?,
        })
    }

    pub fn with_entry(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.entries.insert(key.into(), text.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(key.into(), text.into());
    }

    fn lookup<'a>(&'a self, key: &'a str) -> &'a str {
        self.entries.get(key).map(String::as_str).unwrap_or(key)
    }
}

impl Translator for CatalogTranslator {
    fn locale(&self) -> &str {
        &self.locale
    }

    fn label(&self, field: &FieldDescriptor, live_value: Option<&Value>) -> String {
        render(self.lookup(&field.label), field.kind, live_value)
    }

    fn category(&self, category: &str) -> String {
        self.lookup(category).to_string()
    }
}

fn render(template: &str, kind: FieldKind, live_value: Option<&Value>) -> String {
    match kind {
        FieldKind::Plain => template.to_string(),
        FieldKind::ValueInterpolated => {
            template.replace(VALUE_PLACEHOLDER, &display_value(live_value))
        }
    }
}

/// Strings without quotes; absent and null as empty.
fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
