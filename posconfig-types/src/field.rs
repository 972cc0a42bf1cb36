use serde::{Deserialize, Serialize};

/// How a field's display label is produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Label is a plain translation of the label key.
    #[default]
    Plain,
    /// Label embeds the field's current value, so it changes with the value.
    ValueInterpolated,
}

/// Static metadata describing one configurable setting.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Translation key (or literal text) for the label.
    pub label: String,
    /// Translation key for the category; `None` groups under the default one.
    #[serde(default)]
    pub category: Option<String>,
    /// Tree key holding the field's value.
    pub key: String,
    #[serde(default)]
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub fn new(label: impl Into<String>, category: Option<&str>, key: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            category: category.map(str::to_string),
            key: key.into(),
            kind: FieldKind::Plain,
        }
    }

    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }
}
