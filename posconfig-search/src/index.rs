use crate::normalize::normalize;
use crate::translate::Translator;
use posconfig_types::{ConfigurationTree, FieldDescriptor};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Category key for descriptors that declare none.
pub const DEFAULT_CATEGORY: &str = "general";

/// Search hits keyed by display category.
///
/// Within a category, fields keep the order of the descriptor list.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SearchResults {
    groups: BTreeMap<String, Vec<FieldDescriptor>>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of categories with at least one hit.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of matching fields across all categories.
    pub fn total(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn get(&self, category: &str) -> Option<&[FieldDescriptor]> {
        self.groups.get(category).map(Vec::as_slice)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FieldDescriptor])> {
        self.groups
            .iter()
            .map(|(category, fields)| (category.as_str(), fields.as_slice()))
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<FieldDescriptor>> {
        self.groups
    }
}

/// Static list of searchable field descriptors.
#[derive(Clone, Debug, Default)]
pub struct FieldIndex {
    fields: Vec<FieldDescriptor>,
}

impl FieldIndex {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields }
    }

    /// Loads a descriptor table from a JSON array.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields whose display label or display category contains `query`.
    ///
    /// Labels are rendered through `translator` with each field's current
    /// value from `live`, then normalized, on every call. A blank query
    /// matches nothing.
    pub fn search<F>(&self, query: &str, translator: &dyn Translator, live: F) -> SearchResults
    where
        F: Fn(&str) -> Option<Value>,
    {
        let mut results = SearchResults::default();
        let needle = normalize(query.trim());
        if needle.is_empty() {
            return results;
        }

        for field in &self.fields {
            let value = live(&field.key);
            let label = translator.label(field, value.as_ref());
            let category =
                translator.category(field.category.as_deref().unwrap_or(DEFAULT_CATEGORY));

            if normalize(&label).contains(&needle) || normalize(&category).contains(&needle) {
                results
                    .groups
                    .entry(category)
                    .or_default()
                    .push(field.clone());
            }
        }
        results
    }

    /// [`FieldIndex::search`] with live values read from `tree`.
    pub fn search_tree(
        &self,
        query: &str,
        translator: &dyn Translator,
        tree: &ConfigurationTree,
    ) -> SearchResults {
        self.search(query, translator, |key| tree.get(key).cloned())
    }
}
