//! Entity id to display name lookup built from the same listing as a `TokenIndex`.

use std::collections::HashMap;

use crate::model::CatalogEntry;

#[derive(Debug, Clone, Default)]
pub struct NameDictionary {
    names: HashMap<String, String>,
}

impl NameDictionary {
    /// Later entries win when an id is listed twice.
    pub fn build(entries: &[CatalogEntry]) -> Self {
        let names = entries
            .iter()
            .map(|entry| (entry.url.clone(), entry.name.clone()))
            .collect();
        Self { names }
    }

    /// Display name for `id`, or an empty string when unknown.
    pub fn lookup(&self, id: &str) -> &str {
        self.names.get(id).map(String::as_str).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}
