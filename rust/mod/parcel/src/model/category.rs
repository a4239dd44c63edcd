use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::null_as_empty;

/// A row of the category master table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub id: String,

    /// Category letter referenced by parcels.
    #[serde(rename = "kode", default, deserialize_with = "null_as_empty")]
    pub code: String,

    #[serde(rename = "nama_kode", default, deserialize_with = "null_as_empty")]
    pub name: String,

    #[serde(rename = "kategori", default, deserialize_with = "null_as_empty")]
    pub billing_category: String,
}

/// Fields written on create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryInput {
    #[serde(rename = "kode")]
    pub code: String,
    #[serde(rename = "nama_kode")]
    pub name: String,
    #[serde(rename = "kategori")]
    pub billing_category: String,
}

/// Category letter → master entry, loaded from the master table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCatalog {
    entries: BTreeMap<String, CategoryEntry>,
}

impl CategoryCatalog {
    /// Later entries with the same code replace earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = CategoryEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|e| (e.code.to_ascii_uppercase(), e))
            .collect();
        Self { entries }
    }

    pub fn get(&self, code: &str) -> Option<&CategoryEntry> {
        self.entries.get(&code.to_ascii_uppercase())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Billing label for a parcel of this category; the letter itself when
    /// the entry has none.
    pub fn label_for(&self, code: &str) -> String {
        match self.get(code) {
            Some(e) if !e.billing_category.is_empty() => e.billing_category.clone(),
            _ => code.to_string(),
        }
    }

    /// Codes in order.
    pub fn codes(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CategoryEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
