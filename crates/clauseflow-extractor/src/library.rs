//! In-memory reference library, loadable from TOML
//!
//! ```toml
//! [[entries]]
//! customer = "acme"
//! identifier = "SDC-Q-100"
//! version = "Rev C"
//! title = "Supplier Quality Requirements"
//! ```

use crate::error::LibraryError;
use clauseflow_domain::traits::ReferenceLibrary;
use clauseflow_domain::{CustomerId, LibraryEntry, LibraryEntryId};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

#[derive(Debug, Default, Serialize, Deserialize)]
struct LibraryFile {
    #[serde(default)]
    entries: Vec<EntryRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EntryRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    customer: String,
    identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

/// A reference library held in memory, in insertion order
#[derive(Debug, Clone, Default)]
pub struct InMemoryLibrary {
    entries: Vec<LibraryEntry>,
}

impl InMemoryLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn add(&mut self, entry: LibraryEntry) {
        self.entries.push(entry);
    }

    /// All entries, for every customer
    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the library has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load from TOML; entries without an `id` get a fresh one
    pub fn from_toml(toml_str: &str) -> Result<Self, LibraryError> {
        let file: LibraryFile =
            toml::from_str(toml_str).map_err(|e| LibraryError::Parse(e.to_string()))?;

        let mut entries = Vec::with_capacity(file.entries.len());
        for record in file.entries {
            let id = match record.id.as_deref() {
                Some(raw) => LibraryEntryId::from_string(raw).map_err(LibraryError::InvalidId)?,
                None => LibraryEntryId::new(),
            };
            entries.push(LibraryEntry {
                id,
                customer: CustomerId::new(record.customer),
                identifier: record.identifier,
                version: record.version,
                title: record.title,
            });
        }
        Ok(Self { entries })
    }

    /// Save to TOML, ids included
    pub fn to_toml(&self) -> Result<String, LibraryError> {
        let file = LibraryFile {
            entries: self
                .entries
                .iter()
                .map(|entry| EntryRecord {
                    id: Some(entry.id.to_string()),
                    customer: entry.customer.as_str().to_string(),
                    identifier: entry.identifier.clone(),
                    version: entry.version.clone(),
                    title: entry.title.clone(),
                })
                .collect(),
        };
        toml::to_string_pretty(&file).map_err(|e| LibraryError::Serialize(e.to_string()))
    }
}

impl ReferenceLibrary for InMemoryLibrary {
    type Error = Infallible;

    fn entries_for_customer(&self, customer: &CustomerId) -> Result<Vec<LibraryEntry>, Self::Error> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| &entry.customer == customer)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY: &str = r#"
[[entries]]
customer = "acme"
identifier = "SDC-Q-100"
version = "Rev C"

[[entries]]
customer = "globex"
identifier = "GX-200"

[[entries]]
id = "0190a8c2-7d1e-7c3b-9f1a-2b3c4d5e6f70"
customer = "acme"
identifier = "SDC-Q-200"
title = "Packaging"
"#;

    #[test]
    fn test_entries_are_scoped_by_customer() {
        let library = InMemoryLibrary::from_toml(LIBRARY).unwrap();
        assert_eq!(library.len(), 3);

        let acme = library.entries_for_customer(&CustomerId::new("acme")).unwrap();
        let identifiers: Vec<_> = acme.iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(identifiers, vec!["SDC-Q-100", "SDC-Q-200"]);

        let none = library.entries_for_customer(&CustomerId::new("initech")).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_explicit_id_is_kept_through_save() {
        let library = InMemoryLibrary::from_toml(LIBRARY).unwrap();
        assert_eq!(
            library.entries()[2].id.to_string(),
            "0190a8c2-7d1e-7c3b-9f1a-2b3c4d5e6f70"
        );

        let reloaded = InMemoryLibrary::from_toml(&library.to_toml().unwrap()).unwrap();
        assert_eq!(reloaded.entries(), library.entries());
    }

    #[test]
    fn test_invalid_id_is_rejected() {
        let result = InMemoryLibrary::from_toml(
            "[[entries]]\nid = \"nope\"\ncustomer = \"acme\"\nidentifier = \"X\"\n",
        );
        assert!(matches!(result, Err(LibraryError::InvalidId(_))));
    }

    #[test]
    fn test_empty_file_is_empty_library() {
        assert!(InMemoryLibrary::from_toml("").unwrap().is_empty());
    }
}
