//! .stbl string table format
//!
//! Binary localization table used by package resources of type
//! [`STBL_RESOURCE_TYPE`]. Maps 32-bit string keys to UTF-8 text.
//!
//! # Layout (little-endian)
//!
//! ```text
//! magic "STBL"      4
//! version           2   (must be 5)
//! compressed        1   (informational)
//! entry count       8
//! reserved          2
//! strings length    4   (sum of 7 + text length over all entries)
//! entries:
//!   key             4
//!   flags           1
//!   length          2
//!   utf-8 text      length
//! ```

mod editor;
mod reader;
mod translation;
mod writer;

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};

pub use editor::{MergeResult, ReplaceResult};
pub use reader::{parse_stbl_bytes, read_stbl};
pub use translation::{
    ExportFormat, ImportResult, TranslationRow, apply_translations, export_for_translation,
    import_translations, parse_key, read_translations, write_translations,
};
pub use writer::{encode_stbl, write_stbl};

/// "STBL" magic signature
pub const STBL_MAGIC: [u8; 4] = *b"STBL";

/// The only supported table version
pub const STBL_VERSION: u16 = 5;

/// Size of the fixed table header
pub const HEADER_SIZE: usize = 21;

/// Size of the fixed part of each entry (key + flags + length)
pub const ENTRY_HEADER_SIZE: usize = 7;

/// Package resource type of string tables
pub const STBL_RESOURCE_TYPE: u32 = 0x220557DA;

/// A single localized string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    /// String key (usually an FNV hash of the source identifier)
    pub key: u32,
    /// Text content
    pub text: String,
    /// Per-entry flag byte
    #[serde(default)]
    pub flags: u8,
}

impl TableEntry {
    /// Create an entry with flags cleared
    pub fn new(key: u32, text: impl Into<String>) -> Self {
        Self {
            key,
            text: text.into(),
            flags: 0,
        }
    }

    /// Set the flag byte
    #[must_use]
    pub fn with_flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    /// Text as it is written to disk: carriage returns removed, line feeds
    /// replaced by the two characters `\n`.
    #[must_use]
    pub fn normalized_text(&self) -> Cow<'_, str> {
        normalize_text(&self.text)
    }
}

/// Apply the on-disk text normalization
#[must_use]
pub fn normalize_text(text: &str) -> Cow<'_, str> {
    if text.contains(['\r', '\n']) {
        Cow::Owned(text.replace('\r', "").replace('\n', "\\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// A string table: unique keys, iterated in ascending key order.
///
/// Every mutating accessor that actually changes content raises the
/// modified flag; package saving only rewrites tables that carry it.
#[derive(Debug, Clone, Default)]
pub struct LocalizationTable {
    entries: BTreeMap<u32, TableEntry>,
    modified: bool,
}

impl LocalizationTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from entries; later duplicates replace earlier ones.
    /// The result is not marked modified.
    pub fn from_entries(entries: impl IntoIterator<Item = TableEntry>) -> Self {
        let entries = entries.into_iter().map(|e| (e.key, e)).collect();
        Self {
            entries,
            modified: false,
        }
    }

    /// Get an entry by key
    #[must_use]
    pub fn get(&self, key: u32) -> Option<&TableEntry> {
        self.entries.get(&key)
    }

    /// Get an entry's text by key
    #[must_use]
    pub fn get_text(&self, key: u32) -> Option<&str> {
        self.entries.get(&key).map(|e| e.text.as_str())
    }

    /// Set the text of a key, keeping the existing flags.
    ///
    /// # Returns
    /// `true` if a new entry was added, `false` if an existing one was updated
    pub fn set(&mut self, key: u32, text: impl Into<String>) -> bool {
        let text = text.into();
        match self.entries.entry(key) {
            btree_map::Entry::Occupied(mut slot) => {
                if slot.get().text != text {
                    slot.get_mut().text = text;
                    self.modified = true;
                }
                false
            }
            btree_map::Entry::Vacant(slot) => {
                slot.insert(TableEntry::new(key, text));
                self.modified = true;
                true
            }
        }
    }

    /// Insert or replace a whole entry
    ///
    /// # Returns
    /// The previous entry for the key, if any
    pub fn set_entry(&mut self, entry: TableEntry) -> Option<TableEntry> {
        if self.entries.get(&entry.key) == Some(&entry) {
            return Some(entry);
        }
        self.modified = true;
        self.entries.insert(entry.key, entry)
    }

    /// Remove an entry by key
    pub fn remove(&mut self, key: u32) -> Option<TableEntry> {
        let removed = self.entries.remove(&key);
        if removed.is_some() {
            self.modified = true;
        }
        removed
    }

    #[must_use]
    pub fn contains_key(&self, key: u32) -> bool {
        self.entries.contains_key(&key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = &TableEntry> {
        self.entries.values()
    }

    /// Keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }

    /// Whether the table changed since it was decoded or last marked clean
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Force the table to be rewritten on the next package save
    pub fn mark_modified(&mut self) {
        self.modified = true;
    }

    /// Clear the modified flag
    pub fn mark_clean(&mut self) {
        self.modified = false;
    }
}

impl<'a> IntoIterator for &'a LocalizationTable {
    type Item = &'a TableEntry;
    type IntoIter = btree_map::Values<'a, u32, TableEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_tracks_modification() {
        let mut table = LocalizationTable::from_entries([TableEntry::new(1, "one")]);
        assert!(!table.is_modified());

        // Same text is not a change
        assert!(!table.set(1, "one"));
        assert!(!table.is_modified());

        assert!(!table.set(1, "uno"));
        assert!(table.is_modified());
        assert_eq!(table.get_text(1), Some("uno"));
    }

    #[test]
    fn test_set_keeps_flags() {
        let mut table = LocalizationTable::from_entries([TableEntry::new(7, "a").with_flags(3)]);
        table.set(7, "b");
        assert_eq!(table.get(7).unwrap().flags, 3);
    }

    #[test]
    fn test_iteration_is_sorted() {
        let table = LocalizationTable::from_entries([
            TableEntry::new(30, "c"),
            TableEntry::new(10, "a"),
            TableEntry::new(20, "b"),
        ]);
        assert_eq!(table.keys().collect::<Vec<_>>(), vec![10, 20, 30]);
    }

    #[test]
    fn test_remove() {
        let mut table = LocalizationTable::from_entries([TableEntry::new(1, "x")]);
        assert!(table.remove(2).is_none());
        assert!(!table.is_modified());
        assert_eq!(table.remove(1).unwrap().text, "x");
        assert!(table.is_modified());
        assert!(table.is_empty());
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("plain"), "plain");
        assert_eq!(normalize_text("a\r\nb\nc"), "a\\nb\\nc");
    }
}
