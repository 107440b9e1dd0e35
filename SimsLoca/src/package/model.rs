//! In-memory model of a loaded package

use indexmap::IndexMap;

use super::{ArchiveEntry, ArchiveHeader, EntryFailure, ResourceKey};
use crate::formats::stbl::LocalizationTable;

/// A string table together with the index record it was decoded from
#[derive(Debug, Clone)]
pub struct TableSlot {
    pub key: ResourceKey,
    pub table: LocalizationTable,
}

/// Result of [`load_package`](super::load_package)
///
/// Owns the header, the live index records in index order, and one string
/// table per distinct instance id. Entries whose table could not be decoded
/// stay in `entries` and are described in `failures`.
#[derive(Debug, Clone)]
pub struct ArchiveModel {
    pub header: ArchiveHeader,
    pub entries: Vec<ArchiveEntry>,
    pub failures: Vec<EntryFailure>,
    pub(crate) tables: IndexMap<u64, TableSlot>,
}

impl ArchiveModel {
    pub(crate) fn new(header: ArchiveHeader) -> Self {
        Self {
            header,
            entries: Vec::new(),
            failures: Vec::new(),
            tables: IndexMap::new(),
        }
    }

    /// Look up a live entry
    #[must_use]
    pub fn entry(&self, key: &ResourceKey) -> Option<&ArchiveEntry> {
        self.entries.iter().find(|e| e.key == *key)
    }

    /// Get the table decoded for an instance id
    #[must_use]
    pub fn table(&self, instance: u64) -> Option<&LocalizationTable> {
        self.tables.get(&instance).map(|slot| &slot.table)
    }

    /// Get the table decoded for an instance id, for editing
    pub fn table_mut(&mut self, instance: u64) -> Option<&mut LocalizationTable> {
        self.tables.get_mut(&instance).map(|slot| &mut slot.table)
    }

    /// All decoded tables in index order
    pub fn tables(&self) -> impl Iterator<Item = &TableSlot> {
        self.tables.values()
    }

    /// All decoded tables in index order, for editing
    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut TableSlot> {
        self.tables.values_mut()
    }

    #[must_use]
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Whether any table has unsaved changes
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.tables.values().any(|slot| slot.table.is_modified())
    }

    /// Combine all tables into one editable view.
    ///
    /// Tables are visited in index order and the first table to provide a key
    /// wins. The returned view is not marked modified.
    #[must_use]
    pub fn merged_view(&self) -> LocalizationTable {
        let mut view = LocalizationTable::new();
        for slot in self.tables.values() {
            view.merge(&slot.table, false);
        }
        view.mark_clean();
        view
    }

    /// Write edits made on a merged view back into every table that holds
    /// the edited key. Keys that exist only in the view are ignored.
    ///
    /// Only entries that differ from a fresh [`merged_view`](Self::merged_view)
    /// count as edits, so tables shadowed by an earlier one keep their own
    /// text for keys nobody touched.
    ///
    /// # Returns
    /// Number of table entries that changed
    pub fn apply_merged(&mut self, view: &LocalizationTable) -> usize {
        let baseline = self.merged_view();
        let edits: Vec<_> = view
            .iter()
            .filter(|entry| baseline.get(entry.key) != Some(*entry))
            .collect();

        if edits.is_empty() {
            return 0;
        }

        let mut changed = 0;

        for slot in self.tables.values_mut() {
            let updates: Vec<_> = edits
                .iter()
                .filter(|entry| {
                    slot.table
                        .get(entry.key)
                        .is_some_and(|current| current != **entry)
                })
                .map(|entry| (*entry).clone())
                .collect();

            changed += updates.len();
            for entry in updates {
                slot.table.set_entry(entry);
            }
        }

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::stbl::TableEntry;
    use crate::package::CompressionCodec;

    fn model() -> ArchiveModel {
        let header = ArchiveHeader {
            major_version: 2,
            minor_version: 1,
            user_major: 0,
            user_minor: 0,
            created: 0,
            updated: 0,
            index_count: 2,
            index_offset: 96,
            index_size: 0,
        };
        let mut model = ArchiveModel::new(header);

        for (instance, rows) in [
            (0x20u64, vec![TableEntry::new(1, "second table"), TableEntry::new(3, "three")]),
            (0x10u64, vec![TableEntry::new(1, "first table"), TableEntry::new(2, "two")]),
        ] {
            let key = ResourceKey::new(0x220557DA, 0, instance);
            model.entries.push(ArchiveEntry {
                key,
                offset: 96,
                size: 0,
                decompressed_size: 0,
                codec: CompressionCodec::Stored,
                committed: 1,
                has_codec_field: false,
            });
            model.tables.insert(
                instance,
                TableSlot {
                    key,
                    table: LocalizationTable::from_entries(rows),
                },
            );
        }

        model
    }

    #[test]
    fn test_merged_view_first_writer_wins() {
        let view = model().merged_view();
        assert_eq!(view.len(), 3);
        // instance 0x20 comes first in the index
        assert_eq!(view.get_text(1), Some("second table"));
        assert!(!view.is_modified());
    }

    #[test]
    fn test_apply_merged_updates_all_holders() {
        let mut model = model();
        let mut view = model.merged_view();
        view.set(1, "edited");
        view.set(99, "not in any table");

        assert_eq!(model.apply_merged(&view), 2);
        assert_eq!(model.table(0x10).unwrap().get_text(1), Some("edited"));
        assert_eq!(model.table(0x20).unwrap().get_text(1), Some("edited"));
        assert!(!model.table(0x10).unwrap().contains_key(99));
        assert!(model.is_modified());
    }

    #[test]
    fn test_apply_unchanged_view_is_noop() {
        let mut model = model();
        let view = model.merged_view();
        assert_eq!(model.apply_merged(&view), 0);
        assert!(!model.is_modified());
    }

    #[test]
    fn test_shadowed_key_keeps_its_text() {
        let mut model = model();
        let mut view = model.merged_view();
        view.set(2, "deux");

        assert_eq!(model.apply_merged(&view), 1);
        assert_eq!(model.table(0x10).unwrap().get_text(2), Some("deux"));
        // key 1 was not edited, the later table keeps its own value
        assert_eq!(model.table(0x10).unwrap().get_text(1), Some("first table"));
        assert_eq!(model.table(0x20).unwrap().get_text(1), Some("second table"));
        assert!(!model.table(0x20).unwrap().is_modified());
    }
}
