//! String table editing operations
//!
//! Bulk operations on top of the single-key accessors in the parent module:
//! - Find by text
//! - Find-and-replace
//! - Merge tables

use super::{LocalizationTable, TableEntry};

/// Result of a bulk replace operation
#[derive(Debug, Clone, Default)]
pub struct ReplaceResult {
    /// Number of entries modified
    pub entries_modified: usize,
    /// Total number of replacements made
    pub replacements: usize,
    /// Keys of modified entries
    pub modified_keys: Vec<u32>,
}

/// Result of merging one table into another
#[derive(Debug, Clone, Default)]
pub struct MergeResult {
    /// Keys that were not present and got added
    pub added: usize,
    /// Keys that were present and got overwritten
    pub updated: usize,
    /// Keys that were present and left alone
    pub kept: usize,
}

impl LocalizationTable {
    /// Replace all occurrences of `find` with `replace` in every entry.
    ///
    /// Case-insensitive matching folds ASCII letters only.
    pub fn replace_all(&mut self, find: &str, replace: &str, case_sensitive: bool) -> ReplaceResult {
        let mut result = ReplaceResult::default();
        if find.is_empty() {
            return result;
        }

        let updates: Vec<(u32, String, usize)> = self
            .iter()
            .filter_map(|entry| {
                let (new_text, count) = if case_sensitive {
                    replace_counting(&entry.text, find, replace)
                } else {
                    replace_ascii_case_insensitive_counting(&entry.text, find, replace)
                };
                (count > 0).then_some((entry.key, new_text, count))
            })
            .collect();

        for (key, new_text, count) in updates {
            self.set(key, new_text);
            result.entries_modified += 1;
            result.replacements += count;
            result.modified_keys.push(key);
        }

        result
    }

    /// Merge entries from another table.
    ///
    /// With `overwrite == false` the first writer wins: keys already present
    /// keep their current entry.
    pub fn merge(&mut self, other: &LocalizationTable, overwrite: bool) -> MergeResult {
        let mut result = MergeResult::default();

        for entry in other {
            if self.contains_key(entry.key) {
                if overwrite {
                    self.set_entry(entry.clone());
                    result.updated += 1;
                } else {
                    result.kept += 1;
                }
            } else {
                self.set_entry(entry.clone());
                result.added += 1;
            }
        }

        result
    }

    /// Find entries containing text
    #[must_use]
    pub fn find_by_text(&self, text: &str, case_sensitive: bool) -> Vec<&TableEntry> {
        if case_sensitive {
            self.iter().filter(|e| e.text.contains(text)).collect()
        } else {
            let text_lower = text.to_lowercase();
            self.iter()
                .filter(|e| e.text.to_lowercase().contains(&text_lower))
                .collect()
        }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Replace all occurrences and count them
fn replace_counting(text: &str, find: &str, replace: &str) -> (String, usize) {
    let count = text.matches(find).count();
    if count == 0 {
        return (text.to_string(), 0);
    }
    (text.replace(find, replace), count)
}

/// ASCII case-insensitive replace with counting.
///
/// ASCII lowering keeps byte offsets identical, so match positions found in
/// the lowered copy are valid in the original.
fn replace_ascii_case_insensitive_counting(
    text: &str,
    find: &str,
    replace: &str,
) -> (String, usize) {
    let find_lower = find.to_ascii_lowercase();
    let text_lower = text.to_ascii_lowercase();

    let mut result = String::with_capacity(text.len());
    let mut last_end = 0;
    let mut count = 0;

    for (start, _) in text_lower.match_indices(&find_lower) {
        result.push_str(&text[last_end..start]);
        result.push_str(replace);
        last_end = start + find.len();
        count += 1;
    }
    result.push_str(&text[last_end..]);

    (result, count)
}
