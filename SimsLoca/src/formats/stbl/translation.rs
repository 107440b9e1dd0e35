//! Translation workflow support
//!
//! Export a string table to a file for translators, import the translated
//! file back.
//!
//! # Delimited formats
//!
//! TSV/CSV files have a header row and four columns:
//! 1. Key (`0x` hex)
//! 2. Flags
//! 3. Original text
//! 4. Translation (empty on export, filled by translator)
//!
//! ```tsv
//! Key\tFlags\tOriginal\tTranslation
//! 0x00001001\t0\tHello world\t
//! ```
//!
//! Line breaks are exported in their on-disk form (`\n` as two characters)
//! so every row stays on one line.
//!
//! # JSON
//!
//! A JSON array of objects with the same four fields.

use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{LocalizationTable, normalize_text};
use crate::error::{Error, Result};

/// Export format for translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Tab-separated values (recommended for spreadsheets)
    #[default]
    Tsv,
    /// Comma-separated values
    Csv,
    /// JSON array
    Json,
}

impl ExportFormat {
    /// Get the file extension for this format
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Tsv => "tsv",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Guess the format from a file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()?.to_str()?.parse().ok()
    }

    fn delimiter(self) -> Option<char> {
        match self {
            Self::Tsv => Some('\t'),
            Self::Csv => Some(','),
            Self::Json => None,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tsv" | "txt" => Ok(Self::Tsv),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(format!("unknown format '{s}' (expected tsv, csv or json)")),
        }
    }
}

/// One row of a translation file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRow {
    /// String key
    #[serde(with = "hex_key")]
    pub key: u32,
    /// Entry flags
    #[serde(default)]
    pub flags: u8,
    /// Source text
    #[serde(default)]
    pub original: String,
    /// Translated text, empty if untranslated
    #[serde(default)]
    pub translation: String,
}

/// Result of importing translations
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    /// Number of entries updated with translations
    pub translated: usize,
    /// Number of rows that had no translation
    pub skipped: usize,
    /// Number of keys not found in the table
    pub not_found: usize,
    /// Keys that were not found
    pub missing_keys: Vec<u32>,
}

/// Parse a string key written as `0x` hex or decimal
///
/// # Errors
/// Returns [`Error::InvalidKey`] if the text is neither.
pub fn parse_key(text: &str) -> Result<u32> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|_| Error::InvalidKey(text.to_string()))
}

/// Export a table to a translation file
///
/// # Returns
/// Number of rows written
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn export_for_translation<P: AsRef<Path>>(
    table: &LocalizationTable,
    path: P,
    format: ExportFormat,
) -> Result<usize> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    let count = write_translations(table, &mut writer, format)?;
    writer.flush()?;
    Ok(count)
}

/// Write a table as translation rows
///
/// # Errors
/// Returns an error if writing fails.
pub fn write_translations<W: Write>(
    table: &LocalizationTable,
    mut writer: W,
    format: ExportFormat,
) -> Result<usize> {
    let Some(delimiter) = format.delimiter() else {
        let rows: Vec<TranslationRow> = table
            .iter()
            .map(|entry| TranslationRow {
                key: entry.key,
                flags: entry.flags,
                original: entry.text.clone(),
                translation: String::new(),
            })
            .collect();
        serde_json::to_writer_pretty(&mut writer, &rows)?;
        writeln!(writer)?;
        return Ok(rows.len());
    };

    writeln!(writer, "Key{delimiter}Flags{delimiter}Original{delimiter}Translation")?;
    for entry in table {
        let text = escape_for_delimited(&normalize_text(&entry.text), delimiter);
        writeln!(
            writer,
            "{:#010X}{delimiter}{}{delimiter}{}{delimiter}",
            entry.key, entry.flags, text
        )?;
    }

    Ok(table.len())
}

/// Read translation rows
///
/// Delimited rows with fewer than four columns are skipped.
///
/// # Errors
/// Returns an error if reading fails, a key is invalid, or the JSON is
/// malformed.
pub fn read_translations<R: Read>(reader: R, format: ExportFormat) -> Result<Vec<TranslationRow>> {
    let Some(delimiter) = format.delimiter() else {
        return Ok(serde_json::from_reader(reader)?);
    };

    let mut rows = Vec::new();
    let mut lines = BufReader::new(reader).lines();

    // Skip header
    if lines.next().transpose()?.is_none() {
        return Ok(rows);
    }

    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let parts = split_delimited(&line, delimiter);
        if parts.len() < 4 {
            tracing::debug!("Skipping malformed translation row: {}", line);
            continue;
        }

        rows.push(TranslationRow {
            key: parse_key(&parts[0])?,
            flags: parts[1].trim().parse().unwrap_or(0),
            original: parts[2].clone(),
            translation: parts[3].clone(),
        });
    }

    Ok(rows)
}

/// Import translations from a file into a table
///
/// Only rows with a non-empty translation column update the table.
///
/// # Errors
/// Returns an error if the file cannot be read or has an invalid format.
pub fn import_translations<P: AsRef<Path>>(
    table: &mut LocalizationTable,
    path: P,
    format: ExportFormat,
) -> Result<ImportResult> {
    let file = std::fs::File::open(path)?;
    let rows = read_translations(file, format)?;
    Ok(apply_translations(table, &rows))
}

/// Apply translation rows to a table
pub fn apply_translations(table: &mut LocalizationTable, rows: &[TranslationRow]) -> ImportResult {
    let mut result = ImportResult::default();

    for row in rows {
        if row.translation.is_empty() {
            result.skipped += 1;
        } else if table.contains_key(row.key) {
            table.set(row.key, row.translation.clone());
            result.translated += 1;
        } else {
            result.not_found += 1;
            result.missing_keys.push(row.key);
        }
    }

    result
}

// ============================================================================
// Helper functions
// ============================================================================

/// Escape text for TSV/CSV output
fn escape_for_delimited(text: &str, delimiter: char) -> String {
    if text.contains(delimiter) || text.contains('"') {
        let escaped = text.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        text.to_string()
    }
}

/// Split a delimited line, honoring double-quoted fields
fn split_delimited(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' if in_quotes => in_quotes = false,
            '"' if field.is_empty() => in_quotes = true,
            c if c == delimiter && !in_quotes => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    fields.push(field);

    fields
}

mod hex_key {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(key: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{key:#010X}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_key(&text).map_err(serde::de::Error::custom)
    }
}
