//! CLI commands for standalone .stbl files

use std::path::Path;

use crate::formats::stbl::{
    ExportFormat, LocalizationTable, export_for_translation, import_translations, parse_key,
    read_stbl, write_stbl,
};
use crate::utils::backup_path;

/// Search entries by text content
pub fn search(path: &Path, query: &str, limit: usize) -> anyhow::Result<()> {
    let table = read_stbl(path)?;
    let matches = table.find_by_text(query, false);

    if matches.is_empty() {
        println!("No entries found containing '{query}'");
        return Ok(());
    }

    println!("Found {} entries containing '{}':", matches.len(), query);
    println!();
    for entry in matches.iter().take(limit) {
        println!("0x{:08X}", entry.key);
        println!("  {}", truncate_text(&entry.text, 100));
    }

    Ok(())
}

/// Get a specific entry by key
pub fn get(path: &Path, key: &str) -> anyhow::Result<()> {
    let table = read_stbl(path)?;
    let key = parse_key(key)?;

    let Some(entry) = table.get(key) else {
        anyhow::bail!("Entry not found: 0x{:08X}", key);
    };

    println!("Key: 0x{:08X}", entry.key);
    println!("Flags: {}", entry.flags);
    println!("Text:");
    println!("{}", entry.text);

    Ok(())
}

/// Add or update an entry
pub fn set(path: &Path, key: &str, text: &str, create: bool) -> anyhow::Result<()> {
    let key = parse_key(key)?;
    let mut table = if path.exists() {
        read_stbl(path)?
    } else if create {
        LocalizationTable::new()
    } else {
        anyhow::bail!(
            "File does not exist: {}. Use --create to create a new file.",
            path.display()
        );
    };

    let is_new = table.set(key, text);
    write_stbl(path, &table)?;

    if is_new {
        println!("Added entry: 0x{key:08X}");
    } else {
        println!("Updated entry: 0x{key:08X}");
    }

    Ok(())
}

/// Export a table to a translation file
pub fn export(path: &Path, output: Option<&Path>, format: ExportFormat) -> anyhow::Result<()> {
    let table = read_stbl(path)?;

    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| path.with_extension(format.extension()));

    let count = export_for_translation(&table, &output_path, format)?;

    println!("Exported {} entries to {}", count, output_path.display());
    if format != ExportFormat::Json {
        println!("\nThe file has 4 columns:");
        println!("  1. Key");
        println!("  2. Flags");
        println!("  3. Original text");
        println!("  4. Translation (fill this in)");
    }

    Ok(())
}

/// Import translations from file
pub fn import(
    path: &Path,
    translations: &Path,
    format: Option<ExportFormat>,
    backup: bool,
) -> anyhow::Result<()> {
    let mut table = read_stbl(path)?;
    let format = format
        .or_else(|| ExportFormat::from_path(translations))
        .unwrap_or_default();

    if backup {
        let backup = backup_path(path);
        std::fs::copy(path, &backup)?;
        println!("Created backup: {}", backup.display());
    }

    let result = import_translations(&mut table, translations, format)?;

    if result.translated == 0 {
        println!("No translations found in {}", translations.display());
        return Ok(());
    }

    write_stbl(path, &table)?;

    println!("Import complete:");
    println!("  Translated: {}", result.translated);
    println!("  Skipped (empty): {}", result.skipped);

    if result.not_found > 0 {
        println!("  Not found: {}", result.not_found);
        if result.missing_keys.len() > 5 {
            println!("    (showing first 5)");
        }
        for key in result.missing_keys.iter().take(5) {
            println!("    - 0x{key:08X}");
        }
    }

    Ok(())
}

/// Truncate text for display
fn truncate_text(text: &str, max_chars: usize) -> String {
    let text = text.replace('\n', "\\n");
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        text
    }
}
