//! CLI commands for DBPF package operations

use std::path::Path;
use std::time::Instant;

use crate::cli::progress::{DISK, GEAR, LOOKING_GLASS, PACKAGE, print_done, print_step};
use crate::formats::stbl::{
    ExportFormat, STBL_RESOURCE_TYPE, apply_translations, export_for_translation,
    read_translations,
};
use crate::package::{PackageFile, SaveOptions};
use crate::utils::backup_path;

/// Print the header and a summary of the decoded tables
pub fn info(path: &Path) -> anyhow::Result<()> {
    let package = PackageFile::open(path)?;
    let model = &package.model;
    let header = &model.header;

    println!("{}", path.display());
    println!(
        "  Version: {}.{} (user {}.{})",
        header.major_version, header.minor_version, header.user_major, header.user_minor
    );
    println!("  Created: {}  Updated: {}", header.created, header.updated);
    println!(
        "  Index: {} records at {} ({} bytes)",
        header.index_count, header.index_offset, header.index_size
    );
    println!("  Live entries: {}", model.entries.len());
    println!("  String tables: {}", model.table_count());

    for slot in model.tables() {
        println!("    {}  {} strings", slot.key, slot.table.len());
    }

    if !model.failures.is_empty() {
        println!("  Failed entries: {}", model.failures.len());
        for failure in &model.failures {
            println!("    {}  {}", failure.key, failure.reason);
        }
    }

    Ok(())
}

/// List index entries
pub fn list(path: &Path, stbl_only: bool, json: bool) -> anyhow::Result<()> {
    let package = PackageFile::open(path)?;
    let entries: Vec<_> = package
        .model
        .entries
        .iter()
        .filter(|e| !stbl_only || e.key.resource_type == STBL_RESOURCE_TYPE)
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in &entries {
        println!(
            "{}  offset {:>10}  size {:>8}  raw {:>8}  {}",
            entry.key,
            entry.offset,
            entry.size,
            entry.decompressed_size,
            entry.codec.as_str()
        );
    }
    println!("{} entries", entries.len());

    Ok(())
}

/// Export the merged strings of every table in the package
pub fn export(path: &Path, output: Option<&Path>, format: ExportFormat) -> anyhow::Result<()> {
    let package = PackageFile::open(path)?;
    let view = package.model.merged_view();

    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| path.with_extension(format.extension()));

    let count = export_for_translation(&view, &output_path, format)?;
    println!(
        "Exported {} strings from {} tables to {}",
        count,
        package.model.table_count(),
        output_path.display()
    );

    Ok(())
}

/// Apply a translation file to every table of a package and save it
pub fn import(
    path: &Path,
    translations: &Path,
    output: Option<&Path>,
    format: Option<ExportFormat>,
    level: u32,
    all: bool,
    backup: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();
    let format = format
        .or_else(|| ExportFormat::from_path(translations))
        .unwrap_or_default();

    print_step(1, 3, LOOKING_GLASS, "Reading package...");
    let mut package = PackageFile::open(path)?;
    let file = std::fs::File::open(translations)?;
    let rows = read_translations(file, format)?;

    print_step(2, 3, GEAR, "Applying translations...");
    let mut view = package.model.merged_view();
    let result = apply_translations(&mut view, &rows);
    let changed = package.model.apply_merged(&view);

    println!("  Translated: {}", result.translated);
    println!("  Skipped (empty): {}", result.skipped);
    if result.not_found > 0 {
        println!("  Not found: {}", result.not_found);
        for key in result.missing_keys.iter().take(5) {
            println!("    - 0x{key:08X}");
        }
    }

    if changed == 0 && !all {
        println!("No strings changed, package left untouched");
        return Ok(());
    }

    let destination = output.unwrap_or(path);
    if backup && destination.exists() {
        let backup = backup_path(destination);
        std::fs::copy(destination, &backup)?;
        println!("{}Created backup: {}", PACKAGE, backup.display());
    }

    print_step(3, 3, DISK, "Writing package...");
    let options = SaveOptions::new().with_level(level).reencode_all(all);
    package.save(destination, &options)?;
    println!("  {} strings updated in {}", changed, destination.display());

    print_done(started.elapsed());
    Ok(())
}
