use pretty_assertions::assert_eq;
use tempfile::tempdir;

use simsloca::formats::stbl::{
    ExportFormat, LocalizationTable, TableEntry, export_for_translation, import_translations,
    read_stbl, write_stbl,
};

fn sample() -> LocalizationTable {
    LocalizationTable::from_entries([
        TableEntry::new(0x1001, "Hello"),
        TableEntry::new(0x1002, "Two\nlines"),
        TableEntry::new(0x1003, "Comma, \"quoted\"").with_flags(2),
    ])
}

#[test]
fn test_stbl_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("strings.stbl");

    write_stbl(&path, &sample()).unwrap();
    let table = read_stbl(&path).unwrap();

    assert_eq!(table.len(), 3);
    // line breaks are stored escaped
    assert_eq!(table.get_text(0x1002), Some("Two\\nlines"));
    assert_eq!(table.get(0x1003).unwrap().flags, 2);
    assert!(!table.is_modified());
}

#[test]
fn test_translation_round_trip_all_formats() {
    let dir = tempdir().unwrap();

    for format in [ExportFormat::Tsv, ExportFormat::Csv, ExportFormat::Json] {
        let path = dir.path().join(format!("strings.{}", format.extension()));
        assert_eq!(ExportFormat::from_path(&path), Some(format));

        let count = export_for_translation(&sample(), &path, format).unwrap();
        assert_eq!(count, 3);

        // a translator fills in the last column for one row
        let exported = std::fs::read_to_string(&path).unwrap();
        let edited = match format {
            ExportFormat::Json => exported.replacen(
                "\"translation\": \"\"",
                "\"translation\": \"Bonjour\"",
                1,
            ),
            ExportFormat::Tsv => exported.replacen("Hello\t", "Hello\tBonjour", 1),
            ExportFormat::Csv => exported.replacen("Hello,", "Hello,Bonjour", 1),
        };
        std::fs::write(&path, edited).unwrap();

        let mut table = sample();
        let result = import_translations(&mut table, &path, format).unwrap();
        assert_eq!(result.translated, 1, "{format:?}");
        assert_eq!(result.skipped, 2, "{format:?}");
        assert_eq!(table.get_text(0x1001), Some("Bonjour"));
        assert_eq!(table.get_text(0x1003), Some("Comma, \"quoted\""));
        assert!(table.is_modified());
    }
}
