//! Subcommand enum definitions for CLI

use clap::Subcommand;
use std::path::PathBuf;

use crate::formats::stbl::ExportFormat;

/// DBPF package commands
#[derive(Subcommand)]
pub enum PackageCommands {
    /// Show header and table summary of a package
    Info {
        /// Package file
        path: PathBuf,
    },

    /// List index entries
    List {
        /// Package file
        path: PathBuf,

        /// Only list string table entries
        #[arg(long)]
        stbl_only: bool,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export all strings of a package for translation
    Export {
        /// Package file
        path: PathBuf,

        /// Output file (defaults to the package name with the format's extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: tsv, csv, json
        #[arg(long, default_value = "tsv")]
        format: ExportFormat,
    },

    /// Import translations into a package
    Import {
        /// Package file
        path: PathBuf,

        /// Translation file
        translations: PathBuf,

        /// Write to this file instead of replacing the package
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Input format (guessed from the extension if omitted)
        #[arg(long)]
        format: Option<ExportFormat>,

        /// Zlib level for rewritten tables (0-9)
        #[arg(long, default_value = "6")]
        level: u32,

        /// Rewrite every string table, not only changed ones
        #[arg(long)]
        all: bool,

        /// Keep a .bak copy of the package before overwriting
        #[arg(long)]
        backup: bool,
    },
}

/// Standalone .stbl commands
#[derive(Subcommand)]
pub enum StblCommands {
    /// Search for entries by text
    Search {
        /// STBL file to search
        path: PathBuf,

        /// Search term
        query: String,

        /// Maximum results to return
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Print one entry
    Get {
        /// STBL file
        path: PathBuf,

        /// String key (0x hex or decimal)
        key: String,
    },

    /// Add or update an entry
    Set {
        /// STBL file
        path: PathBuf,

        /// String key (0x hex or decimal)
        key: String,

        /// New text
        text: String,

        /// Create the file if it does not exist
        #[arg(long)]
        create: bool,
    },

    /// Export a table for translation
    Export {
        /// STBL file
        path: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: tsv, csv, json
        #[arg(long, default_value = "tsv")]
        format: ExportFormat,
    },

    /// Import translations into a table
    Import {
        /// STBL file
        path: PathBuf,

        /// Translation file
        translations: PathBuf,

        /// Input format (guessed from the extension if omitted)
        #[arg(long)]
        format: Option<ExportFormat>,

        /// Keep a .bak copy of the table before overwriting
        #[arg(long)]
        backup: bool,
    },
}
