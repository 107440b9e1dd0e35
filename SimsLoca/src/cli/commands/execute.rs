//! Command execution implementations

use super::Commands;
use super::definitions::{PackageCommands, StblCommands};
use super::{package, stbl};

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Package { command } => command.execute(),
            Commands::Stbl { command } => command.execute(),
        }
    }
}

impl PackageCommands {
    /// Execute the selected package command.
    ///
    /// # Errors
    /// Returns an error if the package cannot be read or written.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            PackageCommands::Info { path } => package::info(path),
            PackageCommands::List {
                path,
                stbl_only,
                json,
            } => package::list(path, *stbl_only, *json),
            PackageCommands::Export {
                path,
                output,
                format,
            } => package::export(path, output.as_deref(), *format),
            PackageCommands::Import {
                path,
                translations,
                output,
                format,
                level,
                all,
                backup,
            } => package::import(
                path,
                translations,
                output.as_deref(),
                *format,
                *level,
                *all,
                *backup,
            ),
        }
    }
}

impl StblCommands {
    /// Execute the selected STBL command.
    ///
    /// # Errors
    /// Returns an error if the table cannot be read or written.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            StblCommands::Search { path, query, limit } => stbl::search(path, query, *limit),
            StblCommands::Get { path, key } => stbl::get(path, key),
            StblCommands::Set {
                path,
                key,
                text,
                create,
            } => stbl::set(path, key, text, *create),
            StblCommands::Export {
                path,
                output,
                format,
            } => stbl::export(path, output.as_deref(), *format),
            StblCommands::Import {
                path,
                translations,
                format,
                backup,
            } => stbl::import(path, translations, *format, *backup),
        }
    }
}
