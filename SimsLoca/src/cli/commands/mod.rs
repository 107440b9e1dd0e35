use clap::Subcommand;

pub mod definitions;
mod execute;
pub mod package;
pub mod stbl;

use definitions::{PackageCommands, StblCommands};

#[derive(Subcommand)]
pub enum Commands {
    /// DBPF package operations
    Package {
        #[command(subcommand)]
        command: PackageCommands,
    },

    /// Standalone .stbl string table operations
    Stbl {
        #[command(subcommand)]
        command: StblCommands,
    },
}
