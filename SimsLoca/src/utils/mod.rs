//! Utility functions

pub mod fs;

pub use fs::{backup_path, write_atomic};
