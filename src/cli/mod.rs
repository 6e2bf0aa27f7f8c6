//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{Args, CacheAction, Command, ConfigAction, DisplayArgs};
pub use commands::{format_size, run};
pub use enums::Style;
