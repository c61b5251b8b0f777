//! Command-line interface definitions and helpers.

mod args;
mod commands;

pub use args::{Args, Command};
pub use commands::{list_templates, print_full_menu, print_template, run, CliError, Settings};
