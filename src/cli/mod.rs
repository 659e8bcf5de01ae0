//! Terminal front end: argument parsing, command execution and table rendering.
//! `src/bin/kmt.rs` is a thin wrapper around `commands::run`.

pub mod args;
pub mod commands;
pub mod table;

pub use args::{Cli, Command};
pub use commands::{execute, run, Context};
pub use table::render_table;
