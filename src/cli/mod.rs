//! CLI module for docpatch
//!
//! Provides command-line interface for:
//! - rules: Print the rule tables derived from a schema
//! - validate: Validate operations against a schema
//! - compile: Compile operations into update stages

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{compile, rules, rules_json, run, run_command, validate, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_operations, read_operations, write_error, write_json};
