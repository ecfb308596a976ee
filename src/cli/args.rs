//! CLI argument definitions using clap
//!
//! Commands:
//! - docpatch rules --config <path>
//! - docpatch validate --config <path> [--input <file>]
//! - docpatch compile --config <path> [--input <file>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docpatch - validate patch operations and compile them into update pipelines
#[derive(Parser, Debug)]
#[command(name = "docpatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the rule tables derived from the schema
    Rules {
        /// Path to configuration file
        #[arg(long, default_value = "./docpatch.json")]
        config: PathBuf,
    },

    /// Validate a JSON array of operations against the schema
    Validate {
        /// Path to configuration file
        #[arg(long, default_value = "./docpatch.json")]
        config: PathBuf,

        /// Operations file; stdin when absent
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Compile a JSON array of operations into update stages
    Compile {
        /// Path to configuration file
        #[arg(long, default_value = "./docpatch.json")]
        config: PathBuf,

        /// Operations file; stdin when absent
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
