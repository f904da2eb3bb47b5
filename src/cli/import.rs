//! Import subcommand for crew-dispatch CLI
//!
//! Replaces the roster with the data in a snapshot file. Plain and
//! gzip-compressed JSON are both accepted.

use clap::Args;
use std::path::PathBuf;

/// Arguments for the import subcommand
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Input file path (JSON or .json.gz)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Validate and report what would be imported without writing
    #[arg(long)]
    pub dry_run: bool,
}
