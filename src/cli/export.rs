//! Export subcommand for crew-dispatch CLI
//!
//! Writes the task list as CSV, or the full roster as a snapshot file that
//! can be kept as a backup and re-imported.

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// What to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportKind {
    /// Task list as CSV
    Csv,
    /// Full roster as versioned JSON
    Snapshot,
}

/// Arguments for the export subcommand
#[derive(Args, Debug)]
pub struct ExportArgs {
    #[arg(value_enum)]
    pub kind: ExportKind,

    /// Output file path (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Force gzip compression (auto-detected from .gz extension otherwise)
    #[arg(long)]
    pub gzip: bool,
}

impl ExportArgs {
    /// Determine if a snapshot should be compressed based on args and filename
    pub fn should_compress(&self) -> bool {
        if self.kind != ExportKind::Snapshot {
            return false;
        }
        if self.gzip {
            return true;
        }
        self.output
            .as_ref()
            .is_some_and(|path| path.extension().is_some_and(|ext| ext == "gz"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(kind: ExportKind, output: Option<&str>, gzip: bool) -> ExportArgs {
        ExportArgs {
            kind,
            output: output.map(PathBuf::from),
            gzip,
        }
    }

    #[test]
    fn test_should_compress_explicit_flag() {
        assert!(args(ExportKind::Snapshot, None, true).should_compress());
    }

    #[test]
    fn test_should_compress_gz_extension() {
        assert!(args(ExportKind::Snapshot, Some("roster.json.gz"), false).should_compress());
        assert!(!args(ExportKind::Snapshot, Some("roster.json"), false).should_compress());
    }

    #[test]
    fn test_csv_is_never_compressed() {
        assert!(!args(ExportKind::Csv, Some("tasks.csv.gz"), true).should_compress());
    }
}
