//! Export/Import of roster data.
//!
//! Two outputs are supported:
//! - CSV of the task list, the user-facing download
//! - Snapshot files: the full roster wrapped with version metadata, as
//!   pretty JSON or gzip-compressed JSON, for backup and re-import

pub mod csv;

use crate::types::WorkerManagementData;
use anyhow::{Context, Result, bail};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Version of the persisted roster shape.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Snapshot file format version (semver).
pub const EXPORT_VERSION: &str = "1.0.0";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A roster export with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub schema_version: i32,

    /// Export format version (semver)
    pub export_version: String,

    /// ISO 8601 timestamp of export
    pub exported_at: String,

    /// Tool name and version that created this export
    pub exported_by: String,

    pub data: WorkerManagementData,
}

impl Snapshot {
    /// Wrap roster data with current metadata.
    pub fn new(data: WorkerManagementData) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            export_version: EXPORT_VERSION.to_string(),
            exported_at: chrono::Utc::now().to_rfc3339(),
            exported_by: format!("crew-dispatch v{}", env!("CARGO_PKG_VERSION")),
            data,
        }
    }

    /// Load a snapshot from a file (supports both plain JSON and gzip).
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let mut reader = BufReader::new(file);

        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let snapshot: Snapshot = if bytes.starts_with(&GZIP_MAGIC) {
            serde_json::from_reader(GzDecoder::new(bytes.as_slice()))?
        } else {
            serde_json::from_slice(&bytes)?
        };

        if !snapshot.is_schema_compatible() {
            bail!(
                "snapshot schema version {} is not supported (expected {})",
                snapshot.schema_version,
                CURRENT_SCHEMA_VERSION
            );
        }
        Ok(snapshot)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write to `path`, gzip-compressed when `gzip` is set.
    pub fn write_to_file(&self, path: &Path, gzip: bool) -> Result<()> {
        let json = self.to_json_pretty()?;
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        if gzip {
            let mut encoder = GzEncoder::new(writer, Compression::default());
            encoder.write_all(json.as_bytes())?;
            encoder.finish()?.flush()?;
        } else {
            writer.write_all(json.as_bytes())?;
            writer.flush()?;
        }
        Ok(())
    }

    pub fn is_schema_compatible(&self) -> bool {
        self.schema_version == CURRENT_SCHEMA_VERSION
    }
}
