//! Provenance records for stamped outputs.
//!
//! Every output raster gets a JSON sidecar describing the inputs and the
//! full parameter set that produced it, so a stamped surface can always be
//! traced back to (and reproduced from) its sources.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// A record of one stamping run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampRecord {
    /// Unique ID of this run.
    pub id: Uuid,

    /// When the output was produced.
    pub created_at: DateTime<Utc>,

    /// Version of the tool that produced it.
    pub tool_version: String,

    /// Input feature file.
    pub features: PathBuf,

    /// Input surface raster.
    pub surface: PathBuf,

    /// Output raster.
    pub output: PathBuf,

    /// The full parameter set, serialized by the caller.
    pub parameters: serde_json::Value,
}

impl StampRecord {
    #[must_use]
    pub fn new(
        features: PathBuf,
        surface: PathBuf,
        output: PathBuf,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            features,
            surface,
            output,
            parameters,
        }
    }

    /// Sidecar path for an output raster: `<output>.provenance.json`.
    #[must_use]
    pub fn sidecar_path(output: &Path) -> PathBuf {
        let mut name = output.as_os_str().to_os_string();
        name.push(".provenance.json");
        PathBuf::from(name)
    }

    /// Write this record next to its output raster.
    pub fn write_sidecar(&self) -> Result<()> {
        let path = Self::sidecar_path(&self.output);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a record from an output raster's sidecar.
    pub fn read_sidecar(output: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(Self::sidecar_path(output))?;
        Ok(serde_json::from_str(&text)?)
    }
}
