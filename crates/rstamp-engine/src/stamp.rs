//! Compositing: apply the stamp raster onto the surface.
//!
//! Cell rules, in order: surface nodata stays nodata; stamp nodata leaves
//! the surface value untouched; otherwise `surface OP stamp`. A divide by a
//! zero stamp value (or any non-finite result) becomes nodata.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use treadle::{Stage, StageContext, StageOutcome};

use rstamp_core::grid::{ascii, Grid};
use rstamp_core::provenance::StampRecord;

use crate::error::{EngineError, EngineResult};
use crate::job::StampParams;

/// How the stamp is combined with the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    #[default]
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    /// Combine one surface cell with one stamp cell. `None` means the result
    /// is not representable (division by zero, overflow) and becomes nodata.
    #[must_use]
    pub fn apply(self, surface: f64, stamp: f64) -> Option<f64> {
        let result = match self {
            Self::Add => surface + stamp,
            Self::Subtract => surface - stamp,
            Self::Multiply => surface * stamp,
            Self::Divide => {
                if stamp == 0.0 {
                    return None;
                }
                surface / stamp
            }
        };
        result.is_finite().then_some(result)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
        };
        f.write_str(name)
    }
}

impl FromStr for Operation {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "subtract" => Ok(Self::Subtract),
            "multiply" => Ok(Self::Multiply),
            "divide" => Ok(Self::Divide),
            _ => Err(EngineError::InvalidParameter {
                name: "operation",
                message: format!(
                    "unknown operation {s:?}; valid values are ADD, SUBTRACT, \
                     MULTIPLY and DIVIDE"
                ),
            }),
        }
    }
}

/// Counts from one compositing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Cells where the stamp changed the surface.
    pub stamped_cells: usize,
    /// Stamped cells lost to division by zero or overflow.
    pub unrepresentable_cells: usize,
}

/// Composite the stamp onto the surface.
///
/// # Errors
/// The two grids must share dimensions, origin, and cell size.
pub fn apply_stamp(
    surface: &Grid,
    stamp: &Grid,
    operation: Operation,
) -> EngineResult<(Grid, ApplyReport)> {
    if !surface.same_gridding(stamp) {
        return Err(EngineError::GridMismatch(format!(
            "stamp gridding {}x{} @ {} does not match surface {}x{} @ {}",
            stamp.ncols(),
            stamp.nrows(),
            stamp.cellsize(),
            surface.ncols(),
            surface.nrows(),
            surface.cellsize()
        )));
    }

    let mut out = surface.filled_like();
    let mut report = ApplyReport::default();

    for row in 0..surface.nrows() {
        for col in 0..surface.ncols() {
            let s = surface.get(row, col);
            if surface.is_nodata(s) {
                continue; // stays nodata
            }
            let z = stamp.get(row, col);
            if stamp.is_nodata(z) {
                out.set(row, col, s);
                continue;
            }
            match operation.apply(s, z) {
                Some(v) => {
                    out.set(row, col, v);
                    report.stamped_cells += 1;
                }
                None => {
                    report.unrepresentable_cells += 1;
                }
            }
        }
    }

    if report.unrepresentable_cells > 0 {
        log::warn!(
            "{} stamped cell(s) set to nodata ({} by zero or overflow)",
            report.unrepresentable_cells,
            operation
        );
    }

    Ok((out, report))
}

/// The Stamp stage: composite the scratch stamp raster onto the surface,
/// write the output and its provenance sidecar, and clean up the scratch
/// file whether or not compositing succeeded.
#[derive(Debug)]
pub struct StampStage {
    params: StampParams,
    scratch: PathBuf,
}

impl StampStage {
    #[must_use]
    pub fn new(params: StampParams, scratch: PathBuf) -> Self {
        Self { params, scratch }
    }

    fn composite(&self) -> EngineResult<ApplyReport> {
        let surface = ascii::read(&self.params.surface)?;
        let stamp = ascii::read(&self.scratch)?;

        let (out, report) = apply_stamp(&surface, &stamp, self.params.operation)?;
        ascii::write(&out, &self.params.output)?;

        let record = StampRecord::new(
            self.params.features.clone(),
            self.params.surface.clone(),
            self.params.output.clone(),
            serde_json::to_value(&self.params).map_err(rstamp_core::Error::from)?,
        );
        record.write_sidecar().map_err(EngineError::Core)?;

        Ok(report)
    }
}

#[async_trait::async_trait]
impl Stage for StampStage {
    fn name(&self) -> &str {
        "stamp"
    }

    async fn execute(
        &self,
        _item: &dyn treadle::WorkItem,
        _context: &mut StageContext,
    ) -> treadle::Result<StageOutcome> {
        tracing::info!("Stamping onto {}", self.params.surface.display());

        let result = self.composite();

        // Scratch cleanup runs on failure too, so old stamps don't linger.
        if let Err(e) = std::fs::remove_file(&self.scratch) {
            log::debug!(
                "could not remove scratch raster {}: {}",
                self.scratch.display(),
                e
            );
        }

        match result {
            Ok(report) => {
                tracing::info!(
                    "Stamp complete: {} cells changed, output {}",
                    report.stamped_cells,
                    self.params.output.display()
                );
                Ok(StageOutcome::Complete)
            }
            Err(e) => Err(treadle::TreadleError::StageExecution(format!(
                "Stamp failed: {e}"
            ))),
        }
    }
}
