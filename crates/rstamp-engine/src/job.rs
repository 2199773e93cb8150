//! The stamp job: the full parameter set plus its treadle work item.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use treadle::WorkItem;
use uuid::Uuid;

use crate::rasterize::CellAssignment;
use crate::rings::StairType;
use crate::stamp::Operation;
use crate::units::BufferUnit;

/// Everything one stamping run needs.
///
/// Mirrors the parameter list of the classic `raster_stamp` tool: features,
/// surface, output, ring distances, height function, stair type, distance
/// unit, composite operation, cell assignment, and whether polygon interiors
/// are left unstamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampParams {
    /// Input feature file (GeoJSON).
    pub features: PathBuf,
    /// Input surface raster (.asc).
    pub surface: PathBuf,
    /// Output raster (.asc).
    pub output: PathBuf,
    /// Ring distances, in `unit`.
    pub distances: Vec<f64>,
    /// Height function source, e.g. `"100 / (d + 1)"`.
    pub z_func: String,
    #[serde(default)]
    pub stair_type: StairType,
    #[serde(default)]
    pub unit: BufferUnit,
    #[serde(default)]
    pub operation: Operation,
    #[serde(default)]
    pub cell_assignment: CellAssignment,
    /// Leave polygon interiors unstamped (buffers outside only).
    #[serde(default)]
    pub outside_polygons_only: bool,
}

impl StampParams {
    /// Parameters with defaults for everything beyond the three paths.
    /// Distances and the height function still have to be supplied before
    /// the job can run.
    #[must_use]
    pub fn new(
        features: impl Into<PathBuf>,
        surface: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            features: features.into(),
            surface: surface.into(),
            output: output.into(),
            distances: Vec::new(),
            z_func: String::new(),
            stair_type: StairType::default(),
            unit: BufferUnit::default(),
            operation: Operation::default(),
            cell_assignment: CellAssignment::default(),
            outside_polygons_only: false,
        }
    }

    #[must_use]
    pub fn with_distances(mut self, distances: Vec<f64>) -> Self {
        self.distances = distances;
        self
    }

    #[must_use]
    pub fn with_z_func(mut self, z_func: impl Into<String>) -> Self {
        self.z_func = z_func.into();
        self
    }

    #[must_use]
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    #[must_use]
    pub fn with_stair_type(mut self, stair_type: StairType) -> Self {
        self.stair_type = stair_type;
        self
    }

    #[must_use]
    pub fn with_unit(mut self, unit: BufferUnit) -> Self {
        self.unit = unit;
        self
    }

    #[must_use]
    pub fn with_cell_assignment(mut self, cell_assignment: CellAssignment) -> Self {
        self.cell_assignment = cell_assignment;
        self
    }

    #[must_use]
    pub fn with_outside_polygons_only(mut self, outside: bool) -> Self {
        self.outside_polygons_only = outside;
        self
    }
}

/// A stamping run flowing through the rasterize → stamp pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StampJob {
    id: String,
    /// Output raster path, for display.
    pub output: PathBuf,
}

impl StampJob {
    #[must_use]
    pub fn new(params: &StampParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            output: params.output.clone(),
        }
    }
}

impl WorkItem for StampJob {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for StampJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.output.display())
    }
}
