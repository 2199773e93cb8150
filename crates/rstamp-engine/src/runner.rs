//! The synchronous one-call entry point.
//!
//! `stamp_raster` runs the whole job in memory: load features and surface,
//! build rings, rasterize the stamp, composite, write the output raster and
//! its provenance sidecar. Library consumers call this directly; the treadle
//! stages run the same steps with an on-disk scratch raster in between.

use std::path::PathBuf;

use uuid::Uuid;

use rstamp_core::geometry::{geojson, FeatureCollection};
use rstamp_core::grid::{ascii, Grid};
use rstamp_core::provenance::StampRecord;
use rstamp_core::ZFunc;

use crate::error::{EngineError, EngineResult};
use crate::job::StampParams;
use crate::rasterize::build_stamp;
use crate::rings::RingSet;
use crate::stamp::apply_stamp;

/// What one run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct StampSummary {
    /// The output raster path.
    pub output: PathBuf,
    /// Cells where the stamp changed the surface.
    pub stamped_cells: usize,
    /// Total cells in the output grid.
    pub total_cells: usize,
    /// Provenance record ID of this run.
    pub record_id: Uuid,
}

/// Load and validate everything a stamp run needs.
pub(crate) fn load_inputs(
    params: &StampParams,
) -> EngineResult<(FeatureCollection, Grid, RingSet)> {
    let z_func = ZFunc::parse(&params.z_func)?;
    let rings = RingSet::build(&params.distances, params.stair_type, &z_func, params.unit)?;

    let features = geojson::read(&params.features)?;
    let surface = ascii::read(&params.surface)?;

    Ok((features, surface, rings))
}

/// Run a complete stamp job.
///
/// # Errors
/// Parameter problems (bad distances, malformed height function) are
/// reported before any raster work; I/O and format errors come from the
/// input paths.
pub fn stamp_raster(params: &StampParams) -> EngineResult<StampSummary> {
    let (features, surface, rings) = load_inputs(params)?;

    log::info!(
        "stamping {} feature(s) onto {} ({}x{} cells)",
        features.len(),
        params.surface.display(),
        surface.ncols(),
        surface.nrows()
    );

    let stamp = build_stamp(
        &surface,
        &features,
        &rings,
        params.cell_assignment,
        params.outside_polygons_only,
    );
    let (out, report) = apply_stamp(&surface, &stamp, params.operation)?;

    ascii::write(&out, &params.output)?;

    let record = StampRecord::new(
        params.features.clone(),
        params.surface.clone(),
        params.output.clone(),
        serde_json::to_value(params).map_err(rstamp_core::Error::from)?,
    );
    record.write_sidecar().map_err(EngineError::Core)?;

    log::info!(
        "wrote {} ({} of {} cells stamped)",
        params.output.display(),
        report.stamped_cells,
        out.values().len()
    );

    Ok(StampSummary {
        output: params.output.clone(),
        stamped_cells: report.stamped_cells,
        total_cells: out.values().len(),
        record_id: record.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use crate::stamp::Operation;

    const SURFACE: &str = "\
ncols        5
nrows        5
xllcorner    0.0
yllcorner    0.0
cellsize     1.0
NODATA_value -9999
100 100 100 100 100
100 100 100 100 100
100 100 100 100 100
100 100 100 100 100
100 100 100 100 100
";

    const POINT: &str = r#"{"type": "Point", "coordinates": [2.5, 2.5]}"#;

    fn write_fixtures(dir: &std::path::Path) -> (PathBuf, PathBuf) {
        let surface = dir.join("dem.asc");
        let features = dir.join("site.geojson");
        std::fs::write(&surface, SURFACE).unwrap();
        std::fs::write(&features, POINT).unwrap();
        (features, surface)
    }

    #[test]
    fn test_stamp_raster_end_to_end() {
        let tmp = TempDir::new().unwrap();
        let (features, surface) = write_fixtures(tmp.path());
        let output = tmp.path().join("out.asc");

        let params = StampParams::new(features, surface, output.clone())
            .with_distances(vec![1.2])
            .with_z_func("50")
            .with_operation(Operation::Subtract);

        let summary = stamp_raster(&params).unwrap();
        assert_eq!(summary.output, output);
        // Center cell plus its 4-neighbourhood.
        assert_eq!(summary.stamped_cells, 5);
        assert_eq!(summary.total_cells, 25);

        let out = ascii::read(&output).unwrap();
        assert_eq!(out.get(2, 2), 50.0);
        assert_eq!(out.get(1, 2), 50.0);
        assert_eq!(out.get(0, 0), 100.0); // beyond the ring: untouched

        let record = StampRecord::read_sidecar(&output).unwrap();
        assert_eq!(record.id, summary.record_id);
        assert_eq!(record.output, output);
    }

    #[test]
    fn test_stamp_raster_rejects_bad_z_func() {
        let tmp = TempDir::new().unwrap();
        let (features, surface) = write_fixtures(tmp.path());

        let params = StampParams::new(features, surface, tmp.path().join("out.asc"))
            .with_distances(vec![1.0])
            .with_z_func("frob(d)");

        assert!(stamp_raster(&params).is_err());
    }

    #[test]
    fn test_stamp_raster_rejects_empty_distances() {
        let tmp = TempDir::new().unwrap();
        let (features, surface) = write_fixtures(tmp.path());

        let params = StampParams::new(features, surface, tmp.path().join("out.asc"))
            .with_z_func("d");

        let err = stamp_raster(&params).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_stamp_raster_missing_surface() {
        let tmp = TempDir::new().unwrap();
        let features = tmp.path().join("site.geojson");
        std::fs::write(&features, POINT).unwrap();

        let params = StampParams::new(
            features,
            tmp.path().join("missing.asc"),
            tmp.path().join("out.asc"),
        )
        .with_distances(vec![1.0])
        .with_z_func("d");

        assert!(stamp_raster(&params).is_err());
    }
}
