//! Stamp rasterization: classify every cell of the surface gridding into a
//! ring (or none) and write the ring's z value.
//!
//! The stamp grid always has the surface's exact origin, cell size, and
//! dimensions, so compositing later is a straight cell-for-cell walk.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use treadle::{Stage, StageContext, StageOutcome};

use rstamp_core::geometry::FeatureCollection;
use rstamp_core::grid::{ascii, Grid};
use rstamp_core::Coord;

use crate::error::{EngineError, EngineResult};
use crate::job::StampParams;
use crate::rings::RingSet;
use crate::runner::load_inputs;

/// Subsamples per axis for the maximum-area vote.
const SUPERSAMPLE: usize = 4;

/// How a cell decides which ring it belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellAssignment {
    /// Sample the cell center only.
    #[default]
    CellCenter,
    /// Majority vote over a 4x4 subsample of the cell; ties go to the
    /// inner ring.
    MaximumArea,
}

impl fmt::Display for CellAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CellCenter => "cell-center",
            Self::MaximumArea => "maximum-area",
        };
        f.write_str(name)
    }
}

impl FromStr for CellAssignment {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "cell_center" | "cellcenter" => Ok(Self::CellCenter),
            // MAXIMUM_COMBINED_AREA only differs when overlapping polygons
            // carry different attributes; ring values are distance-determined
            // here, so it collapses into MAXIMUM_AREA.
            "maximum_area" | "maximum_combined_area" => Ok(Self::MaximumArea),
            _ => Err(EngineError::InvalidParameter {
                name: "cell_assignment",
                message: format!(
                    "unknown value {s:?}; valid values are CELL_CENTER, \
                     MAXIMUM_AREA and MAXIMUM_COMBINED_AREA"
                ),
            }),
        }
    }
}

/// Ring index for one sample point, or `None` when unstamped.
fn sample(
    features: &FeatureCollection,
    rings: &RingSet,
    outside_polygons_only: bool,
    p: Coord,
) -> Option<usize> {
    if outside_polygons_only && features.contains(p) {
        return None;
    }
    rings.classify_index(features.distance_to(p))
}

/// Majority vote over the cell's subsamples; ties prefer the inner ring,
/// and a stamped ring beats "unstamped" on equal votes.
fn vote(samples: impl Iterator<Item = Option<usize>>) -> Option<usize> {
    let mut counts: Vec<(Option<usize>, usize)> = Vec::new();
    for s in samples {
        match counts.iter_mut().find(|(ring, _)| *ring == s) {
            Some((_, count)) => *count += 1,
            None => counts.push((s, 1)),
        }
    }

    let mut best: (Option<usize>, usize) = (None, 0);
    for &(ring, count) in &counts {
        let wins = count > best.1
            || (count == best.1
                && match (ring, best.0) {
                    (Some(a), Some(b)) => a < b,
                    (Some(_), None) => true,
                    _ => false,
                });
        if wins {
            best = (ring, count);
        }
    }
    best.0
}

/// Build the stamp raster on the surface's gridding.
///
/// Cells beyond the outermost ring stay nodata. An empty feature collection
/// yields an all-nodata stamp (the output will equal the surface) and logs a
/// warning rather than failing.
#[must_use]
pub fn build_stamp(
    surface: &Grid,
    features: &FeatureCollection,
    rings: &RingSet,
    assignment: CellAssignment,
    outside_polygons_only: bool,
) -> Grid {
    let mut stamp = surface.filled_like();

    if features.is_empty() {
        log::warn!("no input features; stamp raster is empty");
        return stamp;
    }

    let cellsize = surface.cellsize();
    for row in 0..surface.nrows() {
        for col in 0..surface.ncols() {
            let ring = match assignment {
                CellAssignment::CellCenter => {
                    let (x, y) = surface.cell_center(row, col);
                    sample(features, rings, outside_polygons_only, Coord::new(x, y))
                }
                CellAssignment::MaximumArea => {
                    let x0 = surface.xll() + col as f64 * cellsize;
                    let y1 = surface.yll() + (surface.nrows() - row) as f64 * cellsize;
                    let step = cellsize / SUPERSAMPLE as f64;
                    vote((0..SUPERSAMPLE * SUPERSAMPLE).map(|i| {
                        let sx = i % SUPERSAMPLE;
                        let sy = i / SUPERSAMPLE;
                        let p = Coord::new(
                            x0 + (sx as f64 + 0.5) * step,
                            y1 - (sy as f64 + 0.5) * step,
                        );
                        sample(features, rings, outside_polygons_only, p)
                    }))
                }
            };

            if let Some(index) = ring {
                stamp.set(row, col, rings.ring(index).z);
            }
        }
    }

    stamp
}

/// The Rasterize stage: build the stamp raster and park it at the job's
/// scratch path for the stamp stage.
#[derive(Debug)]
pub struct RasterizeStage {
    params: StampParams,
    scratch: PathBuf,
}

impl RasterizeStage {
    #[must_use]
    pub fn new(params: StampParams, scratch: PathBuf) -> Self {
        Self { params, scratch }
    }

    fn rasterize(&self) -> EngineResult<usize> {
        let (features, surface, rings) = load_inputs(&self.params)?;

        log::debug!(
            "rasterizing {} feature(s) into {} ring(s) on a {}x{} grid",
            features.len(),
            rings.len(),
            surface.ncols(),
            surface.nrows()
        );

        let stamp = build_stamp(
            &surface,
            &features,
            &rings,
            self.params.cell_assignment,
            self.params.outside_polygons_only,
        );

        let stamped = stamp
            .values()
            .iter()
            .filter(|&&v| !stamp.is_nodata(v))
            .count();

        ascii::write(&stamp, &self.scratch)?;
        Ok(stamped)
    }
}

#[async_trait::async_trait]
impl Stage for RasterizeStage {
    fn name(&self) -> &str {
        "rasterize"
    }

    async fn execute(
        &self,
        _item: &dyn treadle::WorkItem,
        _context: &mut StageContext,
    ) -> treadle::Result<StageOutcome> {
        tracing::info!(
            "Rasterizing stamp for {} onto the gridding of {}",
            self.params.features.display(),
            self.params.surface.display()
        );

        match self.rasterize() {
            Ok(stamped) => {
                tracing::info!("Rasterize complete: {} cells stamped", stamped);
                Ok(StageOutcome::Complete)
            }
            Err(e) => Err(treadle::TreadleError::StageExecution(format!(
                "Rasterize failed: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstamp_core::geometry::{Feature, Geometry};
    use rstamp_core::ZFunc;

    use crate::rings::StairType;
    use crate::units::BufferUnit;

    fn surface_5x5() -> Grid {
        // cellsize 1, origin (0,0); cell centers at 0.5 .. 4.5
        let mut g = Grid::new(5, 5, 0.0, 0.0, 1.0, -9999.0).unwrap();
        for row in 0..5 {
            for col in 0..5 {
                g.set(row, col, 0.0);
            }
        }
        g
    }

    fn rings(distances: &[f64], z: &str) -> RingSet {
        RingSet::build(
            distances,
            StairType::Outside,
            &ZFunc::parse(z).unwrap(),
            BufferUnit::MapUnits,
        )
        .unwrap()
    }

    #[test]
    fn test_point_stamp_cell_center() {
        let surface = surface_5x5();
        let features = FeatureCollection::new(vec![Feature::new(Geometry::Point(Coord::new(
            2.5, 2.5,
        )))]);
        let rings = rings(&[1.2], "7");

        let stamp = build_stamp(
            &surface,
            &features,
            &rings,
            CellAssignment::CellCenter,
            false,
        );

        // Center cell plus the 4-neighbourhood (distance 1.0 <= 1.2); the
        // diagonal neighbours are sqrt(2) away and stay nodata.
        assert_eq!(stamp.get(2, 2), 7.0);
        assert_eq!(stamp.get(1, 2), 7.0);
        assert_eq!(stamp.get(2, 1), 7.0);
        assert!(stamp.is_nodata(stamp.get(1, 1)));
        assert!(stamp.is_nodata(stamp.get(0, 0)));
    }

    #[test]
    fn test_two_ring_stamp() {
        let surface = surface_5x5();
        let features = FeatureCollection::new(vec![Feature::new(Geometry::Point(Coord::new(
            2.5, 2.5,
        )))]);
        let rings = rings(&[1.2, 2.5], "d * 10");

        let stamp = build_stamp(
            &surface,
            &features,
            &rings,
            CellAssignment::CellCenter,
            false,
        );

        assert_eq!(stamp.get(2, 2), 12.0); // inner ring
        assert_eq!(stamp.get(1, 1), 25.0); // sqrt(2) away: outer ring
        assert_eq!(stamp.get(2, 0), 25.0); // 2.0 away: outer ring
        assert!(stamp.is_nodata(stamp.get(0, 0))); // 2*sqrt(2) > 2.5
    }

    #[test]
    fn test_polygon_interior_stamped_by_default() {
        let surface = surface_5x5();
        let square = Geometry::Polygon(vec![vec![
            Coord::new(0.0, 0.0),
            Coord::new(3.0, 0.0),
            Coord::new(3.0, 3.0),
            Coord::new(0.0, 3.0),
            Coord::new(0.0, 0.0),
        ]]);
        let features = FeatureCollection::new(vec![Feature::new(square)]);
        let rings = rings(&[1.0], "5");

        let stamp = build_stamp(
            &surface,
            &features,
            &rings,
            CellAssignment::CellCenter,
            false,
        );
        // Interior cell (row 3, col 1) has distance 0: ring 1.
        assert_eq!(stamp.get(3, 1), 5.0);

        let stamp_outside = build_stamp(
            &surface,
            &features,
            &rings,
            CellAssignment::CellCenter,
            true,
        );
        // outside_polygons_only leaves the interior alone...
        assert!(stamp_outside.is_nodata(stamp_outside.get(3, 1)));
        // ...but still stamps within 1.0 outside the boundary.
        assert_eq!(stamp_outside.get(1, 3), 5.0);
    }

    #[test]
    fn test_empty_features_yield_empty_stamp() {
        let surface = surface_5x5();
        let rings = rings(&[1.0], "5");
        let stamp = build_stamp(
            &surface,
            &FeatureCollection::default(),
            &rings,
            CellAssignment::CellCenter,
            false,
        );
        assert!(stamp.values().iter().all(|&v| stamp.is_nodata(v)));
    }

    #[test]
    fn test_maximum_area_majority() {
        // Half-plane polygon covering x < 2.75: the cell spanning x in [2,3]
        // is 75% covered, so maximum-area stamps it while cell-center
        // sampling (x = 2.5, inside) agrees; the cell at [3,4] is 0% covered
        // and stays nodata either way. The interesting cell is [2,3] with a
        // boundary at 2.25: 25% covered, center inside the first ring but
        // the majority of subsamples beyond it.
        let strip = Geometry::Polygon(vec![vec![
            Coord::new(-10.0, -10.0),
            Coord::new(2.25, -10.0),
            Coord::new(2.25, 10.0),
            Coord::new(-10.0, 10.0),
            Coord::new(-10.0, -10.0),
        ]]);
        let features = FeatureCollection::new(vec![Feature::new(strip)]);
        let surface = surface_5x5();
        let rings = rings(&[0.1], "9");

        let center = build_stamp(
            &surface,
            &features,
            &rings,
            CellAssignment::CellCenter,
            false,
        );
        let area = build_stamp(
            &surface,
            &features,
            &rings,
            CellAssignment::MaximumArea,
            false,
        );

        // Cell col 2 spans x in [2.0, 3.0]; center x = 2.5 is outside the
        // polygon and more than 0.1 away, so cell-center leaves it nodata.
        assert!(center.is_nodata(center.get(0, 2)));
        // Subsample xs are 2.125, 2.375, 2.625, 2.875: only the first is
        // inside/near, so maximum-area also leaves it nodata.
        assert!(area.is_nodata(area.get(0, 2)));
        // Fully covered columns are stamped under both assignments.
        assert_eq!(center.get(0, 1), 9.0);
        assert_eq!(area.get(0, 1), 9.0);
    }

    #[test]
    fn test_vote_tie_prefers_inner_ring() {
        let samples = vec![Some(1), Some(0), Some(1), Some(0)];
        assert_eq!(vote(samples.into_iter()), Some(0));

        let samples = vec![None, Some(2), None, Some(2)];
        assert_eq!(vote(samples.into_iter()), Some(2));

        let samples = vec![None, None, None, Some(2)];
        assert_eq!(vote(samples.into_iter()), None);
    }

    #[test]
    fn test_cell_assignment_from_str() {
        assert_eq!(
            "CELL_CENTER".parse::<CellAssignment>().unwrap(),
            CellAssignment::CellCenter
        );
        assert_eq!(
            "maximum-area".parse::<CellAssignment>().unwrap(),
            CellAssignment::MaximumArea
        );
        assert_eq!(
            "MAXIMUM_COMBINED_AREA".parse::<CellAssignment>().unwrap(),
            CellAssignment::MaximumArea
        );
        assert!("nearest".parse::<CellAssignment>().is_err());
    }
}
