//! Ring construction: distances plus a height function become a stair of
//! (outer distance, z value) rings.
//!
//! Each ring gets one z value, `f(di)`, where `di` depends on the stair
//! type: the ring's inner edge, its outer edge, or the midpoint between
//! them. The first ring's inner edge is distance zero.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use rstamp_core::ZFunc;

use crate::error::{EngineError, EngineResult};
use crate::units::BufferUnit;

/// Where in each ring the height function is evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StairType {
    #[default]
    Centre,
    Inside,
    Outside,
}

impl fmt::Display for StairType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Centre => "centre",
            Self::Inside => "inside",
            Self::Outside => "outside",
        };
        f.write_str(name)
    }
}

impl FromStr for StairType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "centre" | "center" => Ok(Self::Centre),
            "inside" => Ok(Self::Inside),
            "outside" => Ok(Self::Outside),
            _ => Err(EngineError::InvalidParameter {
                name: "stair_type",
                message: format!("invalid value {s:?}; valid values are CENTRE, INSIDE and OUTSIDE"),
            }),
        }
    }
}

/// One ring of the stamp: everything within `outer` map units of a feature
/// (and beyond the previous ring) takes the value `z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ring {
    /// Outer edge, in map units.
    pub outer: f64,
    /// Height value for the whole ring.
    pub z: f64,
}

/// The full stair of rings, sorted by outer distance.
#[derive(Debug, Clone, PartialEq)]
pub struct RingSet {
    rings: Vec<Ring>,
}

impl RingSet {
    /// Build rings from user distances and a height function.
    ///
    /// Distances may arrive in any order; they are sorted ascending. The
    /// height function is evaluated in the user's unit (so `f(d)` reads the
    /// same as the distances the user typed), while ring edges are stored in
    /// map units.
    ///
    /// # Errors
    /// Rejects an empty list, non-finite or non-positive distances,
    /// duplicates, and height values that do not evaluate to a finite number.
    pub fn build(
        distances: &[f64],
        stair_type: StairType,
        z_func: &ZFunc,
        unit: BufferUnit,
    ) -> EngineResult<Self> {
        if distances.is_empty() {
            return Err(EngineError::InvalidParameter {
                name: "distances",
                message: "at least one ring distance is required".into(),
            });
        }

        let mut sorted = distances.to_vec();
        for &d in &sorted {
            if !(d.is_finite() && d > 0.0) {
                return Err(EngineError::InvalidParameter {
                    name: "distances",
                    message: format!("ring distances must be finite and positive, got {d}"),
                });
            }
        }
        sorted.sort_by(|a, b| a.total_cmp(b));
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            return Err(EngineError::InvalidParameter {
                name: "distances",
                message: "ring distances must be unique".into(),
            });
        }

        let mut rings = Vec::with_capacity(sorted.len());
        let mut previous = 0.0;
        for distance in sorted {
            let di = match stair_type {
                StairType::Centre => previous + (distance - previous) / 2.0,
                StairType::Inside => previous,
                StairType::Outside => distance,
            };
            let z = z_func.eval(di);
            if !z.is_finite() {
                return Err(EngineError::InvalidParameter {
                    name: "z_func",
                    message: format!("{z_func} evaluates to {z} at d = {di}"),
                });
            }
            rings.push(Ring {
                outer: unit.to_map_units(distance),
                z,
            });
            previous = distance;
        }

        Ok(Self { rings })
    }

    /// The z value at distance `d` (map units), or `None` beyond the
    /// outermost ring. Ring upper bounds are closed: `d` exactly on a ring's
    /// outer edge belongs to that ring.
    #[must_use]
    pub fn classify(&self, d: f64) -> Option<f64> {
        self.classify_index(d).map(|i| self.rings[i].z)
    }

    /// Like [`classify`](Self::classify), returning the ring index.
    #[must_use]
    pub fn classify_index(&self, d: f64) -> Option<usize> {
        self.rings.iter().position(|r| d <= r.outer)
    }

    #[must_use]
    pub fn ring(&self, index: usize) -> Ring {
        self.rings[index]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// Outer edge of the outermost ring, in map units.
    #[must_use]
    pub fn max_distance(&self) -> f64 {
        self.rings.last().map_or(0.0, |r| r.outer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zf(src: &str) -> ZFunc {
        ZFunc::parse(src).unwrap()
    }

    fn z_values(rings: &RingSet) -> Vec<f64> {
        (0..rings.len()).map(|i| rings.ring(i).z).collect()
    }

    #[test]
    fn test_stair_inside() {
        let rings =
            RingSet::build(&[10.0, 20.0], StairType::Inside, &zf("d"), BufferUnit::MapUnits)
                .unwrap();
        assert_eq!(z_values(&rings), vec![0.0, 10.0]);
    }

    #[test]
    fn test_stair_outside() {
        let rings =
            RingSet::build(&[10.0, 20.0], StairType::Outside, &zf("d"), BufferUnit::MapUnits)
                .unwrap();
        assert_eq!(z_values(&rings), vec![10.0, 20.0]);
    }

    #[test]
    fn test_stair_centre() {
        let rings =
            RingSet::build(&[10.0, 20.0], StairType::Centre, &zf("d"), BufferUnit::MapUnits)
                .unwrap();
        assert_eq!(z_values(&rings), vec![5.0, 15.0]);
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let rings = RingSet::build(
            &[20.0, 10.0],
            StairType::Outside,
            &zf("d"),
            BufferUnit::MapUnits,
        )
        .unwrap();
        assert_eq!(z_values(&rings), vec![10.0, 20.0]);
        assert_eq!(rings.max_distance(), 20.0);
    }

    #[test]
    fn test_unit_conversion_scales_edges_not_heights() {
        // f(d) is evaluated in the user's unit; edges land in map units.
        let rings = RingSet::build(
            &[1.0, 2.0],
            StairType::Outside,
            &zf("d * 100"),
            BufferUnit::Kilometers,
        )
        .unwrap();
        assert_eq!(rings.ring(0).outer, 1000.0);
        assert_eq!(rings.ring(1).outer, 2000.0);
        assert_eq!(z_values(&rings), vec![100.0, 200.0]);
    }

    #[test]
    fn test_classify_boundaries() {
        let rings = RingSet::build(
            &[10.0, 20.0],
            StairType::Outside,
            &zf("d"),
            BufferUnit::MapUnits,
        )
        .unwrap();
        assert_eq!(rings.classify(0.0), Some(10.0));
        assert_eq!(rings.classify(10.0), Some(10.0)); // closed upper bound
        assert_eq!(rings.classify(10.001), Some(20.0));
        assert_eq!(rings.classify(20.0), Some(20.0));
        assert_eq!(rings.classify(20.001), None);
    }

    #[test]
    fn test_rejects_bad_distances() {
        let z = zf("d");
        assert!(RingSet::build(&[], StairType::Centre, &z, BufferUnit::MapUnits).is_err());
        assert!(RingSet::build(&[-5.0], StairType::Centre, &z, BufferUnit::MapUnits).is_err());
        assert!(RingSet::build(&[0.0], StairType::Centre, &z, BufferUnit::MapUnits).is_err());
        assert!(
            RingSet::build(&[10.0, 10.0], StairType::Centre, &z, BufferUnit::MapUnits).is_err()
        );
        assert!(
            RingSet::build(&[f64::INFINITY], StairType::Centre, &z, BufferUnit::MapUnits).is_err()
        );
    }

    #[test]
    fn test_rejects_nonfinite_z() {
        // 1/d at the inner edge of the first ring divides by zero
        let err = RingSet::build(
            &[10.0],
            StairType::Inside,
            &zf("1 / d"),
            BufferUnit::MapUnits,
        )
        .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_stair_type_from_str() {
        assert_eq!("CENTRE".parse::<StairType>().unwrap(), StairType::Centre);
        assert_eq!("center".parse::<StairType>().unwrap(), StairType::Centre);
        assert_eq!("INSIDE".parse::<StairType>().unwrap(), StairType::Inside);
        assert!("diagonal".parse::<StairType>().is_err());
    }
}
