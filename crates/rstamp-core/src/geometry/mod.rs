//! Vector geometry model.
//!
//! Deliberately small: just enough 2D geometry to measure distances from
//! grid cells to stamp features. Coordinates are in map units; any extra
//! dimensions in the source data are dropped on ingest.

pub mod distance;
pub mod geojson;

use serde::{Deserialize, Serialize};

use crate::grid::Extent;

/// A 2D map coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A geometry in the GeoJSON taxonomy, minus GeometryCollection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Point(Coord),
    MultiPoint(Vec<Coord>),
    LineString(Vec<Coord>),
    MultiLineString(Vec<Vec<Coord>>),
    /// First ring is the exterior; any further rings are holes.
    Polygon(Vec<Vec<Coord>>),
    MultiPolygon(Vec<Vec<Vec<Coord>>>),
}

/// A feature: a geometry plus its (unused but preserved) properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub geometry: Geometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
}

impl Feature {
    #[must_use]
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            properties: None,
        }
    }
}

/// The set of features a stamp is built around.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    #[must_use]
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Bounding box over every coordinate, or `None` when empty.
    #[must_use]
    pub fn bbox(&self) -> Option<Extent> {
        let mut bounds: Option<Extent> = None;
        for feature in &self.features {
            feature.geometry.for_each_coord(&mut |c: Coord| {
                let b = bounds.get_or_insert(Extent::new(c.x, c.y, c.x, c.y));
                b.xmin = b.xmin.min(c.x);
                b.ymin = b.ymin.min(c.y);
                b.xmax = b.xmax.max(c.x);
                b.ymax = b.ymax.max(c.y);
            });
        }
        bounds
    }
}

impl Geometry {
    fn for_each_coord(&self, f: &mut impl FnMut(Coord)) {
        match self {
            Self::Point(c) => f(*c),
            Self::MultiPoint(cs) | Self::LineString(cs) => cs.iter().copied().for_each(f),
            Self::MultiLineString(lines) | Self::Polygon(lines) => {
                for line in lines {
                    line.iter().copied().for_each(&mut *f);
                }
            }
            Self::MultiPolygon(polys) => {
                for rings in polys {
                    for ring in rings {
                        ring.iter().copied().for_each(&mut *f);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_empty() {
        assert!(FeatureCollection::default().bbox().is_none());
    }

    #[test]
    fn test_bbox_mixed_geometries() {
        let fc = FeatureCollection::new(vec![
            Feature::new(Geometry::Point(Coord::new(5.0, 5.0))),
            Feature::new(Geometry::LineString(vec![
                Coord::new(-1.0, 2.0),
                Coord::new(3.0, 10.0),
            ])),
        ]);
        let bbox = fc.bbox().unwrap();
        assert_eq!(bbox, Extent::new(-1.0, 2.0, 5.0, 10.0));
    }
}
