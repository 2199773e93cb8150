//! Planar distance fields over features.
//!
//! Ring membership during stamping is decided by the distance from a sample
//! point to the nearest feature, with polygon interiors at distance zero.
//! All math is planar Euclidean in map units.

use crate::geometry::{Coord, FeatureCollection, Geometry};

/// Distance from `p` to the segment `ab`.
#[must_use]
pub fn point_segment_distance(p: Coord, a: Coord, b: Coord) -> f64 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;

    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0)
    };

    let cx = a.x + t * abx;
    let cy = a.y + t * aby;
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}

fn polyline_distance(coords: &[Coord], p: Coord) -> f64 {
    coords
        .windows(2)
        .map(|w| point_segment_distance(p, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Even-odd containment test against a single closed ring.
fn ring_contains(ring: &[Coord], p: Coord) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = ring[i];
        let b = ring[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Inside the exterior ring and outside every hole.
fn polygon_contains(rings: &[Vec<Coord>], p: Coord) -> bool {
    match rings.split_first() {
        Some((exterior, holes)) => {
            ring_contains(exterior, p) && !holes.iter().any(|h| ring_contains(h, p))
        }
        None => false,
    }
}

fn polygon_distance(rings: &[Vec<Coord>], p: Coord) -> f64 {
    if polygon_contains(rings, p) {
        return 0.0;
    }
    rings
        .iter()
        .map(|ring| polyline_distance(ring, p))
        .fold(f64::INFINITY, f64::min)
}

impl Geometry {
    /// Distance from `p` to this geometry; zero inside a polygon.
    #[must_use]
    pub fn distance_to(&self, p: Coord) -> f64 {
        match self {
            Self::Point(c) => ((p.x - c.x).powi(2) + (p.y - c.y).powi(2)).sqrt(),
            Self::MultiPoint(cs) => cs
                .iter()
                .map(|c| Self::Point(*c).distance_to(p))
                .fold(f64::INFINITY, f64::min),
            Self::LineString(coords) => polyline_distance(coords, p),
            Self::MultiLineString(lines) => lines
                .iter()
                .map(|line| polyline_distance(line, p))
                .fold(f64::INFINITY, f64::min),
            Self::Polygon(rings) => polygon_distance(rings, p),
            Self::MultiPolygon(polys) => polys
                .iter()
                .map(|rings| polygon_distance(rings, p))
                .fold(f64::INFINITY, f64::min),
        }
    }

    /// Whether `p` lies inside this geometry's area (polygons only).
    #[must_use]
    pub fn contains(&self, p: Coord) -> bool {
        match self {
            Self::Polygon(rings) => polygon_contains(rings, p),
            Self::MultiPolygon(polys) => polys.iter().any(|rings| polygon_contains(rings, p)),
            _ => false,
        }
    }
}

impl FeatureCollection {
    /// Distance from `p` to the nearest feature; infinity when empty.
    #[must_use]
    pub fn distance_to(&self, p: Coord) -> f64 {
        self.features
            .iter()
            .map(|f| f.geometry.distance_to(p))
            .fold(f64::INFINITY, f64::min)
    }

    /// Whether `p` lies inside any polygonal feature.
    #[must_use]
    pub fn contains(&self, p: Coord) -> bool {
        self.features.iter().any(|f| f.geometry.contains(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Feature;

    fn square() -> Vec<Vec<Coord>> {
        vec![vec![
            Coord::new(0.0, 0.0),
            Coord::new(10.0, 0.0),
            Coord::new(10.0, 10.0),
            Coord::new(0.0, 10.0),
            Coord::new(0.0, 0.0),
        ]]
    }

    #[test]
    fn test_point_segment_distance() {
        let a = Coord::new(0.0, 0.0);
        let b = Coord::new(10.0, 0.0);
        // Perpendicular drop onto the segment interior
        assert_eq!(point_segment_distance(Coord::new(5.0, 3.0), a, b), 3.0);
        // Beyond the endpoint: distance to the endpoint itself
        assert_eq!(point_segment_distance(Coord::new(13.0, 4.0), a, b), 5.0);
        // Degenerate segment
        assert_eq!(point_segment_distance(Coord::new(3.0, 4.0), a, a), 5.0);
    }

    #[test]
    fn test_polygon_contains() {
        let poly = Geometry::Polygon(square());
        assert!(poly.contains(Coord::new(5.0, 5.0)));
        assert!(!poly.contains(Coord::new(15.0, 5.0)));
        assert!(!poly.contains(Coord::new(-0.1, 5.0)));
    }

    #[test]
    fn test_polygon_with_hole() {
        let mut rings = square();
        rings.push(vec![
            Coord::new(4.0, 4.0),
            Coord::new(6.0, 4.0),
            Coord::new(6.0, 6.0),
            Coord::new(4.0, 6.0),
            Coord::new(4.0, 4.0),
        ]);
        let poly = Geometry::Polygon(rings);
        assert!(poly.contains(Coord::new(2.0, 2.0)));
        assert!(!poly.contains(Coord::new(5.0, 5.0)));
        // Inside the hole: distance is to the hole boundary
        assert_eq!(poly.distance_to(Coord::new(5.0, 5.0)), 1.0);
    }

    #[test]
    fn test_polygon_distance() {
        let poly = Geometry::Polygon(square());
        assert_eq!(poly.distance_to(Coord::new(5.0, 5.0)), 0.0);
        assert_eq!(poly.distance_to(Coord::new(13.0, 5.0)), 3.0);
        assert_eq!(poly.distance_to(Coord::new(13.0, 14.0)), 5.0);
    }

    #[test]
    fn test_point_distance() {
        let pt = Geometry::Point(Coord::new(0.0, 0.0));
        assert_eq!(pt.distance_to(Coord::new(3.0, 4.0)), 5.0);
        assert!(!pt.contains(Coord::new(0.0, 0.0)));
    }

    #[test]
    fn test_linestring_distance() {
        let line = Geometry::LineString(vec![
            Coord::new(0.0, 0.0),
            Coord::new(10.0, 0.0),
            Coord::new(10.0, 10.0),
        ]);
        assert_eq!(line.distance_to(Coord::new(5.0, 2.0)), 2.0);
        assert_eq!(line.distance_to(Coord::new(12.0, 5.0)), 2.0);
    }

    #[test]
    fn test_collection_distance() {
        let fc = FeatureCollection::new(vec![
            Feature::new(Geometry::Point(Coord::new(0.0, 0.0))),
            Feature::new(Geometry::Point(Coord::new(100.0, 0.0))),
        ]);
        assert_eq!(fc.distance_to(Coord::new(99.0, 0.0)), 1.0);
        assert!(FeatureCollection::default()
            .distance_to(Coord::new(0.0, 0.0))
            .is_infinite());
    }
}
