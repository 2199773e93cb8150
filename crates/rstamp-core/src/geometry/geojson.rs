//! GeoJSON ingest.
//!
//! Accepts a top-level `FeatureCollection`, a single `Feature`, or a bare
//! geometry object. Only the geometry types in [`Geometry`] are supported;
//! `GeometryCollection` is rejected with an explanatory error. Coordinates
//! beyond x,y (elevation, measure) are ignored.

use std::path::Path;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::geometry::{Coord, Feature, FeatureCollection, Geometry};

/// Read features from a GeoJSON file.
pub fn read(path: &Path) -> Result<FeatureCollection> {
    log::debug!("reading features from {}", path.display());
    let text = std::fs::read_to_string(path)?;
    parse(&text).map_err(|e| match e {
        Error::Geometry(msg) => Error::Geometry(format!("{}: {msg}", path.display())),
        other => other,
    })
}

/// Parse features from GeoJSON text.
pub fn parse(text: &str) -> Result<FeatureCollection> {
    let value: Value = serde_json::from_str(text)?;
    let object_type = type_of(&value)?;

    match object_type.as_str() {
        "FeatureCollection" => {
            let features = value
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    Error::Geometry("FeatureCollection missing \"features\" array".into())
                })?;
            let features = features
                .iter()
                .map(parse_feature)
                .collect::<Result<Vec<_>>>()?;
            Ok(FeatureCollection::new(features))
        }
        "Feature" => Ok(FeatureCollection::new(vec![parse_feature(&value)?])),
        _ => Ok(FeatureCollection::new(vec![Feature::new(parse_geometry(
            &value,
        )?)])),
    }
}

fn type_of(value: &Value) -> Result<String> {
    value
        .get("type")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| Error::Geometry("object has no \"type\" member".into()))
}

fn parse_feature(value: &Value) -> Result<Feature> {
    let geometry = value
        .get("geometry")
        .filter(|g| !g.is_null())
        .ok_or_else(|| Error::Geometry("feature has no geometry".into()))?;
    Ok(Feature {
        geometry: parse_geometry(geometry)?,
        properties: value.get("properties").filter(|p| !p.is_null()).cloned(),
    })
}

fn parse_geometry(value: &Value) -> Result<Geometry> {
    let geometry_type = type_of(value)?;
    if geometry_type == "GeometryCollection" {
        return Err(Error::Geometry(
            "GeometryCollection is not supported; supply concrete geometries".into(),
        ));
    }

    let coordinates = value
        .get("coordinates")
        .ok_or_else(|| Error::Geometry(format!("{geometry_type} missing \"coordinates\"")))?;

    match geometry_type.as_str() {
        "Point" => Ok(Geometry::Point(parse_coord(coordinates)?)),
        "MultiPoint" => Ok(Geometry::MultiPoint(parse_coord_seq(coordinates)?)),
        "LineString" => {
            let coords = parse_coord_seq(coordinates)?;
            if coords.len() < 2 {
                return Err(Error::Geometry("LineString needs at least 2 points".into()));
            }
            Ok(Geometry::LineString(coords))
        }
        "MultiLineString" => Ok(Geometry::MultiLineString(parse_seq(
            coordinates,
            parse_coord_seq,
        )?)),
        "Polygon" => Ok(Geometry::Polygon(parse_rings(coordinates)?)),
        "MultiPolygon" => Ok(Geometry::MultiPolygon(parse_seq(coordinates, parse_rings)?)),
        other => Err(Error::Geometry(format!("unknown geometry type: {other}"))),
    }
}

fn parse_seq<T>(value: &Value, item: impl Fn(&Value) -> Result<T>) -> Result<Vec<T>> {
    value
        .as_array()
        .ok_or_else(|| Error::Geometry("expected a coordinate array".into()))?
        .iter()
        .map(item)
        .collect()
}

fn parse_rings(value: &Value) -> Result<Vec<Vec<Coord>>> {
    let rings = parse_seq(value, parse_coord_seq)?;
    if rings.is_empty() {
        return Err(Error::Geometry("polygon has no rings".into()));
    }
    for ring in &rings {
        if ring.len() < 4 {
            return Err(Error::Geometry(
                "polygon ring needs at least 4 points (closed)".into(),
            ));
        }
    }
    Ok(rings)
}

fn parse_coord_seq(value: &Value) -> Result<Vec<Coord>> {
    parse_seq(value, parse_coord)
}

fn parse_coord(value: &Value) -> Result<Coord> {
    let parts = value
        .as_array()
        .ok_or_else(|| Error::Geometry("expected a coordinate pair".into()))?;
    if parts.len() < 2 {
        return Err(Error::Geometry(format!(
            "coordinate has {} ordinates, need at least 2",
            parts.len()
        )));
    }
    let ordinate = |i: usize| -> Result<f64> {
        parts[i]
            .as_f64()
            .ok_or_else(|| Error::Geometry("non-numeric ordinate".into()))
    };
    Ok(Coord::new(ordinate(0)?, ordinate(1)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        let fc = parse(r#"{"type": "Point", "coordinates": [1.5, 2.5]}"#).unwrap();
        assert_eq!(fc.len(), 1);
        assert_eq!(
            fc.features[0].geometry,
            Geometry::Point(Coord::new(1.5, 2.5))
        );
    }

    #[test]
    fn test_parse_point_with_elevation() {
        let fc = parse(r#"{"type": "Point", "coordinates": [1.0, 2.0, 99.0]}"#).unwrap();
        assert_eq!(
            fc.features[0].geometry,
            Geometry::Point(Coord::new(1.0, 2.0))
        );
    }

    #[test]
    fn test_parse_feature_collection() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"name": "pit"},
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]]
                    }
                },
                {
                    "type": "Feature",
                    "properties": null,
                    "geometry": {"type": "Point", "coordinates": [5, 5]}
                }
            ]
        }"#;
        let fc = parse(text).unwrap();
        assert_eq!(fc.len(), 2);
        assert!(fc.features[0].properties.is_some());
        assert!(fc.features[1].properties.is_none());
        assert!(matches!(fc.features[0].geometry, Geometry::Polygon(_)));
    }

    #[test]
    fn test_parse_rejects_geometry_collection() {
        let text = r#"{"type": "GeometryCollection", "geometries": []}"#;
        let err = parse(text).unwrap_err();
        assert!(err.to_string().contains("GeometryCollection"));
    }

    #[test]
    fn test_parse_rejects_open_ring() {
        let text = r#"{"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1]]]}"#;
        assert!(parse(text).is_err());
    }

    #[test]
    fn test_parse_rejects_missing_geometry() {
        let text = r#"{"type": "Feature", "properties": {}, "geometry": null}"#;
        let err = parse(text).unwrap_err();
        assert!(err.to_string().contains("no geometry"));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(parse("not json").is_err());
    }
}
