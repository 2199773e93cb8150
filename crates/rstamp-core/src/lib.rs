//! Core domain model for rasterstamp.
//!
//! This crate defines the raster grid model and its ESRI ASCII codec, the
//! vector geometry model with GeoJSON ingest, the `f(d)` height-function
//! expression language, and provenance records for stamped outputs.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod expr;
pub mod geometry;
pub mod grid;
pub mod provenance;

pub use error::{Error, Result};
pub use expr::ZFunc;
pub use geometry::{Coord, Feature, FeatureCollection, Geometry};
pub use grid::{Extent, Grid};
