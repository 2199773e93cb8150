//! Stamping pipeline for rasterstamp.
//!
//! Implements ring construction, stamp rasterization, and surface
//! compositing, both as treadle `Stage` implementations (rasterize → stamp)
//! and as the synchronous one-call [`stamp_raster`] entry point.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod job;
pub mod pipeline;
pub mod profile;
pub mod rasterize;
pub mod rings;
pub mod runner;
pub mod stamp;
pub mod units;

pub use config::Config;
pub use error::{EngineError, EngineResult};
pub use job::{StampJob, StampParams};
pub use pipeline::build_pipeline;
pub use profile::Profile;
pub use rasterize::{CellAssignment, RasterizeStage};
pub use rings::{Ring, RingSet, StairType};
pub use runner::{stamp_raster, StampSummary};
pub use stamp::{Operation, StampStage};
pub use units::BufferUnit;
