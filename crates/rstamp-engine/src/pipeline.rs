use std::path::{Path, PathBuf};

use treadle::Workflow;

use crate::job::{StampJob, StampParams};
use crate::rasterize::RasterizeStage;
use crate::stamp::StampStage;

/// Scratch path for a job's intermediate stamp raster.
#[must_use]
pub fn scratch_stamp_path(scratch_dir: Option<&Path>, job: &StampJob) -> PathBuf {
    use treadle::WorkItem;
    let dir = scratch_dir.map_or_else(std::env::temp_dir, Path::to_path_buf);
    dir.join(format!("rstamp-{}.asc", job.id()))
}

/// Build the rasterize + stamp pipeline.
///
/// # Errors
/// Returns an error if the workflow cannot be built.
pub fn build_pipeline(
    params: StampParams,
    scratch: PathBuf,
) -> treadle::Result<Workflow> {
    let rasterize_stage = RasterizeStage::new(params.clone(), scratch.clone());
    let stamp_stage = StampStage::new(params, scratch);

    Workflow::builder()
        .stage("rasterize", rasterize_stage)
        .stage("stamp", stamp_stage)
        .dependency("stamp", "rasterize")
        .build()
}
