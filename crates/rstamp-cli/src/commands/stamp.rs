use anyhow::Result;
use std::path::PathBuf;

use rstamp_engine::{
    build_pipeline, pipeline::scratch_stamp_path, BufferUnit, CellAssignment, Config, Operation,
    Profile, StairType, StampJob, StampParams,
};

/// Parameters of the stamp subcommand.
#[derive(Debug, clap::Args)]
pub struct StampArgs {
    /// Input feature file (GeoJSON)
    #[arg(long, short = 'f')]
    pub features: PathBuf,

    /// Input surface raster (.asc)
    #[arg(long, short = 's')]
    pub surface: PathBuf,

    /// Output raster (.asc)
    #[arg(long, short = 'o')]
    pub output: PathBuf,

    /// Ring distances, e.g. 10,25,50
    #[arg(long, value_delimiter = ',')]
    pub distances: Vec<f64>,

    /// Height function over the distance variable d, e.g. '100 / (d + 1)'
    #[arg(long)]
    pub z_func: Option<String>,

    /// Where in each ring f(d) is evaluated: centre, inside or outside
    #[arg(long)]
    pub stair_type: Option<StairType>,

    /// Unit of the ring distances (default: map units)
    #[arg(long)]
    pub unit: Option<BufferUnit>,

    /// How the stamp combines with the surface: add, subtract, multiply, divide
    #[arg(long)]
    pub operation: Option<Operation>,

    /// Ring membership per cell: cell-center or maximum-area
    #[arg(long)]
    pub cell_assignment: Option<CellAssignment>,

    /// Leave polygon interiors unstamped
    #[arg(long)]
    pub outside_only: bool,

    /// Stamp profile to take defaults from
    #[arg(long, short = 'p')]
    pub profile: Option<String>,
}

impl StampArgs {
    /// Resolve CLI flags and an optional profile into run parameters.
    /// Profile values fill what the flags left unset; explicit flags win.
    fn into_params(self, config: &Config) -> Result<StampParams> {
        let mut params = StampParams::new(self.features, self.surface, self.output)
            .with_distances(self.distances)
            .with_outside_polygons_only(self.outside_only);

        if let Some(name) = &self.profile {
            let profile = Profile::find(&config.profile_dir, name)?;
            profile.merge_into(&mut params)?;
        }

        if let Some(z_func) = self.z_func {
            params.z_func = z_func;
        }
        if let Some(stair_type) = self.stair_type {
            params.stair_type = stair_type;
        }
        if let Some(unit) = self.unit {
            params.unit = unit;
        }
        if let Some(operation) = self.operation {
            params.operation = operation;
        }
        if let Some(cell_assignment) = self.cell_assignment {
            params.cell_assignment = cell_assignment;
        }

        Ok(params)
    }
}

fn state_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rasterstamp")
        .join("pipeline.db")
}

pub async fn run_stamp(args: StampArgs, scratch_dir: Option<PathBuf>) -> Result<()> {
    let mut config = Config::load()?;
    if scratch_dir.is_some() {
        config.scratch_dir = scratch_dir;
    }

    let params = args.into_params(&config)?;
    let output = params.output.clone();

    tracing::info!(
        "Stamping {} onto {}",
        params.features.display(),
        params.surface.display()
    );

    let job = StampJob::new(&params);
    let scratch = scratch_stamp_path(config.scratch_dir.as_deref(), &job);
    let workflow = build_pipeline(params, scratch)?;

    // Create a state store for the pipeline
    let state_path = state_store_path();
    if let Some(parent) = state_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut store = treadle::SqliteStateStore::open(&state_path).await?;

    // Subscribe to events for progress display
    let mut events = workflow.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                treadle::WorkflowEvent::StageStarted { stage, .. } => {
                    println!("  ⏳ [{stage}] Starting...");
                }
                treadle::WorkflowEvent::StageCompleted { stage, .. } => {
                    println!("  ✓ [{stage}] Complete");
                }
                treadle::WorkflowEvent::StageFailed { stage, error, .. } => {
                    eprintln!("  ✗ [{stage}] FAILED: {error}");
                }
                _ => {}
            }
        }
    });

    // Execute the workflow
    workflow.advance(&job, &mut store).await?;

    println!("\n✓ Stamp complete: {}", output.display());
    println!("  Provenance: {}.provenance.json", output.display());
    Ok(())
}
