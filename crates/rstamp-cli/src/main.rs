use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "rasterstamp", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory for intermediate stamp rasters (default: the OS temp dir)
    #[arg(long, global = true)]
    scratch_dir: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Stamp a height profile onto a surface raster
    ///
    /// Builds concentric distance rings around the input features, assigns
    /// each ring a height from the function f(d), rasterizes the rings onto
    /// the exact gridding of the surface raster, and composites the result
    /// onto the surface. For each output cell:
    ///
    /// - Surface nodata cells stay nodata
    /// - Cells beyond the outermost ring keep their surface value
    /// - Stamped cells become `surface OP stamp` (add, subtract, multiply,
    ///   divide)
    ///
    /// The height function is an arithmetic expression over the distance
    /// variable `d`, e.g. 'd**2 + d + 1' or '100 / (d + 1)'. The stair type
    /// picks where in each ring f is evaluated: the inner edge, the outer
    /// edge, or the midpoint.
    ///
    /// Inputs: GeoJSON features (points, lines, polygons) and an ESRI ASCII
    /// grid (.asc) surface. The output raster always inherits the surface's
    /// extent and cell size, and gets a .provenance.json sidecar recording
    /// the full parameter set.
    ///
    /// Reusable parameter bundles can be stored as profiles and invoked
    /// with --profile; explicit flags win over profile values. See
    /// 'rasterstamp profiles'.
    Stamp(commands::stamp::StampArgs),
    /// Show header and statistics of an ESRI ASCII grid
    Info {
        /// Path to the raster (.asc)
        raster: PathBuf,
    },
    /// Inspect stamp profiles
    Profiles {
        #[command(subcommand)]
        action: commands::profiles::ProfilesAction,
    },
    /// Inspect and edit configuration
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Stamp(args) => {
            commands::run_stamp(args, cli.scratch_dir).await?;
        }
        Commands::Info { raster } => {
            commands::show_info(&raster)?;
        }
        Commands::Profiles { action } => {
            commands::profiles::run(action)?;
        }
        Commands::Config { action } => {
            commands::config::run(action)?;
        }
    }

    Ok(())
}
