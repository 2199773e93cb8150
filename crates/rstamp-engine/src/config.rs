use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for rasterstamp.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (RSTAMP_* prefix)
/// 3. Config file (~/.config/rasterstamp/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding stamp profile TOML files.
    ///
    /// Can be set via:
    /// - ENV: RSTAMP_PROFILE_DIR
    /// - Config: profile_dir = "/path/to/profiles"
    /// - Default: ~/.config/rasterstamp/profiles
    #[serde(default = "default_profile_dir")]
    pub profile_dir: PathBuf,

    /// Directory for intermediate stamp rasters.
    ///
    /// Can be set via:
    /// - ENV: RSTAMP_SCRATCH_DIR
    /// - Config: scratch_dir = "/path/to/scratch"
    /// - Default: the OS temp directory
    pub scratch_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile_dir: default_profile_dir(),
            scratch_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/rasterstamp/config.toml
    /// Reads environment variables with RSTAMP_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("rstamp");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }
}

/// Get the default profile directory.
fn default_profile_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rasterstamp")
        .join("profiles")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/rasterstamp/config.toml
/// - macOS: ~/Library/Application Support/rasterstamp/config.toml
/// - Windows: %APPDATA%\rasterstamp\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rasterstamp")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Rasterstamp Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (RSTAMP_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Directory holding stamp profile TOML files
#
# Profiles bundle reusable stamp parameters (distances, height function,
# stair type, ...) for `rasterstamp stamp --profile NAME`
#
# Can also be set via:
# - Environment: RSTAMP_PROFILE_DIR=/path/to/profiles
#profile_dir = "/path/to/profiles"

# Directory for intermediate stamp rasters
#
# The rasterize stage parks the stamp raster here until the stamp stage has
# composited it; the file is removed afterwards
#
# Can also be set via:
# - Environment: RSTAMP_SCRATCH_DIR=/path/to/scratch
#
# Default: the OS temp directory
#scratch_dir = "/path/to/scratch"
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}
