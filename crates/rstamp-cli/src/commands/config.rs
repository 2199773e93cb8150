use anyhow::{Context, Result};
use rstamp_engine::{config, Config};

#[derive(Debug, clap::Subcommand)]
pub enum ConfigAction {
    /// Show the current effective configuration
    Show,
    /// Get a config value (or the whole file when no key is given)
    Get {
        /// Config key (profile_dir, scratch_dir)
        key: Option<String>,
    },
    /// Set a config value in the config file
    Set {
        /// Config key (profile_dir, scratch_dir)
        key: String,
        value: String,
    },
    /// Show the config file path
    Path,
    /// Show example configuration
    Example,
    /// Create the config file with defaults
    Init,
}

pub fn run(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => show_config(),
        ConfigAction::Get { key } => get_config(key),
        ConfigAction::Set { key, value } => set_config(key, value),
        ConfigAction::Path => show_path(),
        ConfigAction::Example => show_example(),
        ConfigAction::Init => init_config(),
    }
}

const VALID_KEYS: &str = "profile_dir, scratch_dir";

/// Show the current effective configuration.
fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config::config_file_path().display());

    let exists = config::config_file_path().exists();
    println!(
        "File exists: {}\n",
        if exists { "yes" } else { "no (using defaults)" }
    );

    println!("Settings:");
    println!("  profile_dir: {}", config.profile_dir.display());
    println!(
        "  scratch_dir: {}",
        config
            .scratch_dir
            .as_ref()
            .map_or_else(|| "<OS temp dir>".to_string(), |p| p.display().to_string())
    );

    println!("\nPriority: CLI args > ENV vars (RSTAMP_*) > Config file > Defaults");

    Ok(())
}

/// Get a specific config value.
fn get_config(key: Option<String>) -> Result<()> {
    if let Some(key) = key {
        let config = Config::load()?;

        match key.as_str() {
            "profile_dir" => {
                println!("{}", config.profile_dir.display());
            }
            "scratch_dir" => {
                match config.scratch_dir {
                    Some(dir) => println!("{}", dir.display()),
                    None => println!("<not set>"),
                }
            }
            _ => {
                anyhow::bail!("Unknown config key: {}\n\nValid keys: {}", key, VALID_KEYS);
            }
        }
    } else {
        // No key provided, show entire config file contents
        let config_path = config::config_file_path();

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).context("Failed to read config file")?;
            print!("{}", contents);
        } else {
            println!("Config file does not exist: {}", config_path.display());
            println!("\nRun 'rasterstamp config init' to create it.");
        }
    }

    Ok(())
}

/// Replace (or append) a `key = "value"` line, skipping comments.
fn set_key_line(contents: &str, key: &str, value: &str) -> String {
    let mut new_lines = Vec::new();
    let mut found = false;

    for line in contents.lines() {
        let trimmed = line.trim();
        // Only a real `key = ...` assignment counts; `key_extra = ...` and
        // commented-out lines are left alone.
        let assigns_key = trimmed
            .strip_prefix(key)
            .is_some_and(|rest| rest.trim_start().starts_with('='));
        if assigns_key {
            new_lines.push(format!("{key} = \"{value}\""));
            found = true;
        } else {
            new_lines.push(line.to_string());
        }
    }

    if !found {
        new_lines.push(format!("\n{key} = \"{value}\""));
    }

    new_lines.join("\n")
}

/// Set a config value.
fn set_config(key: String, value: String) -> Result<()> {
    if !matches!(key.as_str(), "profile_dir" | "scratch_dir") {
        anyhow::bail!("Unknown config key: {}\n\nValid keys: {}", key, VALID_KEYS);
    }

    let config_path = config::config_file_path();

    // Ensure config file exists
    config::ensure_config_file()?;

    let contents =
        std::fs::read_to_string(&config_path).context("Failed to read config file")?;
    let contents = set_key_line(&contents, &key, &value);

    std::fs::write(&config_path, contents).context("Failed to write config file")?;

    println!("✓ Updated {} = {}", key, value);
    println!("  in {}", config_path.display());

    Ok(())
}

/// Show the config file path.
fn show_path() -> Result<()> {
    let config_path = config::config_file_path();
    println!("{}", config_path.display());
    Ok(())
}

/// Show example configuration.
fn show_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}

/// Initialize config file with defaults.
fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure rasterstamp.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}
