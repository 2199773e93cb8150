use anyhow::Result;

use rstamp_engine::{profile::list_profiles, Config, Profile};

#[derive(Debug, clap::Subcommand)]
pub enum ProfilesAction {
    /// List available stamp profiles
    List,
    /// Show one profile in full
    Show {
        /// Profile name (or file stem)
        name: String,
    },
}

pub fn run(action: ProfilesAction) -> Result<()> {
    let config = Config::load()?;

    match action {
        ProfilesAction::List => {
            let profiles = list_profiles(&config.profile_dir);

            if profiles.is_empty() {
                println!(
                    "No profiles found in {}",
                    config.profile_dir.display()
                );
                println!("\nDrop TOML files there to define reusable stamp parameters.");
                return Ok(());
            }

            println!("\nProfiles in {}\n", config.profile_dir.display());
            for (stem, path) in profiles {
                match Profile::load(&path) {
                    Ok(profile) => {
                        let description = profile.description.as_deref().unwrap_or("");
                        println!("  {:<20} {}", profile.name, description);
                    }
                    Err(e) => {
                        println!("  {:<20} (unreadable: {e})", stem);
                    }
                }
            }
        }
        ProfilesAction::Show { name } => {
            let profile = Profile::find(&config.profile_dir, &name)?;

            println!("\n{}", profile.name);
            if let Some(description) = &profile.description {
                println!("  {description}");
            }
            println!();
            println!("  distances:             {:?}", profile.distances);
            println!(
                "  z_func:                {}",
                profile.z_func.as_deref().unwrap_or("<not set>")
            );
            let opt = |v: &Option<String>| v.clone().unwrap_or_else(|| "<default>".to_string());
            println!("  stair_type:            {}", opt(&profile.stair_type));
            println!("  unit:                  {}", opt(&profile.unit));
            println!("  operation:             {}", opt(&profile.operation));
            println!("  cell_assignment:       {}", opt(&profile.cell_assignment));
            println!(
                "  outside_polygons_only: {}",
                profile
                    .outside_polygons_only
                    .map_or_else(|| "<default>".to_string(), |b| b.to_string())
            );
        }
    }

    Ok(())
}
