//! Reusable stamp profiles.
//!
//! A profile is a TOML file bundling stamp parameters so a recurring job
//! ("standard noise berm", "drainage terraces") can be invoked by name.
//! Explicit CLI flags always win over profile values; the merge only fills
//! gaps.
//!
//! ```toml
//! name = "terraces"
//! description = "Three-step drainage terraces"
//! distances = [10.0, 25.0, 50.0]
//! z_func = "100 / (d + 1)"
//! stair_type = "centre"
//! operation = "subtract"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{EngineError, EngineResult};
use crate::job::StampParams;

/// A named, reusable parameter bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub distances: Vec<f64>,
    #[serde(default)]
    pub z_func: Option<String>,
    #[serde(default)]
    pub stair_type: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub operation: Option<String>,
    #[serde(default)]
    pub cell_assignment: Option<String>,
    #[serde(default)]
    pub outside_polygons_only: Option<bool>,
}

impl Profile {
    /// Load a profile from a TOML file.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let profile: Self = toml::from_str(&text)?;
        Ok(profile)
    }

    /// Find a profile by name in the profile directory.
    ///
    /// Matches the `name` field, falling back to the file stem.
    pub fn find(dir: &Path, name: &str) -> EngineResult<Self> {
        for (stem, path) in list_profiles(dir) {
            let profile = Self::load(&path)?;
            if profile.name == name || stem == name {
                return Ok(profile);
            }
        }
        Err(EngineError::Profile {
            name: name.to_string(),
            message: format!("not found under {}", dir.display()),
        })
    }

    /// Apply this profile to `params`: distances and the height function
    /// only fill gaps, the remaining fields replace the built-in defaults.
    /// Callers apply explicit flags after the merge so they win.
    pub fn merge_into(&self, params: &mut StampParams) -> EngineResult<()> {
        let parse_err = |message: String| EngineError::Profile {
            name: self.name.clone(),
            message,
        };

        if params.distances.is_empty() {
            params.distances.clone_from(&self.distances);
        }
        if params.z_func.is_empty() {
            if let Some(z) = &self.z_func {
                params.z_func.clone_from(z);
            }
        }
        if let Some(s) = &self.stair_type {
            params.stair_type = s.parse().map_err(|e| parse_err(format!("{e}")))?;
        }
        if let Some(s) = &self.unit {
            params.unit = s.parse().map_err(|e| parse_err(format!("{e}")))?;
        }
        if let Some(s) = &self.operation {
            params.operation = s.parse().map_err(|e| parse_err(format!("{e}")))?;
        }
        if let Some(s) = &self.cell_assignment {
            params.cell_assignment = s.parse().map_err(|e| parse_err(format!("{e}")))?;
        }
        if let Some(outside) = self.outside_polygons_only {
            params.outside_polygons_only = outside;
        }
        Ok(())
    }
}

/// All `*.toml` files under the profile directory, as (stem, path) pairs.
#[must_use]
pub fn list_profiles(dir: &Path) -> Vec<(String, PathBuf)> {
    let mut profiles = Vec::new();
    for entry in WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("toml") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        profiles.push((stem.to_string(), path.to_path_buf()));
    }
    profiles.sort();
    profiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use crate::rings::StairType;
    use crate::stamp::Operation;

    const TERRACES: &str = r#"
name = "terraces"
description = "Three-step drainage terraces"
distances = [10.0, 25.0, 50.0]
z_func = "100 / (d + 1)"
stair_type = "centre"
operation = "subtract"
"#;

    fn write_profile(dir: &Path, file: &str, text: &str) -> PathBuf {
        let path = dir.join(file);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_load_profile() {
        let tmp = TempDir::new().unwrap();
        let path = write_profile(tmp.path(), "terraces.toml", TERRACES);

        let profile = Profile::load(&path).unwrap();
        assert_eq!(profile.name, "terraces");
        assert_eq!(profile.distances, vec![10.0, 25.0, 50.0]);
        assert_eq!(profile.z_func.as_deref(), Some("100 / (d + 1)"));
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let tmp = TempDir::new().unwrap();
        let path = write_profile(tmp.path(), "broken.toml", "name = [not toml");
        assert!(matches!(
            Profile::load(&path).unwrap_err(),
            EngineError::Toml(_)
        ));
    }

    #[test]
    fn test_find_by_name_and_stem() {
        let tmp = TempDir::new().unwrap();
        write_profile(tmp.path(), "drainage.toml", TERRACES);

        // Matches the `name` field...
        assert!(Profile::find(tmp.path(), "terraces").is_ok());
        // ...and the file stem.
        assert!(Profile::find(tmp.path(), "drainage").is_ok());
        assert!(Profile::find(tmp.path(), "absent").is_err());
    }

    #[test]
    fn test_merge_fills_gaps_only() {
        let tmp = TempDir::new().unwrap();
        let path = write_profile(tmp.path(), "terraces.toml", TERRACES);
        let profile = Profile::load(&path).unwrap();

        let mut params = StampParams::new("a.geojson", "b.asc", "c.asc")
            .with_distances(vec![99.0]); // explicit: kept
        profile.merge_into(&mut params).unwrap();

        assert_eq!(params.distances, vec![99.0]);
        assert_eq!(params.z_func, "100 / (d + 1)");
        assert_eq!(params.stair_type, StairType::Centre);
        assert_eq!(params.operation, Operation::Subtract);
    }

    #[test]
    fn test_merge_rejects_invalid_field() {
        let mut profile = Profile {
            name: "bad".into(),
            description: None,
            distances: vec![1.0],
            z_func: Some("d".into()),
            stair_type: Some("sideways".into()),
            unit: None,
            operation: None,
            cell_assignment: None,
            outside_polygons_only: None,
        };
        let mut params = StampParams::new("a", "b", "c");
        assert!(profile.merge_into(&mut params).is_err());

        profile.stair_type = Some("inside".into());
        assert!(profile.merge_into(&mut params).is_ok());
    }

    #[test]
    fn test_list_profiles_sorted() {
        let tmp = TempDir::new().unwrap();
        write_profile(tmp.path(), "b.toml", TERRACES);
        write_profile(tmp.path(), "a.toml", TERRACES);
        write_profile(tmp.path(), "notes.txt", "ignored");

        let listed = list_profiles(tmp.path());
        let stems: Vec<&str> = listed.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(stems, vec!["a", "b"]);
    }

    #[test]
    fn test_list_profiles_missing_dir() {
        let tmp = TempDir::new().unwrap();
        assert!(list_profiles(&tmp.path().join("absent")).is_empty());
    }
}
