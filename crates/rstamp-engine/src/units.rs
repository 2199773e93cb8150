//! Ring distance units.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// The unit ring distances are given in.
///
/// Distances are converted into the surface grid's linear unit before any
/// geometry work. ASCII grids carry no coordinate reference system, so map
/// units are assumed metric: `Meters` is the identity, like `MapUnits`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BufferUnit {
    #[default]
    MapUnits,
    Meters,
    Kilometers,
    Feet,
    Yards,
    Miles,
}

impl BufferUnit {
    /// Conversion factor into map units.
    #[must_use]
    pub fn factor(self) -> f64 {
        match self {
            Self::MapUnits | Self::Meters => 1.0,
            Self::Kilometers => 1000.0,
            Self::Feet => 0.3048,
            Self::Yards => 0.9144,
            Self::Miles => 1609.344,
        }
    }

    /// Convert a distance in this unit into map units.
    #[must_use]
    pub fn to_map_units(self, v: f64) -> f64 {
        v * self.factor()
    }
}

impl fmt::Display for BufferUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MapUnits => "map-units",
            Self::Meters => "meters",
            Self::Kilometers => "kilometers",
            Self::Feet => "feet",
            Self::Yards => "yards",
            Self::Miles => "miles",
        };
        f.write_str(name)
    }
}

impl FromStr for BufferUnit {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "map_units" | "unknown" => Ok(Self::MapUnits),
            "meters" | "metres" | "m" => Ok(Self::Meters),
            "kilometers" | "kilometres" | "km" => Ok(Self::Kilometers),
            "feet" | "ft" => Ok(Self::Feet),
            "yards" | "yd" => Ok(Self::Yards),
            "miles" | "mi" => Ok(Self::Miles),
            _ => Err(EngineError::InvalidParameter {
                name: "unit",
                message: format!(
                    "unknown unit {s:?}; valid values are map-units, meters, \
                     kilometers, feet, yards and miles"
                ),
            }),
        }
    }
}
