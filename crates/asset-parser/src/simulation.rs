//! Closed table of the simulations published in the renewables collection.

use serde::{Serialize, Serializer};
use std::fmt;

/// A global climate model run (or reanalysis) used as WRF boundary forcing.
///
/// Paths use a lowercase token; catalog records use the canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Simulation {
    EcEarth3,
    MpiEsm12Hr,
    Miroc6,
    TaiEsm1,
    Era5,
}

impl Simulation {
    pub const ALL: [Simulation; 5] = [
        Simulation::EcEarth3,
        Simulation::MpiEsm12Hr,
        Simulation::Miroc6,
        Simulation::TaiEsm1,
        Simulation::Era5,
    ];

    /// Look up a path token. Matching is case-sensitive.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "ec-earth3" => Some(Simulation::EcEarth3),
            "mpi-esm1-2-hr" => Some(Simulation::MpiEsm12Hr),
            "miroc6" => Some(Simulation::Miroc6),
            "taiesm1" => Some(Simulation::TaiEsm1),
            "era5" => Some(Simulation::Era5),
            _ => None,
        }
    }

    /// Token as it appears in storage paths.
    pub fn token(&self) -> &'static str {
        match self {
            Simulation::EcEarth3 => "ec-earth3",
            Simulation::MpiEsm12Hr => "mpi-esm1-2-hr",
            Simulation::Miroc6 => "miroc6",
            Simulation::TaiEsm1 => "taiesm1",
            Simulation::Era5 => "era5",
        }
    }

    /// Display name written to the `source_id` column.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Simulation::EcEarth3 => "EC-Earth3",
            Simulation::MpiEsm12Hr => "MPI-ESM1-2-HR",
            Simulation::Miroc6 => "MIROC6",
            Simulation::TaiEsm1 => "TaiESM1",
            Simulation::Era5 => "ERA5",
        }
    }
}

impl fmt::Display for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

impl Serialize for Simulation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.canonical_name())
    }
}
