//! Adventure map terrain and its movement costs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Terrain {
    #[default]
    Grass,
    Forest,
    Mountain,
    Water,
    Sand,
    Road,
    Swamp,
    Snow,
}

impl Terrain {
    /// Movement points spent entering a tile (infinite = impassable)
    pub fn movement_cost(&self) -> f64 {
        match self {
            Terrain::Grass => 1.0,
            Terrain::Forest => 2.0,
            Terrain::Mountain => f64::INFINITY,
            Terrain::Water => f64::INFINITY,
            Terrain::Sand => 2.0,
            Terrain::Road => 0.5,
            Terrain::Swamp => 3.0,
            Terrain::Snow => 2.0,
        }
    }

    pub fn is_passable(&self) -> bool {
        self.movement_cost().is_finite()
    }
}
