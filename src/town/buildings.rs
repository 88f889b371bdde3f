//! Town buildings - costs, prerequisites, income and dwelling tiers

use serde::{Deserialize, Serialize};

use super::resources::Resources;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildingKind {
    VillageHall,
    TownHall,
    Fort,
    Citadel,
    CastleUpgrade,
    MageGuild,
    Marketplace,
    Tavern,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 8] = [
        BuildingKind::VillageHall,
        BuildingKind::TownHall,
        BuildingKind::Fort,
        BuildingKind::Citadel,
        BuildingKind::CastleUpgrade,
        BuildingKind::MageGuild,
        BuildingKind::Marketplace,
        BuildingKind::Tavern,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            BuildingKind::VillageHall => "VILLAGE_HALL",
            BuildingKind::TownHall => "TOWN_HALL",
            BuildingKind::Fort => "FORT",
            BuildingKind::Citadel => "CITADEL",
            BuildingKind::CastleUpgrade => "CASTLE_UPGRADE",
            BuildingKind::MageGuild => "MAGE_GUILD",
            BuildingKind::Marketplace => "MARKETPLACE",
            BuildingKind::Tavern => "TAVERN",
        }
    }

    pub fn from_id(id: &str) -> Option<BuildingKind> {
        Self::ALL.into_iter().find(|b| b.id() == id)
    }

    pub fn name(&self) -> &'static str {
        match self {
            BuildingKind::VillageHall => "Village Hall",
            BuildingKind::TownHall => "Town Hall",
            BuildingKind::Fort => "Fort",
            BuildingKind::Citadel => "Citadel",
            BuildingKind::CastleUpgrade => "Castle",
            BuildingKind::MageGuild => "Mage Guild",
            BuildingKind::Marketplace => "Marketplace",
            BuildingKind::Tavern => "Tavern",
        }
    }

    pub fn cost(&self) -> Resources {
        let price = |gold, wood, ore| Resources {
            gold,
            wood,
            ore,
            ..Resources::default()
        };
        match self {
            BuildingKind::VillageHall => Resources::default(),
            BuildingKind::TownHall => price(2500, 0, 0),
            BuildingKind::Fort => price(2000, 5, 5),
            BuildingKind::Citadel => price(5000, 10, 10),
            BuildingKind::CastleUpgrade => price(10000, 20, 20),
            BuildingKind::MageGuild => price(3000, 5, 5),
            BuildingKind::Marketplace => price(500, 5, 0),
            BuildingKind::Tavern => price(500, 5, 0),
        }
    }

    /// Building that must already stand before this one
    pub fn requires(&self) -> Option<BuildingKind> {
        match self {
            BuildingKind::TownHall => Some(BuildingKind::VillageHall),
            BuildingKind::Citadel => Some(BuildingKind::Fort),
            BuildingKind::CastleUpgrade => Some(BuildingKind::Citadel),
            _ => None,
        }
    }

    /// Daily gold
    pub fn income(&self) -> u32 {
        match self {
            BuildingKind::VillageHall => 500,
            BuildingKind::TownHall => 1000,
            _ => 0,
        }
    }

    /// Fraction added to weekly creature growth
    pub fn growth_bonus(&self) -> f64 {
        match self {
            BuildingKind::Citadel => 0.5,
            BuildingKind::CastleUpgrade => 1.0,
            _ => 0.0,
        }
    }

    /// Highest creature tier this building unlocks for recruitment
    pub fn max_unit_tier(&self) -> Option<u8> {
        match self {
            BuildingKind::Fort => Some(2),
            BuildingKind::Citadel => Some(4),
            BuildingKind::CastleUpgrade => Some(7),
            _ => None,
        }
    }
}
