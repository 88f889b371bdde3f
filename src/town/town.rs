//! Town - dwellings, construction and recruitment

use serde::{Deserialize, Serialize};

use super::buildings::BuildingKind;
use super::resources::Resources;
use crate::core::types::{GridPos, PlayerId, TownId};
use crate::units::{Faction, UnitRegistry};

/// Creatures a faction's towns can house, lowest tier first
pub fn faction_units(faction: Faction) -> &'static [&'static str] {
    match faction {
        Faction::Castle => &["PEASANT", "ARCHER", "GRIFFIN", "SWORDSMAN", "CAVALIER", "ANGEL"],
        Faction::Inferno => &["IMP", "DEMON", "PIT_FIEND", "DEVIL"],
        Faction::Necropolis => &["SKELETON", "ZOMBIE", "VAMPIRE", "BONE_DRAGON"],
        Faction::Neutral => &[],
    }
}

/// One creature dwelling and its recruitable pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dwelling {
    pub unit_id: String,
    pub tier: u8,
    pub growth: u32,
    pub cost: Resources,
    pub available: u32,
}

/// Result of a successful recruitment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recruitment {
    /// Treasury after paying
    pub resources: Resources,
    pub recruited: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Town {
    pub id: TownId,
    pub name: String,
    pub faction: Faction,
    pub owner: Option<PlayerId>,
    pub pos: GridPos,
    pub buildings: Vec<BuildingKind>,
    pub dwellings: Vec<Dwelling>,
}

impl Town {
    /// New town with a village hall and one week of growth in every dwelling
    pub fn new(
        id: TownId,
        name: &str,
        faction: Faction,
        pos: GridPos,
        owner: Option<PlayerId>,
        registry: &UnitRegistry,
    ) -> Self {
        let dwellings = faction_units(faction)
            .iter()
            .filter_map(|unit_id| registry.get(unit_id))
            .map(|t| Dwelling {
                unit_id: t.id.clone(),
                tier: t.tier,
                growth: t.growth,
                cost: t.cost,
                available: t.growth,
            })
            .collect();

        Self {
            id,
            name: name.to_string(),
            faction,
            owner,
            pos,
            buildings: vec![BuildingKind::VillageHall],
            dwellings,
        }
    }

    pub fn has_building(&self, kind: BuildingKind) -> bool {
        self.buildings.contains(&kind)
    }

    fn unlocked_tier(&self) -> u8 {
        self.buildings
            .iter()
            .filter_map(BuildingKind::max_unit_tier)
            .max()
            .unwrap_or(0)
    }

    /// Unit ids whose dwelling tier is unlocked by the fortifications
    pub fn available_units(&self) -> Vec<&str> {
        let max_tier = self.unlocked_tier();
        self.dwellings
            .iter()
            .filter(|d| d.tier <= max_tier)
            .map(|d| d.unit_id.as_str())
            .collect()
    }

    pub fn is_unit_available(&self, unit_id: &str) -> bool {
        self.available_units().contains(&unit_id)
    }

    /// Recruitable count of a unit (0 if locked or unknown)
    pub fn pool(&self, unit_id: &str) -> u32 {
        if !self.is_unit_available(unit_id) {
            return 0;
        }
        self.dwelling(unit_id).map_or(0, |d| d.available)
    }

    pub fn dwelling(&self, unit_id: &str) -> Option<&Dwelling> {
        self.dwellings.iter().find(|d| d.unit_id == unit_id)
    }

    /// Buildings not yet built whose prerequisite stands
    pub fn available_buildings(&self) -> Vec<BuildingKind> {
        BuildingKind::ALL
            .into_iter()
            .filter(|b| !self.has_building(*b))
            .filter(|b| b.requires().map_or(true, |r| self.has_building(r)))
            .collect()
    }

    /// Construct a building, returning the treasury after paying for it
    pub fn build(&mut self, kind: BuildingKind, resources: &Resources) -> Option<Resources> {
        if !self.available_buildings().contains(&kind) {
            return None;
        }
        let remaining = resources.spend(&kind.cost())?;
        self.buildings.push(kind);
        tracing::debug!(town = %self.name, building = kind.name(), "building constructed");
        Some(remaining)
    }

    /// Buy up to `count` creatures from the pool
    pub fn recruit(
        &mut self,
        unit_id: &str,
        count: u32,
        resources: &Resources,
    ) -> Option<Recruitment> {
        if !self.is_unit_available(unit_id) {
            return None;
        }
        let dwelling = self.dwellings.iter_mut().find(|d| d.unit_id == unit_id)?;
        let recruited = count.min(dwelling.available);
        if recruited == 0 {
            return None;
        }
        let remaining = resources.spend(&dwelling.cost.times(recruited))?;
        dwelling.available -= recruited;
        Some(Recruitment {
            resources: remaining,
            recruited,
        })
    }

    /// Daily income from the halls
    pub fn income(&self) -> Resources {
        Resources::gold(self.buildings.iter().map(BuildingKind::income).sum())
    }

    pub fn growth_multiplier(&self) -> f64 {
        1.0 + self
            .buildings
            .iter()
            .map(BuildingKind::growth_bonus)
            .sum::<f64>()
    }

    /// Weekly growth for every dwelling, locked or not
    pub fn refresh_unit_pools(&mut self) {
        let multiplier = self.growth_multiplier();
        for dwelling in &mut self.dwellings {
            dwelling.available += (dwelling.growth as f64 * multiplier).floor() as u32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn castle_town() -> Town {
        Town::new(
            TownId(1),
            "Steadwick",
            Faction::Castle,
            GridPos::new(3, 3),
            Some(PlayerId(1)),
            &UnitRegistry::standard(),
        )
    }

    fn rich() -> Resources {
        Resources {
            gold: 100_000,
            wood: 100,
            ore: 100,
            gems: 10,
            ..Resources::default()
        }
    }

    #[test]
    fn test_new_town_starts_with_village_hall() {
        let town = castle_town();
        assert_eq!(town.buildings, vec![BuildingKind::VillageHall]);
        assert_eq!(town.dwellings.len(), 6);
        assert!(town.available_units().is_empty());
        assert_eq!(town.income(), Resources::gold(500));
    }

    #[test]
    fn test_build_fort_unlocks_low_tiers() {
        let mut town = castle_town();
        let after = town.build(BuildingKind::Fort, &rich()).expect("fort affordable");
        assert_eq!(after.gold, 98_000);
        assert_eq!(town.available_units(), vec!["PEASANT", "ARCHER"]);
        assert_eq!(town.pool("GRIFFIN"), 0);
    }

    #[test]
    fn test_build_rejections() {
        let mut town = castle_town();
        // Already built
        assert!(town.build(BuildingKind::VillageHall, &rich()).is_none());
        // Missing prerequisite
        assert!(town.build(BuildingKind::Citadel, &rich()).is_none());
        // Unaffordable
        assert!(town.build(BuildingKind::Fort, &Resources::gold(100)).is_none());
        assert_eq!(town.buildings.len(), 1);
    }

    #[test]
    fn test_recruit_clamps_to_pool() {
        let mut town = castle_town();
        town.build(BuildingKind::Fort, &rich());
        let result = town
            .recruit("PEASANT", 100, &Resources::gold(1000))
            .expect("peasants for sale");
        assert_eq!(result.recruited, 14);
        assert_eq!(result.resources.gold, 1000 - 140);
        assert_eq!(town.pool("PEASANT"), 0);

        // Pool exhausted
        assert!(town.recruit("PEASANT", 1, &Resources::gold(1000)).is_none());
    }

    #[test]
    fn test_recruit_rejects_locked_or_unaffordable() {
        let mut town = castle_town();
        assert!(town.recruit("PEASANT", 1, &rich()).is_none());
        town.build(BuildingKind::Fort, &rich());
        assert!(town.recruit("ARCHER", 9, &Resources::gold(100)).is_none());
        assert_eq!(town.pool("ARCHER"), 9);
    }

    #[test]
    fn test_refresh_applies_growth_bonus() {
        let mut town = castle_town();
        town.buildings.push(BuildingKind::Fort);
        town.buildings.push(BuildingKind::Citadel);
        town.refresh_unit_pools();
        // 14 + floor(14 * 1.5)
        assert_eq!(town.pool("PEASANT"), 35);
    }

    #[test]
    fn test_available_buildings_follow_prerequisites() {
        let mut town = castle_town();
        let options = town.available_buildings();
        assert!(options.contains(&BuildingKind::TownHall));
        assert!(options.contains(&BuildingKind::Fort));
        assert!(!options.contains(&BuildingKind::Citadel));

        town.buildings.push(BuildingKind::Fort);
        assert!(town.available_buildings().contains(&BuildingKind::Citadel));
    }
}
