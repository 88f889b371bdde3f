//! Things standing on the adventure map

use serde::{Deserialize, Serialize};

use crate::core::types::{GridPos, ObjectId, PlayerId};
use crate::town::{ResourceKind, Resources};
use crate::units::{Faction, UnitStack};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapObjectKind {
    Town { name: String, faction: Faction },
    /// Pays `amount` of `resource` to its owner every day
    Mine { resource: ResourceKind, amount: u32 },
    ResourcePile { resource: ResourceKind, amount: u32 },
    MonsterLair,
    TreasureChest { gold: u32, experience: u64 },
    Artifact { name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapObject {
    pub id: ObjectId,
    pub pos: GridPos,
    pub kind: MapObjectKind,
    pub owner: Option<PlayerId>,
    /// Neutral stacks that must be beaten before the object can be taken
    pub guardians: Vec<UnitStack>,
    pub reward_gold: u32,
    pub collected: bool,
}

impl MapObject {
    /// Unregistered object; the map assigns the id when it is added
    pub fn new(pos: GridPos, kind: MapObjectKind) -> Self {
        Self {
            id: ObjectId(0),
            pos,
            kind,
            owner: None,
            guardians: Vec::new(),
            reward_gold: 0,
            collected: false,
        }
    }

    pub fn with_owner(mut self, owner: PlayerId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_guardians(mut self, guardians: Vec<UnitStack>) -> Self {
        self.guardians = guardians;
        self
    }

    pub fn with_reward(mut self, gold: u32) -> Self {
        self.reward_gold = gold;
        self
    }

    pub fn is_guarded(&self) -> bool {
        self.guardians.iter().any(UnitStack::is_alive)
    }

    pub fn is_town(&self) -> bool {
        matches!(self.kind, MapObjectKind::Town { .. })
    }

    pub fn is_mine(&self) -> bool {
        matches!(self.kind, MapObjectKind::Mine { .. })
    }

    /// Ownable objects change hands when a hero takes them
    pub fn is_ownable(&self) -> bool {
        self.is_town() || self.is_mine()
    }

    pub fn name(&self) -> String {
        match &self.kind {
            MapObjectKind::Town { name, .. } => name.clone(),
            MapObjectKind::Mine { resource, .. } => match resource {
                ResourceKind::Gold => "Gold Mine".to_string(),
                ResourceKind::Wood => "Sawmill".to_string(),
                other => format!("{} mine", other.name()),
            },
            MapObjectKind::ResourcePile { resource, .. } => format!("{} pile", resource.name()),
            MapObjectKind::MonsterLair => "Monster Lair".to_string(),
            MapObjectKind::TreasureChest { .. } => "Treasure Chest".to_string(),
            MapObjectKind::Artifact { name } => name.clone(),
        }
    }

    /// Daily production for the owner, if this is an owned mine
    pub fn daily_income(&self) -> Resources {
        match self.kind {
            MapObjectKind::Mine { resource, amount } if self.owner.is_some() => {
                Resources::new().with(resource, amount)
            }
            _ => Resources::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitRegistry;

    #[test]
    fn test_guarded_only_while_guardians_live() {
        let registry = UnitRegistry::standard();
        let orcs = registry.create_stack("ORC", 5).expect("orc");
        let mut mine = MapObject::new(
            GridPos::new(4, 4),
            MapObjectKind::Mine { resource: ResourceKind::Ore, amount: 2 },
        )
        .with_guardians(vec![orcs]);
        assert!(mine.is_guarded());
        mine.guardians.clear();
        assert!(!mine.is_guarded());
    }

    #[test]
    fn test_mine_income_needs_owner() {
        let mine = MapObject::new(
            GridPos::new(1, 1),
            MapObjectKind::Mine { resource: ResourceKind::Gold, amount: 1000 },
        );
        assert!(mine.daily_income().is_empty());
        let owned = mine.with_owner(PlayerId(1));
        assert_eq!(owned.daily_income().gold, 1000);
    }
}
