//! Resources - a player's treasury and the price of things

use serde::{Deserialize, Serialize};
use std::fmt;

/// The seven resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Gold,
    Wood,
    Ore,
    Gems,
    Crystal,
    Sulfur,
    Mercury,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Gold,
        ResourceKind::Wood,
        ResourceKind::Ore,
        ResourceKind::Gems,
        ResourceKind::Crystal,
        ResourceKind::Sulfur,
        ResourceKind::Mercury,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Gold => "gold",
            ResourceKind::Wood => "wood",
            ResourceKind::Ore => "ore",
            ResourceKind::Gems => "gems",
            ResourceKind::Crystal => "crystal",
            ResourceKind::Sulfur => "sulfur",
            ResourceKind::Mercury => "mercury",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An amount of every resource kind
///
/// Used both as a treasury and as a cost. Amounts never go negative:
/// spending is all-or-nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resources {
    pub gold: u32,
    pub wood: u32,
    pub ore: u32,
    pub gems: u32,
    pub crystal: u32,
    pub sulfur: u32,
    pub mercury: u32,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gold-only amount
    pub fn gold(amount: u32) -> Self {
        Self {
            gold: amount,
            ..Self::default()
        }
    }

    /// Builder-style setter for a single kind
    pub fn with(mut self, kind: ResourceKind, amount: u32) -> Self {
        *self.get_mut(kind) = amount;
        self
    }

    /// Treasury a player starts the game with
    pub fn starting() -> Self {
        Self {
            gold: 5000,
            wood: 10,
            ore: 10,
            gems: 2,
            crystal: 2,
            sulfur: 2,
            mercury: 2,
        }
    }

    pub fn get(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Gold => self.gold,
            ResourceKind::Wood => self.wood,
            ResourceKind::Ore => self.ore,
            ResourceKind::Gems => self.gems,
            ResourceKind::Crystal => self.crystal,
            ResourceKind::Sulfur => self.sulfur,
            ResourceKind::Mercury => self.mercury,
        }
    }

    pub fn get_mut(&mut self, kind: ResourceKind) -> &mut u32 {
        match kind {
            ResourceKind::Gold => &mut self.gold,
            ResourceKind::Wood => &mut self.wood,
            ResourceKind::Ore => &mut self.ore,
            ResourceKind::Gems => &mut self.gems,
            ResourceKind::Crystal => &mut self.crystal,
            ResourceKind::Sulfur => &mut self.sulfur,
            ResourceKind::Mercury => &mut self.mercury,
        }
    }

    /// Check if every kind covers the cost
    pub fn can_afford(&self, cost: &Resources) -> bool {
        ResourceKind::ALL
            .iter()
            .all(|&kind| self.get(kind) >= cost.get(kind))
    }

    /// Pay a cost, returns the remaining treasury or None if unaffordable
    pub fn spend(&self, cost: &Resources) -> Option<Resources> {
        if !self.can_afford(cost) {
            return None;
        }
        let mut remaining = *self;
        for kind in ResourceKind::ALL {
            *remaining.get_mut(kind) -= cost.get(kind);
        }
        Some(remaining)
    }

    /// Sum of two amounts
    pub fn add(&self, other: &Resources) -> Resources {
        let mut total = *self;
        for kind in ResourceKind::ALL {
            let slot = total.get_mut(kind);
            *slot = slot.saturating_add(other.get(kind));
        }
        total
    }

    /// Cost of `count` items priced at `self`
    pub fn times(&self, count: u32) -> Resources {
        let mut total = *self;
        for kind in ResourceKind::ALL {
            let slot = total.get_mut(kind);
            *slot = slot.saturating_mul(count);
        }
        total
    }

    pub fn is_empty(&self) -> bool {
        ResourceKind::ALL.iter().all(|&kind| self.get(kind) == 0)
    }
}
