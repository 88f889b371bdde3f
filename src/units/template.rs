//! Unit templates and the registry stacks are created from

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::{GameError, Result};
use crate::town::Resources;
use crate::units::stack::UnitStack;

/// Faction a creature (or town, or hero class) belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Castle,
    Inferno,
    Necropolis,
    Neutral,
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Faction::Castle => "Castle",
            Faction::Inferno => "Inferno",
            Faction::Necropolis => "Necropolis",
            Faction::Neutral => "Neutral",
        };
        f.write_str(name)
    }
}

/// Static definition of a creature type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTemplate {
    pub id: String,
    pub name: String,
    pub faction: Faction,
    /// Power class 1-7
    pub tier: u8,
    pub attack: i32,
    pub defense: i32,
    pub min_damage: u32,
    pub max_damage: u32,
    /// Hit points per creature
    pub hp: u32,
    pub speed: i32,
    #[serde(default)]
    pub cost: Resources,
    /// Creatures added to a town's pool each week
    #[serde(default)]
    pub growth: u32,
    #[serde(default)]
    pub ranged: bool,
    #[serde(default)]
    pub shots: u32,
    #[serde(default)]
    pub flying: bool,
    #[serde(default)]
    pub no_retaliation: bool,
    #[serde(default)]
    pub unlimited_retaliation: bool,
}

impl UnitTemplate {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: &str,
        name: &str,
        faction: Faction,
        tier: u8,
        attack: i32,
        defense: i32,
        damage: (u32, u32),
        hp: u32,
        speed: i32,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            faction,
            tier,
            attack,
            defense,
            min_damage: damage.0,
            max_damage: damage.1,
            hp,
            speed,
            cost: Resources::default(),
            growth: 0,
            ranged: false,
            shots: 0,
            flying: false,
            no_retaliation: false,
            unlimited_retaliation: false,
        }
    }

    pub fn with_cost(mut self, cost: Resources) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_growth(mut self, growth: u32) -> Self {
        self.growth = growth;
        self
    }

    pub fn with_shots(mut self, shots: u32) -> Self {
        self.ranged = true;
        self.shots = shots;
        self
    }

    pub fn flying(mut self) -> Self {
        self.flying = true;
        self
    }

    pub fn no_retaliation(mut self) -> Self {
        self.no_retaliation = true;
        self
    }

    pub fn unlimited_retaliation(mut self) -> Self {
        self.unlimited_retaliation = true;
        self
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.hp == 0 {
            return Err(format!("{}: hp must be positive", self.id));
        }
        if self.min_damage > self.max_damage {
            return Err(format!("{}: min_damage exceeds max_damage", self.id));
        }
        if !(1..=7).contains(&self.tier) {
            return Err(format!("{}: tier must be 1-7", self.id));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct RosterFile {
    #[serde(rename = "unit", default)]
    units: Vec<UnitTemplate>,
}

/// Lookup table of every creature the game knows about
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    templates: AHashMap<String, UnitTemplate>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, template: UnitTemplate) {
        self.templates.insert(template.id.clone(), template);
    }

    pub fn get(&self, id: &str) -> Option<&UnitTemplate> {
        self.templates.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitTemplate> {
        self.templates.values()
    }

    /// Instantiate a stack of `count` creatures
    ///
    /// An unregistered id is a content bug, reported as `UnknownTemplate`.
    pub fn create_stack(&self, template_id: &str, count: u32) -> Result<UnitStack> {
        self.get(template_id)
            .map(|template| UnitStack::from_template(template, count))
            .ok_or_else(|| GameError::UnknownTemplate(template_id.to_string()))
    }

    /// Parse a roster from TOML (`[[unit]]` tables)
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: RosterFile = toml::from_str(contents)?;
        let mut registry = Self::new();
        for template in file.units {
            template.validate().map_err(GameError::InvalidConfig)?;
            registry.insert(template);
        }
        Ok(registry)
    }

    /// The built-in creature roster
    pub fn standard() -> Self {
        use Faction::*;

        let gold = Resources::gold;
        let roster = [
            // Castle
            UnitTemplate::new("PEASANT", "Peasant", Castle, 1, 1, 1, (1, 1), 3, 3)
                .with_cost(gold(10))
                .with_growth(14),
            UnitTemplate::new("ARCHER", "Archer", Castle, 2, 6, 3, (2, 3), 10, 4)
                .with_cost(gold(100))
                .with_growth(9)
                .with_shots(12),
            UnitTemplate::new("GRIFFIN", "Griffin", Castle, 3, 8, 8, (3, 6), 25, 6)
                .with_cost(gold(200))
                .with_growth(7)
                .flying()
                .unlimited_retaliation(),
            UnitTemplate::new("SWORDSMAN", "Swordsman", Castle, 4, 10, 12, (6, 9), 35, 5)
                .with_cost(gold(300))
                .with_growth(4),
            UnitTemplate::new("CAVALIER", "Cavalier", Castle, 5, 15, 15, (15, 25), 100, 7)
                .with_cost(gold(1000))
                .with_growth(2),
            UnitTemplate::new("ANGEL", "Angel", Castle, 7, 20, 20, (50, 50), 200, 12)
                .with_cost(Resources { gold: 3000, gems: 1, ..Resources::default() })
                .with_growth(1)
                .flying(),
            // Inferno
            UnitTemplate::new("IMP", "Imp", Inferno, 1, 2, 0, (1, 2), 4, 5)
                .with_cost(gold(50))
                .with_growth(15)
                .flying(),
            UnitTemplate::new("DEMON", "Demon", Inferno, 4, 10, 10, (7, 9), 35, 5)
                .with_cost(gold(250))
                .with_growth(4),
            UnitTemplate::new("PIT_FIEND", "Pit Fiend", Inferno, 5, 13, 13, (13, 17), 45, 6)
                .with_cost(gold(500))
                .with_growth(3),
            UnitTemplate::new("DEVIL", "Devil", Inferno, 7, 19, 21, (30, 40), 160, 11)
                .with_cost(Resources { gold: 2700, gems: 1, ..Resources::default() })
                .with_growth(1)
                .flying(),
            // Necropolis
            UnitTemplate::new("SKELETON", "Skeleton", Necropolis, 1, 5, 4, (1, 3), 6, 4)
                .with_cost(gold(60))
                .with_growth(12),
            UnitTemplate::new("ZOMBIE", "Zombie", Necropolis, 2, 5, 5, (2, 3), 20, 3)
                .with_cost(gold(100))
                .with_growth(8),
            UnitTemplate::new("VAMPIRE", "Vampire", Necropolis, 4, 10, 9, (5, 8), 30, 6)
                .with_cost(gold(360))
                .with_growth(4)
                .flying()
                .no_retaliation(),
            UnitTemplate::new("BONE_DRAGON", "Bone Dragon", Necropolis, 7, 17, 15, (25, 50), 150, 9)
                .with_cost(gold(1800))
                .with_growth(1)
                .flying(),
            // Neutral
            UnitTemplate::new("WOLF", "Wolf", Neutral, 1, 4, 2, (1, 3), 8, 6).with_cost(gold(50)),
            UnitTemplate::new("ORC", "Orc", Neutral, 2, 6, 4, (2, 5), 15, 4).with_cost(gold(120)),
            UnitTemplate::new("OGRE", "Ogre", Neutral, 4, 13, 7, (8, 16), 40, 3)
                .with_cost(gold(300)),
            UnitTemplate::new("DRAGON", "Red Dragon", Neutral, 7, 19, 19, (40, 50), 180, 11)
                .with_cost(gold(2500))
                .flying(),
        ];

        let mut registry = Self::new();
        for template in roster {
            registry.insert(template);
        }
        registry
    }
}
