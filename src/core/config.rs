//! Game configuration with documented constants
//!
//! All tunable numbers are collected here with explanations of their purpose
//! and how they interact with each other. A config can be loaded from TOML;
//! keys that are missing fall back to the defaults below.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{GameError, Result};
use crate::town::Resources;

/// Rules copied into every combat at creation time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatRules {
    /// Multiplier applied to a defending stack's defense for one round
    ///
    /// The boosted value is floored. The exact bonus is remembered on the
    /// stack so the next round start subtracts precisely what was added.
    pub defend_multiplier: f64,

    /// Iterations auto-resolve may spend before giving up
    ///
    /// Each iteration is either one stack action or one round rollover.
    /// Exhausting the cap leaves the combat in progress and logs a warning.
    pub auto_resolve_iteration_cap: u32,
}

impl Default for CombatRules {
    fn default() -> Self {
        Self {
            defend_multiplier: 1.3,
            auto_resolve_iteration_cap: 100,
        }
    }
}

/// Configuration for the adventure layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === COMBAT ===
    pub combat: CombatRules,

    /// Experience granted to a winning attacker per tier of each defeated stack
    ///
    /// A defender army of one tier 4 and one tier 1 stack is worth 500 XP
    /// at the default of 100.
    pub experience_per_tier: u64,

    // === HEROES ===
    /// Experience a hero needs per current level to gain the next one
    ///
    /// Level 1 -> 2 costs 1000, level 2 -> 3 costs 2000, and so on.
    pub experience_per_level: u64,

    /// Movement points restored to every hero at the start of its owner's turn
    pub hero_movement_points: f64,

    /// Maximum number of distinct stacks in a hero army
    pub max_army_slots: usize,

    /// Fog-of-war radius revealed around a hero after it moves
    pub vision_radius: i32,

    /// Radius revealed by the View Map adventure spell
    pub view_map_radius: i32,

    // === ECONOMY ===
    /// Turns per week; dwellings refresh whenever the turn counter is a multiple
    pub week_length: u32,

    /// Resources each player starts with
    pub starting_resources: Resources,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            combat: CombatRules::default(),
            experience_per_tier: 100,
            experience_per_level: 1000,
            hero_movement_points: 20.0,
            max_army_slots: 7,
            vision_radius: 5,
            view_map_radius: 10,
            week_length: 7,
            starting_resources: Resources::starting(),
        }
    }
}

impl GameConfig {
    /// Parse a config from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(contents)?;
        config.validate().map_err(GameError::InvalidConfig)?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Validate that configuration values are sensible
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.combat.defend_multiplier < 1.0 {
            return Err("defend_multiplier must be at least 1.0".into());
        }
        if self.combat.auto_resolve_iteration_cap == 0 {
            return Err("auto_resolve_iteration_cap must be positive".into());
        }
        if self.experience_per_level == 0 {
            return Err("experience_per_level must be positive".into());
        }
        if self.hero_movement_points <= 0.0 {
            return Err("hero_movement_points must be positive".into());
        }
        if self.max_army_slots == 0 || self.max_army_slots > crate::combat::MAX_ARMY_SLOTS {
            return Err(format!(
                "max_army_slots must be between 1 and {}",
                crate::combat::MAX_ARMY_SLOTS
            ));
        }
        if self.week_length == 0 {
            return Err("week_length must be positive".into());
        }
        if self.vision_radius < 0 || self.view_map_radius < 0 {
            return Err("visibility radii must not be negative".into());
        }
        Ok(())
    }
}
