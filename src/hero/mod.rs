//! Heroes - army commanders that walk the adventure map

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::Commander;
use crate::core::types::{GridPos, HeroId, PlayerId};
use crate::spells::Caster;
use crate::units::{Faction, UnitStack};

/// Skill a class improves on every level-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimarySkill {
    Attack,
    SpellPower,
    Knowledge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeroClass {
    Knight,
    Warlock,
    Necromancer,
}

impl HeroClass {
    pub fn primary_skill(&self) -> PrimarySkill {
        match self {
            HeroClass::Knight => PrimarySkill::Attack,
            HeroClass::Warlock => PrimarySkill::SpellPower,
            HeroClass::Necromancer => PrimarySkill::Knowledge,
        }
    }

    pub fn faction(&self) -> Faction {
        match self {
            HeroClass::Knight => Faction::Castle,
            HeroClass::Warlock => Faction::Inferno,
            HeroClass::Necromancer => Faction::Necropolis,
        }
    }

    pub fn name_pool(&self) -> &'static [&'static str] {
        match self {
            HeroClass::Knight => &["Sir Galahad", "Lord Haart", "Lady Catherine", "Sir Christian"],
            HeroClass::Warlock => &["Rashka", "Xarfax", "Zydar", "Alamar"],
            HeroClass::Necromancer => &["Sandro", "Vidomina", "Thant", "Isra"],
        }
    }
}

/// Experience needed to leave `level`
pub fn experience_for_level(level: u32, per_level: u64) -> u64 {
    level as u64 * per_level
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    pub id: HeroId,
    pub name: String,
    pub class: HeroClass,
    pub owner: PlayerId,
    pub pos: GridPos,
    pub level: u32,
    pub experience: u64,
    pub attack: i32,
    pub defense: i32,
    pub spell_power: u32,
    pub knowledge: u32,
    pub mana: u32,
    pub max_mana: u32,
    pub movement_points: f64,
    pub max_movement_points: f64,
    pub army: Vec<UnitStack>,
    pub spells: Vec<String>,
}

impl Hero {
    /// Level 1 hero with class starting skills and a name drawn from the class pool
    pub fn new<R: Rng + ?Sized>(
        id: HeroId,
        class: HeroClass,
        owner: PlayerId,
        pos: GridPos,
        rng: &mut R,
    ) -> Self {
        let name = class
            .name_pool()
            .choose(rng)
            .copied()
            .unwrap_or("Nameless");
        let mana = if class == HeroClass::Warlock { 30 } else { 20 };

        Self {
            id,
            name: name.to_string(),
            class,
            owner,
            pos,
            level: 1,
            experience: 0,
            attack: if class == HeroClass::Knight { 2 } else { 1 },
            defense: if class == HeroClass::Knight { 2 } else { 1 },
            spell_power: if class == HeroClass::Warlock { 3 } else { 1 },
            knowledge: if class == HeroClass::Necromancer { 3 } else { 2 },
            mana,
            max_mana: mana,
            movement_points: 20.0,
            max_movement_points: 20.0,
            army: Vec::new(),
            spells: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_spells(mut self, spells: &[&str]) -> Self {
        self.spells = spells.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_movement(mut self, points: f64) -> Self {
        self.movement_points = points;
        self.max_movement_points = points;
        self
    }

    /// Merge into a stack of the same creature, or take a free slot.
    /// Returns false (and drops nothing) when the army is full.
    pub fn add_units(&mut self, stack: UnitStack, max_slots: usize) -> bool {
        if let Some(existing) = self
            .army
            .iter_mut()
            .find(|s| s.template_id == stack.template_id)
        {
            existing.count += stack.count;
            if existing.current_hp == 0 {
                existing.current_hp = existing.hp;
            }
            return true;
        }
        if self.army.len() < max_slots {
            self.army.push(stack);
            return true;
        }
        false
    }

    pub fn has_army(&self) -> bool {
        self.army.iter().any(UnitStack::is_alive)
    }

    pub fn gain_experience(&mut self, amount: u64) {
        self.experience += amount;
    }

    /// Apply at most one level-up if enough experience has accrued
    ///
    /// The primary skill always rises; the class's secondary skill rises
    /// on a coin flip. Mana capacity follows knowledge and is refilled.
    pub fn check_level_up<R: Rng + ?Sized>(&mut self, per_level: u64, rng: &mut R) -> bool {
        let needed = experience_for_level(self.level, per_level);
        if self.experience < needed {
            return false;
        }
        self.experience -= needed;
        self.level += 1;

        let lucky = rng.gen_bool(0.5);
        match self.class.primary_skill() {
            PrimarySkill::Attack => {
                self.attack += 1;
                self.defense += lucky as i32;
            }
            PrimarySkill::SpellPower => {
                self.spell_power += 1;
                self.knowledge += lucky as u32;
            }
            PrimarySkill::Knowledge => {
                self.knowledge += 1;
                self.spell_power += lucky as u32;
            }
        }

        self.max_mana = self.knowledge * 10;
        self.mana = self.max_mana;
        tracing::info!(hero = %self.name, level = self.level, "hero gained a level");
        true
    }

    pub fn reset_for_new_turn(&mut self) {
        self.movement_points = self.max_movement_points;
    }

    /// Combat snapshot of this hero
    pub fn commander(&self) -> Commander {
        Commander {
            hero_id: self.id,
            name: self.name.clone(),
            attack: self.attack,
            defense: self.defense,
            spell_power: self.spell_power,
            mana: self.mana,
            spells: self.spells.clone(),
        }
    }
}

impl Caster for Hero {
    fn spell_power(&self) -> u32 {
        self.spell_power
    }

    fn mana(&self) -> u32 {
        self.mana
    }

    fn knows_spell(&self, spell_id: &str) -> bool {
        self.spells.iter().any(|s| s == spell_id)
    }

    fn spend_mana(&mut self, amount: u32) {
        self.mana = self.mana.saturating_sub(amount);
    }
}
