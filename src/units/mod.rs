//! Unit stack model - creature templates, stacks, and damage math

pub mod damage;
pub mod stack;
pub mod template;

pub use damage::{calculate_damage, calculate_damage_with, HeroBonus};
pub use stack::{Buff, Stat, StatusEffect, UnitStack};
pub use template::{Faction, UnitRegistry, UnitTemplate};
