//! Damage calculation between two stacks

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::units::stack::{StatusEffect, UnitStack};

/// Attack points above defense that still add damage (+5% each)
pub const MAX_ATTACK_ADVANTAGE: i32 = 20;
/// Defense points above attack that still reduce damage (-2.5% each)
pub const MAX_DEFENSE_ADVANTAGE: i32 = 28;

/// Temporary addends from the commanding heroes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroBonus {
    pub attack: i32,
    pub defense: i32,
}

/// Damage `attacker` deals to `defender`, without hero bonuses
pub fn calculate_damage<R: Rng + ?Sized>(
    attacker: &UnitStack,
    defender: &UnitStack,
    is_ranged: bool,
    rng: &mut R,
) -> u32 {
    calculate_damage_with(attacker, defender, is_ranged, HeroBonus::default(), rng)
}

/// Damage with the attacking hero's attack and the defending hero's
/// defense added to the stacks' own values
///
/// Always at least 1.
pub fn calculate_damage_with<R: Rng + ?Sized>(
    attacker: &UnitStack,
    defender: &UnitStack,
    is_ranged: bool,
    bonus: HeroBonus,
    rng: &mut R,
) -> u32 {
    let roll = roll_damage(attacker, rng) as u64;
    let mut total = roll * attacker.count as u64;

    let diff = (attacker.attack + bonus.attack) - (defender.defense + bonus.defense);
    if diff > 0 {
        let points = diff.min(MAX_ATTACK_ADVANTAGE) as u64;
        total = total * (100 + 5 * points) / 100;
    } else if diff < 0 {
        let points = (-diff).min(MAX_DEFENSE_ADVANTAGE) as u64;
        total = total * (1000 - 25 * points) / 1000;
    }

    // Shooter forced into melee
    if attacker.ranged && !is_ranged {
        total /= 2;
    }

    total.clamp(1, u32::MAX as u64) as u32
}

fn roll_damage<R: Rng + ?Sized>(stack: &UnitStack, rng: &mut R) -> u32 {
    let (min, max) = (stack.min_damage.min(stack.max_damage), stack.max_damage);
    if stack.has_effect(StatusEffect::MaxDamage) {
        max
    } else if stack.has_effect(StatusEffect::MinDamage) {
        min
    } else {
        rng.gen_range(min..=max)
    }
}
