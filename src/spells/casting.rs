//! The cast contract: check the caster, spend mana, hand back the effect
//!
//! Casting never touches a stack or the map. The combat resolver and the
//! adventure layer validate their targets first, then cast, then apply
//! the returned effect, so a rejected cast costs nothing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spells::catalog::{AdventureEffect, DamageArea, Spell, SpellCatalog, SpellKind};
use crate::units::{Stat, StatusEffect};

/// Anyone who can cast: a hero on the map or its snapshot in combat
pub trait Caster {
    fn spell_power(&self) -> u32;
    fn mana(&self) -> u32;
    fn knows_spell(&self, spell_id: &str) -> bool;
    fn spend_mana(&mut self, amount: u32);
}

/// Where the spell is being cast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CastContext {
    Combat,
    Adventure,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpellError {
    #[error("Spell {0} is not in the caster's spell book")]
    NotKnown(String),

    #[error("Not enough mana: need {needed}, have {available}")]
    InsufficientMana { needed: u32, available: u32 },

    #[error("Spell {0} cannot be cast here")]
    WrongContext(String),
}

/// Resolved magnitude of a cast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpellEffect {
    Damage {
        amount: u32,
        area: DamageArea,
    },
    /// Buffs carry a positive amount, debuffs a negative one
    Modifier {
        stat: Option<Stat>,
        amount: i32,
        duration: u32,
        effect: Option<StatusEffect>,
    },
    Heal {
        amount: u32,
    },
    Resurrect {
        amount: u32,
    },
    Summon {
        unit: String,
        count: u32,
    },
    Adventure(AdventureEffect),
}

/// Check whether `caster` could cast `spell` right now
pub fn can_cast(
    spell: &Spell,
    caster: &impl Caster,
    context: CastContext,
) -> Result<(), SpellError> {
    if !caster.knows_spell(&spell.id) {
        return Err(SpellError::NotKnown(spell.id.clone()));
    }
    if spell.is_adventure() != (context == CastContext::Adventure) {
        return Err(SpellError::WrongContext(spell.id.clone()));
    }
    if caster.mana() < spell.mana_cost {
        return Err(SpellError::InsufficientMana {
            needed: spell.mana_cost,
            available: caster.mana(),
        });
    }
    Ok(())
}

/// Effect the spell would have for this caster, without spending anything
pub fn preview(spell: &Spell, caster: &impl Caster) -> SpellEffect {
    let power = caster.spell_power();
    match &spell.kind {
        SpellKind::Damage { base, area } => SpellEffect::Damage {
            amount: base.saturating_mul(power),
            area: *area,
        },
        SpellKind::Buff { stat, bonus, duration, effect } => SpellEffect::Modifier {
            stat: *stat,
            amount: *bonus,
            duration: *duration,
            effect: *effect,
        },
        SpellKind::Debuff { stat, penalty, duration, effect } => SpellEffect::Modifier {
            stat: *stat,
            amount: -*penalty,
            duration: *duration,
            effect: *effect,
        },
        SpellKind::Heal { base } => SpellEffect::Heal {
            amount: base.saturating_mul(power),
        },
        SpellKind::Resurrect { base } => SpellEffect::Resurrect {
            amount: base.saturating_mul(power),
        },
        SpellKind::Summon { unit, base_count } => SpellEffect::Summon {
            unit: unit.clone(),
            count: base_count.saturating_mul(power),
        },
        SpellKind::Adventure(effect) => SpellEffect::Adventure(*effect),
    }
}

/// Cast: validate, deduct mana, return the effect to apply
pub fn cast(
    spell: &Spell,
    caster: &mut impl Caster,
    context: CastContext,
) -> Result<SpellEffect, SpellError> {
    can_cast(spell, &*caster, context)?;
    let effect = preview(spell, &*caster);
    caster.spend_mana(spell.mana_cost);
    Ok(effect)
}

/// Spells from the caster's book it can afford in this context
pub fn available_spells<'a>(
    catalog: &'a SpellCatalog,
    caster: &impl Caster,
    context: CastContext,
) -> Vec<&'a Spell> {
    let mut spells: Vec<&Spell> = catalog
        .iter()
        .filter(|spell| can_cast(spell, caster, context).is_ok())
        .collect();
    spells.sort_by(|a, b| a.id.cmp(&b.id));
    spells
}
