//! Spells on the battlefield
//!
//! The target is checked before any mana is spent, so a rejected cast
//! leaves both the caster and the stacks untouched.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::combat::error::CombatError;
use crate::combat::state::{CombatEventKind, CombatState, Side};
use crate::core::types::{GridPos, StackId};
use crate::spells::{self, CastContext, DamageArea, Spell, SpellEffect};
use crate::units::{Stat, StatusEffect, UnitStack};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellHit {
    pub stack: StackId,
    /// Damage dealt, hit points restored, or stat change applied
    pub amount: u32,
    pub kills: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellOutcome {
    pub spell_id: String,
    pub mana_spent: u32,
    pub hits: Vec<SpellHit>,
    pub summoned: Option<StackId>,
}

/// A validated cast, ready to apply
enum SpellPlan {
    Damage {
        target: StackId,
        amount: u32,
        area: DamageArea,
    },
    Modifier {
        target: StackId,
        stat: Option<Stat>,
        amount: i32,
        duration: u32,
        effect: Option<StatusEffect>,
    },
    Heal {
        target: StackId,
        amount: u32,
    },
    Resurrect {
        target: StackId,
        amount: u32,
    },
    Summon {
        unit: UnitStack,
        pos: GridPos,
    },
}

impl CombatState {
    /// Cast `spell_id` as the commander of `side`
    ///
    /// Damage and debuffs need an enemy target; buffs, heals and
    /// resurrection a friendly one. Summons ignore the target.
    pub fn cast_spell(
        &mut self,
        side: Side,
        spell_id: &str,
        target: Option<StackId>,
    ) -> Result<SpellOutcome, CombatError> {
        self.ensure_in_progress()?;
        let catalog = Arc::clone(&self.catalogs.spells);
        let spell = catalog
            .get(spell_id)
            .ok_or_else(|| CombatError::UnknownSpell(spell_id.to_string()))?;

        let commander = self.commander(side).ok_or(CombatError::NoCommander)?;
        spells::can_cast(spell, commander, CastContext::Combat)?;
        let effect = spells::preview(spell, commander);
        let caster_name = commander.name.clone();
        let plan = self.plan_spell(side, spell, effect, target)?;

        let commander = self.commander_mut(side).ok_or(CombatError::NoCommander)?;
        spells::cast(spell, commander, CastContext::Combat)?;

        let mut outcome = SpellOutcome {
            spell_id: spell.id.clone(),
            mana_spent: spell.mana_cost,
            hits: Vec::new(),
            summoned: None,
        };
        let description = match plan {
            SpellPlan::Damage { target, amount, area } => {
                outcome.hits = self.spell_damage(side, target, amount, area);
                let total: u32 = outcome.hits.iter().map(|h| h.amount).sum();
                let kills: u32 = outcome.hits.iter().map(|h| h.kills).sum();
                format!(
                    "{} casts {} for {} damage, killing {}.",
                    caster_name, spell.name, total, kills
                )
            }
            SpellPlan::Modifier { target, stat, amount, duration, effect } => {
                let stack = &mut self.stacks[target.0];
                let delta = stack.unit.add_buff(&spell.id, stat, amount, duration, effect);
                outcome.hits.push(SpellHit {
                    stack: target,
                    amount: delta.unsigned_abs(),
                    kills: 0,
                });
                format!("{} casts {} on {}.", caster_name, spell.name, stack.label())
            }
            SpellPlan::Heal { target, amount } => {
                let stack = &mut self.stacks[target.0];
                let before = stack.unit.total_hp();
                stack.unit = stack.unit.healed(amount);
                let healed = (stack.unit.total_hp() - before) as u32;
                outcome.hits.push(SpellHit { stack: target, amount: healed, kills: 0 });
                format!("{} heals {} for {} HP.", caster_name, stack.label(), healed)
            }
            SpellPlan::Resurrect { target, amount } => {
                let stack = &mut self.stacks[target.0];
                let was_dead = !stack.is_alive();
                let before = stack.unit.total_hp();
                stack.unit = stack.unit.revived(amount, stack.initial_count);
                let restored = (stack.unit.total_hp() - before) as u32;
                let label = stack.label();
                let pos = stack.pos;
                if was_dead {
                    // Joins the order from the next round on
                    stack.has_acted = true;
                    self.grid.occupy(pos, target);
                }
                outcome.hits.push(SpellHit { stack: target, amount: restored, kills: 0 });
                format!("{} restores {} HP to {}.", caster_name, restored, label)
            }
            SpellPlan::Summon { unit, pos } => {
                let summary = format!("{} {}", unit.count, unit.name);
                let id = self.spawn(unit, side, pos);
                self.stacks[id.0].has_acted = true;
                self.stacks[id.0].summoned = true;
                outcome.summoned = Some(id);
                self.log_event(
                    CombatEventKind::Summoned { stack: id },
                    format!("{} appear at {}.", summary, pos),
                );
                format!("{} casts {}.", caster_name, spell.name)
            }
        };

        self.log_event(
            CombatEventKind::SpellCast { side, spell_id: spell.id.clone() },
            description,
        );
        self.update_result();
        Ok(outcome)
    }

    fn plan_spell(
        &self,
        side: Side,
        spell: &Spell,
        effect: SpellEffect,
        target: Option<StackId>,
    ) -> Result<SpellPlan, CombatError> {
        let invalid = || CombatError::InvalidSpellTarget(spell.id.clone());

        match effect {
            SpellEffect::Damage { amount, area } => Ok(SpellPlan::Damage {
                target: self.spell_target(side, target, true).ok_or_else(invalid)?,
                amount,
                area,
            }),
            SpellEffect::Modifier { stat, amount, duration, effect } => Ok(SpellPlan::Modifier {
                target: self
                    .spell_target(side, target, spell.is_hostile())
                    .ok_or_else(invalid)?,
                stat,
                amount,
                duration,
                effect,
            }),
            SpellEffect::Heal { amount } => Ok(SpellPlan::Heal {
                target: self.spell_target(side, target, false).ok_or_else(invalid)?,
                amount,
            }),
            SpellEffect::Resurrect { amount } => {
                let id = target.ok_or_else(invalid)?;
                let stack = self.stack(id).ok_or(CombatError::UnknownStack(id))?;
                let full = stack.initial_count as u64 * stack.unit.hp as u64;
                if stack.side != side || stack.unit.total_hp() >= full {
                    return Err(invalid());
                }
                if !stack.is_alive() && self.grid.occupant(stack.pos).is_some() {
                    return Err(invalid());
                }
                Ok(SpellPlan::Resurrect { target: id, amount })
            }
            SpellEffect::Summon { unit, count } => {
                if count == 0 {
                    return Err(invalid());
                }
                let stack = self
                    .catalogs
                    .units
                    .create_stack(&unit, count)
                    .map_err(|_| CombatError::UnknownTemplate(unit.clone()))?;
                let pos = self
                    .grid
                    .free_cell_in_column(side.column())
                    .ok_or(CombatError::NoRoomToSummon)?;
                Ok(SpellPlan::Summon { unit: stack, pos })
            }
            SpellEffect::Adventure(_) => Err(CombatError::Spell(spells::SpellError::WrongContext(
                spell.id.clone(),
            ))),
        }
    }

    /// Living target on the expected side of the caster
    fn spell_target(&self, side: Side, target: Option<StackId>, enemy: bool) -> Option<StackId> {
        let stack = self.stack(target?)?;
        let wanted = if enemy { side.opponent() } else { side };
        (stack.is_alive() && stack.side == wanted).then_some(stack.id)
    }

    fn spell_damage(
        &mut self,
        side: Side,
        target: StackId,
        amount: u32,
        area: DamageArea,
    ) -> Vec<SpellHit> {
        match area {
            DamageArea::Single => vec![self.spell_hit(target, amount)],
            DamageArea::Burst => {
                let center = self.stacks[target.0].pos;
                let victims: Vec<StackId> = self
                    .stacks
                    .iter()
                    .filter(|s| s.is_alive() && s.pos.chebyshev(&center) <= 1)
                    .map(|s| s.id)
                    .collect();
                victims
                    .into_iter()
                    .map(|id| self.spell_hit(id, amount))
                    .collect()
            }
            DamageArea::Chain { jumps } => {
                let mut hits = vec![self.spell_hit(target, amount)];
                let mut from = self.stacks[target.0].pos;
                let mut amount = amount;
                for _ in 0..jumps {
                    amount /= 2;
                    if amount == 0 {
                        break;
                    }
                    let next = self
                        .living(side.opponent())
                        .filter(|s| hits.iter().all(|h| h.stack != s.id))
                        .min_by_key(|s| s.pos.manhattan(&from))
                        .map(|s| (s.id, s.pos));
                    let Some((id, pos)) = next else {
                        break;
                    };
                    hits.push(self.spell_hit(id, amount));
                    from = pos;
                }
                hits
            }
        }
    }

    fn spell_hit(&mut self, id: StackId, amount: u32) -> SpellHit {
        let kills = self.wound(id, amount);
        SpellHit { stack: id, amount, kills }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::state::{CombatResult, Commander};
    use crate::core::types::HeroId;
    use crate::spells::SpellError;
    use crate::units::UnitRegistry;

    fn army(units: &[(&str, u32)]) -> Vec<UnitStack> {
        let registry = UnitRegistry::standard();
        units
            .iter()
            .map(|(id, count)| registry.create_stack(id, *count).expect("known template"))
            .collect()
    }

    fn mage(spells: &[&str], mana: u32, spell_power: u32) -> Commander {
        Commander {
            hero_id: HeroId(1),
            name: "Xarfax".into(),
            attack: 1,
            defense: 1,
            spell_power,
            mana,
            spells: spells.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_damage_spell_hits_enemy_and_spends_mana() {
        let mut combat = CombatState::skirmish(&army(&[("PEASANT", 5)]), &army(&[("WOLF", 10)]), 1)
            .with_commander(Side::Attacker, mage(&["MAGIC_ARROW"], 20, 2));

        let outcome = combat
            .cast_spell(Side::Attacker, "MAGIC_ARROW", Some(StackId(1)))
            .expect("castable");
        assert_eq!(outcome.hits, vec![SpellHit { stack: StackId(1), amount: 20, kills: 2 }]);
        assert_eq!(combat.stacks[1].unit.count, 8);
        assert_eq!(combat.attacker_hero.as_ref().map(|c| c.mana), Some(15));
        // No retaliation from spells
        assert_eq!(combat.stacks[0].unit.count, 5);
    }

    #[test]
    fn test_insufficient_mana_rejected_without_effect() {
        let mut combat = CombatState::skirmish(&army(&[("PEASANT", 5)]), &army(&[("WOLF", 10)]), 1)
            .with_commander(Side::Attacker, mage(&["LIGHTNING_BOLT"], 9, 2));

        let result = combat.cast_spell(Side::Attacker, "LIGHTNING_BOLT", Some(StackId(1)));
        assert_eq!(
            result,
            Err(CombatError::Spell(SpellError::InsufficientMana { needed: 10, available: 9 }))
        );
        assert_eq!(combat.stacks[1].unit.count, 10);
        assert_eq!(combat.attacker_hero.as_ref().map(|c| c.mana), Some(9));
    }

    #[test]
    fn test_wrong_target_side_costs_nothing() {
        let mut combat = CombatState::skirmish(&army(&[("PEASANT", 5)]), &army(&[("WOLF", 10)]), 1)
            .with_commander(Side::Attacker, mage(&["MAGIC_ARROW", "HASTE"], 20, 1));

        assert!(matches!(
            combat.cast_spell(Side::Attacker, "MAGIC_ARROW", Some(StackId(0))),
            Err(CombatError::InvalidSpellTarget(_))
        ));
        assert!(matches!(
            combat.cast_spell(Side::Attacker, "HASTE", Some(StackId(1))),
            Err(CombatError::InvalidSpellTarget(_))
        ));
        assert_eq!(combat.attacker_hero.as_ref().map(|c| c.mana), Some(20));
    }

    #[test]
    fn test_guardians_cannot_cast() {
        let mut combat = CombatState::skirmish(&army(&[("PEASANT", 5)]), &army(&[("WOLF", 10)]), 1);
        assert_eq!(
            combat.cast_spell(Side::Defender, "MAGIC_ARROW", Some(StackId(0))),
            Err(CombatError::NoCommander)
        );
    }

    #[test]
    fn test_buff_applies_and_records_delta() {
        let mut combat = CombatState::skirmish(&army(&[("PEASANT", 5)]), &army(&[("WOLF", 10)]), 1)
            .with_commander(Side::Attacker, mage(&["HASTE"], 20, 1));
        combat.cast_spell(Side::Attacker, "HASTE", Some(StackId(0))).expect("castable");
        assert_eq!(combat.stacks[0].unit.speed, 6);
        assert_eq!(combat.stacks[0].unit.buffs.len(), 1);
    }

    #[test]
    fn test_fireball_hits_both_sides_in_blast() {
        let mut combat = CombatState::skirmish(
            &army(&[("SWORDSMAN", 5)]),
            &army(&[("WOLF", 10), ("ORC", 10)]),
            1,
        )
        .with_commander(Side::Attacker, mage(&["FIREBALL"], 20, 1));
        combat.relocate(StackId(0), GridPos::new(7, 4));
        combat.relocate(StackId(1), GridPos::new(7, 5));
        combat.relocate(StackId(2), GridPos::new(10, 5));

        let outcome = combat
            .cast_spell(Side::Attacker, "FIREBALL", Some(StackId(1)))
            .expect("castable");
        let hit: Vec<StackId> = outcome.hits.iter().map(|h| h.stack).collect();
        assert_eq!(hit, vec![StackId(0), StackId(1)]);
    }

    #[test]
    fn test_chain_lightning_halves_per_jump() {
        let mut combat = CombatState::skirmish(
            &army(&[("PEASANT", 1)]),
            &army(&[("OGRE", 10), ("OGRE", 10), ("OGRE", 10)]),
            1,
        )
        .with_commander(Side::Attacker, mage(&["CHAIN_LIGHTNING"], 30, 1));

        let outcome = combat
            .cast_spell(Side::Attacker, "CHAIN_LIGHTNING", Some(StackId(2)))
            .expect("castable");
        let amounts: Vec<u32> = outcome.hits.iter().map(|h| h.amount).collect();
        assert_eq!(amounts, vec![25, 12, 6]);
        assert_eq!(outcome.hits[0].stack, StackId(2));
    }

    #[test]
    fn test_heal_and_resurrect() {
        let mut combat = CombatState::skirmish(&army(&[("SWORDSMAN", 4)]), &army(&[("WOLF", 1)]), 1)
            .with_commander(Side::Attacker, mage(&["CURE", "RESURRECT"], 40, 1));
        combat.wound(StackId(0), 50);
        assert_eq!(combat.stacks[0].unit.count, 3);
        assert_eq!(combat.stacks[0].unit.current_hp, 20);

        let cure = combat.cast_spell(Side::Attacker, "CURE", Some(StackId(0))).expect("castable");
        assert_eq!(cure.hits[0].amount, 10);
        assert_eq!(combat.stacks[0].unit.current_hp, 30);

        let raise = combat
            .cast_spell(Side::Attacker, "RESURRECT", Some(StackId(0)))
            .expect("castable");
        assert_eq!(raise.hits[0].amount, 40);
        assert_eq!(combat.stacks[0].unit.count, 4);
        assert_eq!(combat.stacks[0].unit.total_hp(), 140);
    }

    #[test]
    fn test_resurrect_full_stack_rejected() {
        let mut combat = CombatState::skirmish(&army(&[("SWORDSMAN", 4)]), &army(&[("WOLF", 1)]), 1)
            .with_commander(Side::Attacker, mage(&["RESURRECT"], 40, 1));
        assert!(matches!(
            combat.cast_spell(Side::Attacker, "RESURRECT", Some(StackId(0))),
            Err(CombatError::InvalidSpellTarget(_))
        ));
    }

    #[test]
    fn test_summon_places_stack_on_own_column() {
        let mut combat = CombatState::skirmish(&army(&[("PEASANT", 5)]), &army(&[("WOLF", 10)]), 1)
            .with_commander(Side::Attacker, mage(&["SUMMON_ELEMENTAL"], 30, 3));

        let outcome = combat
            .cast_spell(Side::Attacker, "SUMMON_ELEMENTAL", None)
            .expect("castable");
        let id = outcome.summoned.expect("summoned stack");
        let ogres = &combat.stacks[id.0];
        assert_eq!(ogres.unit.template_id, "OGRE");
        assert_eq!(ogres.unit.count, 6);
        // Middle row is taken by the peasants
        assert_eq!(ogres.pos, GridPos::new(0, 4));
        assert!(ogres.has_acted);
    }

    #[test]
    fn test_lethal_spell_ends_combat() {
        let mut combat = CombatState::skirmish(&army(&[("PEASANT", 5)]), &army(&[("IMP", 2)]), 1)
            .with_commander(Side::Attacker, mage(&["LIGHTNING_BOLT"], 20, 1));
        combat
            .cast_spell(Side::Attacker, "LIGHTNING_BOLT", Some(StackId(1)))
            .expect("castable");
        assert_eq!(combat.result, CombatResult::AttackerWon);
    }
}
