//! Combat state - stacks, commanders, and the event log of one encounter

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::combat::constants::{ATTACKER_COLUMN, DEFENDER_COLUMN, MAX_ARMY_SLOTS};
use crate::combat::grid::CombatGrid;
use crate::core::catalogs::Catalogs;
use crate::core::config::CombatRules;
use crate::core::types::{GridPos, HeroId, ObjectId, StackId};
use crate::spells::Caster;
use crate::units::{HeroBonus, UnitStack};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Attacker,
    Defender,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Attacker => Side::Defender,
            Side::Defender => Side::Attacker,
        }
    }

    /// Column the side deploys (and summons) to
    pub fn column(&self) -> i32 {
        match self {
            Side::Attacker => ATTACKER_COLUMN,
            Side::Defender => DEFENDER_COLUMN,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Attacker => f.write_str("attacker"),
            Side::Defender => f.write_str("defender"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CombatResult {
    #[default]
    InProgress,
    AttackerWon,
    DefenderWon,
}

impl CombatResult {
    pub fn winner(&self) -> Option<Side> {
        match self {
            CombatResult::InProgress => None,
            CombatResult::AttackerWon => Some(Side::Attacker),
            CombatResult::DefenderWon => Some(Side::Defender),
        }
    }

    pub fn is_decided(&self) -> bool {
        *self != CombatResult::InProgress
    }
}

/// A unit stack on the battlefield with its per-round bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatStack {
    pub id: StackId,
    pub unit: UnitStack,
    pub side: Side,
    pub pos: GridPos,
    /// Creatures at deployment; resurrection never exceeds it
    pub initial_count: u32,
    pub has_acted: bool,
    pub has_retaliated: bool,
    pub wait_mode: bool,
    pub defend_mode: bool,
    /// Defense added by the current defend, removed exactly at round start
    pub defend_bonus: i32,
    /// Conjured mid-fight; vanishes when the combat ends
    pub summoned: bool,
}

impl CombatStack {
    pub fn is_alive(&self) -> bool {
        self.unit.is_alive()
    }

    pub fn label(&self) -> String {
        format!("{} ({})", self.unit.name, self.side)
    }
}

/// Snapshot of a hero commanding one side
///
/// Holds what combat needs: primary skills for damage bonuses and
/// mana for spells. Remaining mana is written back after the fight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commander {
    pub hero_id: HeroId,
    pub name: String,
    pub attack: i32,
    pub defense: i32,
    pub spell_power: u32,
    pub mana: u32,
    pub spells: Vec<String>,
}

impl Caster for Commander {
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEventKind {
    Started,
    RoundStarted,
    Attack {
        attacker: StackId,
        target: StackId,
        damage: u32,
        kills: u32,
        ranged: bool,
    },
    Retaliation {
        stack: StackId,
        damage: u32,
        kills: u32,
    },
    Moved {
        stack: StackId,
        from: GridPos,
        to: GridPos,
    },
    Waited {
        stack: StackId,
    },
    Defended {
        stack: StackId,
        bonus: i32,
    },
    SpellCast {
        side: Side,
        spell_id: String,
    },
    Summoned {
        stack: StackId,
    },
    BuffExpired {
        stack: StackId,
        spell_id: String,
    },
    Ended {
        result: CombatResult,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatEvent {
    pub round: u32,
    pub kind: CombatEventKind,
    pub description: String,
}

/// One encounter, from deployment to result
///
/// Created by the game when a hero meets an enemy hero or guardians,
/// mutated in place by every action and discarded after reconciliation.
#[derive(Debug, Clone)]
pub struct CombatState {
    pub grid: CombatGrid,
    /// Every stack ever deployed; dead ones stay so ids remain valid
    pub stacks: Vec<CombatStack>,
    /// Living stacks at round start, fastest first
    pub turn_order: Vec<StackId>,
    pub round: u32,
    pub result: CombatResult,
    pub log: Vec<CombatEvent>,
    pub attacker_hero: Option<Commander>,
    pub defender_hero: Option<Commander>,
    /// Map object being fought over, if any
    pub map_object: Option<ObjectId>,
    pub rules: CombatRules,
    pub(crate) catalogs: Catalogs,
    pub(crate) rng: ChaCha8Rng,
}

impl CombatState {
    /// Deploy both armies and open round 1
    pub fn new(
        catalogs: Catalogs,
        attacker_army: &[UnitStack],
        defender_army: &[UnitStack],
        seed: u64,
    ) -> Self {
        let mut state = Self {
            grid: CombatGrid::new(),
            stacks: Vec::new(),
            turn_order: Vec::new(),
            round: 1,
            result: CombatResult::InProgress,
            log: Vec::new(),
            attacker_hero: None,
            defender_hero: None,
            map_object: None,
            rules: CombatRules::default(),
            catalogs,
            rng: ChaCha8Rng::seed_from_u64(seed),
        };

        state.place_army(attacker_army, Side::Attacker);
        state.place_army(defender_army, Side::Defender);
        state.log_event(CombatEventKind::Started, "Combat begins!".to_string());
        state.start_first_round();
        state.update_result();
        state
    }

    /// Combat using the built-in roster and spell book
    pub fn skirmish(attacker_army: &[UnitStack], defender_army: &[UnitStack], seed: u64) -> Self {
        Self::new(Catalogs::standard(), attacker_army, defender_army, seed)
    }

    pub fn with_commander(mut self, side: Side, commander: Commander) -> Self {
        match side {
            Side::Attacker => self.attacker_hero = Some(commander),
            Side::Defender => self.defender_hero = Some(commander),
        }
        self
    }

    pub fn with_map_object(mut self, object: ObjectId) -> Self {
        self.map_object = Some(object);
        self
    }

    pub fn with_rules(mut self, rules: CombatRules) -> Self {
        self.rules = rules;
        self
    }

    /// Deploy up to seven living stacks down the side's column, evenly spaced
    fn place_army(&mut self, army: &[UnitStack], side: Side) {
        let deployable: Vec<&UnitStack> = army
            .iter()
            .filter(|stack| stack.is_alive())
            .take(MAX_ARMY_SLOTS)
            .collect();
        let rows = self.grid.deployment_rows(deployable.len());

        for (unit, y) in deployable.into_iter().zip(rows) {
            let pos = GridPos::new(side.column(), y);
            let mut unit = unit.clone();
            unit.clear_buffs();
            self.spawn(unit, side, pos);
        }
    }

    /// Add a stack to the battlefield and claim its cell
    pub(crate) fn spawn(&mut self, unit: UnitStack, side: Side, pos: GridPos) -> StackId {
        let id = StackId(self.stacks.len());
        self.stacks.push(CombatStack {
            id,
            initial_count: unit.count,
            unit,
            side,
            pos,
            has_acted: false,
            has_retaliated: false,
            wait_mode: false,
            defend_mode: false,
            defend_bonus: 0,
            summoned: false,
        });
        self.grid.occupy(pos, id);
        id
    }

    pub fn stack(&self, id: StackId) -> Option<&CombatStack> {
        self.stacks.get(id.0)
    }

    /// Living stack standing at `pos`
    pub fn stack_at(&self, pos: GridPos) -> Option<&CombatStack> {
        self.grid
            .occupant(pos)
            .and_then(|id| self.stack(id))
            .filter(|stack| stack.is_alive())
    }

    pub fn living(&self, side: Side) -> impl Iterator<Item = &CombatStack> {
        self.stacks
            .iter()
            .filter(move |stack| stack.side == side && stack.is_alive())
    }

    /// Living, non-summoned stacks of a side as plain army stacks,
    /// with defend bonuses and spell modifiers stripped
    pub fn survivors(&self, side: Side) -> Vec<UnitStack> {
        self.living(side)
            .filter(|stack| !stack.summoned)
            .map(|stack| {
                let mut unit = stack.unit.clone();
                unit.defense -= stack.defend_bonus;
                unit.clear_buffs();
                unit
            })
            .collect()
    }

    pub fn commander(&self, side: Side) -> Option<&Commander> {
        match side {
            Side::Attacker => self.attacker_hero.as_ref(),
            Side::Defender => self.defender_hero.as_ref(),
        }
    }

    pub(crate) fn commander_mut(&mut self, side: Side) -> Option<&mut Commander> {
        match side {
            Side::Attacker => self.attacker_hero.as_mut(),
            Side::Defender => self.defender_hero.as_mut(),
        }
    }

    /// Hero addends for a blow struck by `side` (0 for guardians)
    pub fn hero_bonus(&self, side: Side) -> HeroBonus {
        HeroBonus {
            attack: self.commander(side).map_or(0, |c| c.attack),
            defense: self.commander(side.opponent()).map_or(0, |c| c.defense),
        }
    }

    pub fn log_event(&mut self, kind: CombatEventKind, description: String) {
        tracing::debug!(round = self.round, "{}", description);
        self.log.push(CombatEvent {
            round: self.round,
            kind,
            description,
        });
    }

    /// Set the result once a side has no living stacks left
    pub fn update_result(&mut self) -> CombatResult {
        if self.result.is_decided() {
            return self.result;
        }
        if let Some(result) = check_combat_end(self) {
            self.result = result;
            let description = match result {
                CombatResult::AttackerWon => "Attacker wins the battle!",
                _ => "Defender wins the battle!",
            };
            self.log_event(CombatEventKind::Ended { result }, description.to_string());
        }
        self.result
    }
}

/// Result implied by the stacks still standing, None while both sides fight on
pub fn check_combat_end(state: &CombatState) -> Option<CombatResult> {
    if state.living(Side::Attacker).next().is_none() {
        return Some(CombatResult::DefenderWon);
    }
    if state.living(Side::Defender).next().is_none() {
        return Some(CombatResult::AttackerWon);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitRegistry;

    fn army(units: &[(&str, u32)]) -> Vec<UnitStack> {
        let registry = UnitRegistry::standard();
        units
            .iter()
            .map(|(id, count)| registry.create_stack(id, *count).expect("known template"))
            .collect()
    }

    #[test]
    fn test_armies_deploy_on_opposite_columns() {
        let combat = CombatState::skirmish(
            &army(&[("SWORDSMAN", 3), ("ARCHER", 5)]),
            &army(&[("WOLF", 10)]),
            7,
        );

        assert_eq!(combat.stacks.len(), 3);
        assert_eq!(combat.stacks[0].pos, GridPos::new(0, 3));
        assert_eq!(combat.stacks[1].pos, GridPos::new(0, 6));
        assert_eq!(combat.stacks[2].pos, GridPos::new(14, 5));
        assert_eq!(combat.grid.occupant(GridPos::new(14, 5)), Some(StackId(2)));
        assert_eq!(combat.round, 1);
        assert_eq!(combat.result, CombatResult::InProgress);
    }

    #[test]
    fn test_dead_stacks_are_not_deployed() {
        let mut attackers = army(&[("PEASANT", 5), ("ARCHER", 2)]);
        attackers[0].count = 0;
        let combat = CombatState::skirmish(&attackers, &army(&[("WOLF", 1)]), 1);
        assert_eq!(combat.living(Side::Attacker).count(), 1);
        assert_eq!(combat.stacks[0].unit.template_id, "ARCHER");
    }

    #[test]
    fn test_empty_side_is_decided_immediately() {
        let combat = CombatState::skirmish(&army(&[("PEASANT", 5)]), &[], 1);
        assert_eq!(combat.result, CombatResult::AttackerWon);
    }

    #[test]
    fn test_hero_bonus_uses_both_commanders() {
        let commander = |attack, defense| Commander {
            hero_id: HeroId(1),
            name: "Test".into(),
            attack,
            defense,
            spell_power: 1,
            mana: 0,
            spells: vec![],
        };
        let combat = CombatState::skirmish(&army(&[("PEASANT", 5)]), &army(&[("WOLF", 1)]), 1)
            .with_commander(Side::Attacker, commander(3, 1));

        assert_eq!(combat.hero_bonus(Side::Attacker), HeroBonus { attack: 3, defense: 0 });
        assert_eq!(combat.hero_bonus(Side::Defender), HeroBonus { attack: 0, defense: 1 });
    }
}
