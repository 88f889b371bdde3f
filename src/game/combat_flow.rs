//! Driving the active combat and folding its result back into the game

use serde::{Deserialize, Serialize};

use super::state::{ActiveCombat, GamePhase, GameState, Phase};
use crate::combat::{ActionOutcome, CombatAction, CombatError, CombatResult, CombatState, Side};
use crate::core::error::{GameError, Result};
use crate::core::types::{GridPos, HeroId, ObjectId, PlayerId, StackId};
use crate::units::UnitStack;

/// An order for the stack whose turn it is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatCommand {
    /// Strike whatever stands on the cell
    Attack { target: GridPos },
    Move { to: GridPos },
    Wait,
    Defend,
    /// Cast from the acting side's commander; the target is a cell, if any
    CastSpell { spell_id: String, target: Option<GridPos> },
}

/// How a finished combat changed the adventure map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatSummary {
    pub result: CombatResult,
    pub rounds: u32,
    /// Experience awarded to a victorious attacker
    pub experience: u64,
    /// Town or mine taken by beating its guardians
    pub captured: Option<String>,
    pub fallen_hero: Option<HeroId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatStep {
    pub outcome: ActionOutcome,
    /// Present when this action ended the combat
    pub summary: Option<CombatSummary>,
}

fn phase_error(phase: GamePhase) -> GameError {
    match phase {
        GamePhase::GameOver => GameError::GameOver,
        other => GameError::WrongPhase(other),
    }
}

impl GameState {
    /// Let the current stack carry out one order
    ///
    /// Rejected orders leave the combat untouched. The turn advances after
    /// every accepted order, and a decided combat is reconciled at once.
    pub fn execute_combat_action(&mut self, command: CombatCommand) -> Result<CombatStep> {
        let phase = self.phase();
        let Phase::Combat(active) = &mut self.phase else {
            return Err(phase_error(phase));
        };
        let combat = &mut active.state;

        if combat.current_stack().is_none() {
            combat.advance_turn();
        }
        let actor = combat.current_stack().ok_or(CombatError::CombatOver)?;
        let action = command_to_action(combat, actor, command)?;
        let outcome = combat.perform(action)?;
        combat.advance_turn();

        let summary = if combat.result.is_decided() {
            Some(self.resolve_combat_end()?)
        } else {
            None
        };
        Ok(CombatStep { outcome, summary })
    }

    /// Finish the active combat heuristically
    ///
    /// Returns None when the iteration cap ran out first; the combat then
    /// stays open and may be resolved again.
    pub fn auto_resolve_combat(&mut self) -> Result<Option<CombatSummary>> {
        let phase = self.phase();
        let Phase::Combat(active) = &mut self.phase else {
            return Err(phase_error(phase));
        };
        let report = active.state.auto_resolve();
        if report.exhausted {
            return Ok(None);
        }
        self.resolve_combat_end().map(Some)
    }

    /// Apply a decided combat to heroes, guardians and map objects
    pub(crate) fn resolve_combat_end(&mut self) -> Result<CombatSummary> {
        match &self.phase {
            Phase::Combat(active) if active.state.result.is_decided() => {}
            _ => return Err(phase_error(self.phase())),
        }
        let ActiveCombat {
            state: combat,
            attacker,
            defender,
        } = match std::mem::replace(&mut self.phase, Phase::Adventure) {
            Phase::Combat(active) => *active,
            other => {
                self.phase = other;
                return Err(phase_error(self.phase()));
            }
        };

        let mut summary = CombatSummary {
            result: combat.result,
            rounds: combat.round,
            experience: 0,
            captured: None,
            fallen_hero: None,
        };

        match combat.result.winner() {
            Some(Side::Attacker) => {
                let experience: u64 = combat
                    .stacks
                    .iter()
                    .filter(|s| s.side == Side::Defender && !s.summoned)
                    .map(|s| s.unit.tier as u64 * self.config.experience_per_tier)
                    .sum();
                summary.experience = experience;

                let survivors = self.refit(combat.survivors(Side::Attacker));
                let mana = combat.attacker_hero.as_ref().map(|c| c.mana);
                let per_level = self.config.experience_per_level;
                let mut victor = None;
                if let Some(hero) = self.heroes.iter_mut().find(|h| h.id == attacker) {
                    hero.army = survivors;
                    if let Some(mana) = mana {
                        hero.mana = mana;
                    }
                    hero.gain_experience(experience);
                    hero.check_level_up(per_level, &mut self.rng);
                    victor = Some((hero.owner, hero.name.clone()));
                }

                if let Some((owner, name)) = victor {
                    self.log(format!("{} is victorious! Gained {} experience.", name, experience));
                    if let Some(object) = combat.map_object {
                        summary.captured = self.claim_object(object, owner);
                    }
                }
                if let Some(fallen) = defender.and_then(|d| self.remove_hero(d)) {
                    self.log(format!("{} has been defeated.", fallen.name));
                    summary.fallen_hero = Some(fallen.id);
                }
            }
            Some(Side::Defender) => {
                let survivors = self.refit(combat.survivors(Side::Defender));
                match (defender, combat.map_object) {
                    (Some(id), _) => {
                        let mana = combat.defender_hero.as_ref().map(|c| c.mana);
                        if let Some(hero) = self.hero_mut(id) {
                            hero.army = survivors;
                            if let Some(mana) = mana {
                                hero.mana = mana;
                            }
                        }
                    }
                    (None, Some(object)) => {
                        // Guardians keep what is left of them
                        if let Some(object) = self.map.object_mut(object) {
                            object.guardians = survivors;
                        }
                    }
                    (None, None) => {}
                }
                if let Some(fallen) = self.remove_hero(attacker) {
                    self.log(format!("{} has been defeated.", fallen.name));
                    summary.fallen_hero = Some(fallen.id);
                }
            }
            None => {}
        }

        if self.check_win_condition().is_none() {
            tracing::info!(result = ?combat.result, "combat over, back to the adventure map");
        }
        Ok(summary)
    }

    /// Give up on an undecided combat: both sides keep their survivors
    pub(crate) fn abandon_combat(&mut self) {
        let ActiveCombat {
            state: combat,
            attacker,
            defender,
        } = match std::mem::replace(&mut self.phase, Phase::Adventure) {
            Phase::Combat(active) => *active,
            other => {
                self.phase = other;
                return;
            }
        };
        tracing::warn!(round = combat.round, "combat abandoned undecided");

        let attackers = self.refit(combat.survivors(Side::Attacker));
        let defenders = self.refit(combat.survivors(Side::Defender));
        if let Some(hero) = self.hero_mut(attacker) {
            hero.army = attackers;
            hero.movement_points = 0.0;
        }
        match (defender, combat.map_object) {
            (Some(id), _) => {
                if let Some(hero) = self.hero_mut(id) {
                    hero.army = defenders;
                }
            }
            (None, Some(object)) => {
                if let Some(object) = self.map.object_mut(object) {
                    object.guardians = defenders;
                }
            }
            (None, None) => {}
        }
        self.log("The battle ends without a victor.");
    }

    /// Clear guardians, pay the reward and take ownership
    fn claim_object(&mut self, object_id: ObjectId, player: PlayerId) -> Option<String> {
        let object = self.map.object_mut(object_id)?;
        object.guardians.clear();
        let reward = std::mem::take(&mut object.reward_gold);
        let ownable = object.is_ownable();
        if ownable {
            object.owner = Some(player);
        }
        let (pos, name, is_town) = (object.pos, object.name(), object.is_town());

        if reward > 0 {
            if let Some(p) = self.player_mut(player) {
                p.resources.gold += reward;
            }
            self.log(format!("Found {} gold in the lair.", reward));
        }
        if is_town {
            self.capture_town_at(pos, player);
        }
        if ownable {
            self.log(format!("Captured {}!", name));
            return Some(name);
        }
        None
    }

    /// Refill ammunition on stacks returning from a fight
    fn refit(&self, mut stacks: Vec<UnitStack>) -> Vec<UnitStack> {
        for stack in &mut stacks {
            if let Some(template) = self.catalogs.units.get(&stack.template_id) {
                stack.shots_left = template.shots;
            }
        }
        stacks
    }
}

fn command_to_action(
    combat: &CombatState,
    actor: StackId,
    command: CombatCommand,
) -> Result<CombatAction> {
    let stack_on = |pos: GridPos| {
        combat
            .stack_at(pos)
            .map(|s| s.id)
            .ok_or(CombatError::NoTarget(pos))
    };
    Ok(match command {
        CombatCommand::Attack { target } => CombatAction::Attack {
            attacker: actor,
            target: stack_on(target)?,
        },
        CombatCommand::Move { to } => CombatAction::Move { stack: actor, to },
        CombatCommand::Wait => CombatAction::Wait { stack: actor },
        CombatCommand::Defend => CombatAction::Defend { stack: actor },
        CombatCommand::CastSpell { spell_id, target } => CombatAction::CastSpell {
            stack: actor,
            target: target.map(stack_on).transpose()?,
            spell_id,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::core::Catalogs;
    use crate::game::{GamePhase, Player};
    use crate::hero::HeroClass;
    use crate::map::{AdventureMap, MapObject, MapObjectKind};
    use crate::town::ResourceKind;

    /// One-row map with no towns
    fn duel_game(map: AdventureMap) -> GameState {
        let players = vec![
            Player::new(PlayerId(1), "One", false),
            Player::new(PlayerId(2), "Two", false),
        ];
        GameState::new(map, players, GameConfig::default(), Catalogs::standard(), 9).expect("game")
    }

    fn hero(
        game: &mut GameState,
        owner: u8,
        x: i32,
        army: &[(&str, u32)],
        spells: &[&str],
    ) -> HeroId {
        game.add_hero(HeroClass::Knight, PlayerId(owner), GridPos::new(x, 0), army, spells)
            .expect("hero")
    }

    #[test]
    fn test_orders_rejected_outside_combat() {
        let mut game = duel_game(AdventureMap::new(12, 1));
        assert!(matches!(
            game.execute_combat_action(CombatCommand::Wait),
            Err(GameError::WrongPhase(GamePhase::Adventure))
        ));
        assert!(matches!(game.auto_resolve_combat(), Err(GameError::WrongPhase(_))));
    }

    #[test]
    fn test_attacker_victory_removes_defender_and_ends_game() {
        let mut game = duel_game(AdventureMap::new(12, 1));
        let attacker = hero(&mut game, 1, 1, &[("SWORDSMAN", 20)], &[]);
        let defender = hero(&mut game, 2, 6, &[("PEASANT", 5)], &[]);
        game.start_hero_combat(attacker, defender).expect("combat");

        let summary = game.auto_resolve_combat().expect("in combat").expect("decided");
        assert_eq!(summary.result, CombatResult::AttackerWon);
        // One tier 1 stack
        assert_eq!(summary.experience, 100);
        assert_eq!(summary.fallen_hero, Some(defender));
        assert!(game.hero(defender).is_none());

        let victor = game.hero(attacker).expect("survives");
        assert_eq!(victor.experience, 100);
        assert!(victor.army.iter().all(|s| s.count > 0 && s.buffs.is_empty()));

        // Player 2 has neither heroes nor towns left
        assert_eq!(game.winner, Some(PlayerId(1)));
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert!(game.combat().is_none());
    }

    #[test]
    fn test_defender_victory_removes_attacker() {
        let mut game = duel_game(AdventureMap::new(12, 1));
        let attacker = hero(&mut game, 1, 1, &[("PEASANT", 2)], &[]);
        let defender = hero(&mut game, 2, 6, &[("SWORDSMAN", 20)], &[]);
        game.start_hero_combat(attacker, defender).expect("combat");

        let summary = game.auto_resolve_combat().expect("in combat").expect("decided");
        assert_eq!(summary.result, CombatResult::DefenderWon);
        assert_eq!(summary.experience, 0);
        assert!(game.hero(attacker).is_none());
        assert_eq!(game.hero(defender).map(|h| h.army.len()), Some(1));
        assert_eq!(game.winner, Some(PlayerId(2)));
    }

    #[test]
    fn test_beating_guardians_captures_the_mine() {
        let mut map = AdventureMap::new(12, 1);
        let guards = Catalogs::standard().units.create_stack("PEASANT", 3).expect("peasants");
        let mine = map.add_object(
            MapObject::new(
                GridPos::new(5, 0),
                MapObjectKind::Mine { resource: ResourceKind::Ore, amount: 2 },
            )
            .with_guardians(vec![guards]),
        );
        let mut game = duel_game(map);
        let attacker = hero(&mut game, 1, 1, &[("SWORDSMAN", 20)], &[]);
        hero(&mut game, 2, 11, &[("IMP", 5)], &[]);

        let report = game.move_hero_to(attacker, GridPos::new(5, 0)).expect("move");
        assert!(report.started_combat());
        let summary = game.auto_resolve_combat().expect("in combat").expect("decided");

        assert_eq!(summary.result, CombatResult::AttackerWon);
        assert!(summary.captured.is_some());
        let object = game.map.object(mine).expect("mine");
        assert_eq!(object.owner, Some(PlayerId(1)));
        assert!(!object.is_guarded());
        assert_eq!(game.phase(), GamePhase::Adventure);
        assert_eq!(game.winner, None);
    }

    #[test]
    fn test_single_actions_drive_the_round() {
        let mut game = duel_game(AdventureMap::new(12, 1));
        let attacker = hero(&mut game, 1, 1, &[("SWORDSMAN", 10)], &[]);
        let defender = hero(&mut game, 2, 6, &[("DEMON", 5)], &[]);
        game.start_hero_combat(attacker, defender).expect("combat");

        // Nothing stands there; the combat is unchanged
        let log_len = game.combat().map(|c| c.log.len());
        assert!(matches!(
            game.execute_combat_action(CombatCommand::Attack { target: GridPos::new(7, 7) }),
            Err(GameError::Combat(CombatError::NoTarget(_)))
        ));
        assert_eq!(game.combat().map(|c| c.log.len()), log_len);

        let step = game.execute_combat_action(CombatCommand::Defend).expect("defend");
        assert!(matches!(step.outcome, ActionOutcome::Defended { .. }));
        assert!(step.summary.is_none());

        let step = game.execute_combat_action(CombatCommand::Wait).expect("wait");
        assert!(matches!(step.outcome, ActionOutcome::Waited));
        assert_eq!(game.combat().map(|c| c.round), Some(2));
    }

    #[test]
    fn test_spent_mana_is_written_back() {
        let mut game = duel_game(AdventureMap::new(12, 1));
        let attacker = hero(&mut game, 1, 1, &[("SWORDSMAN", 20)], &["MAGIC_ARROW"]);
        let defender = hero(&mut game, 2, 6, &[("PEASANT", 20)], &[]);
        game.start_hero_combat(attacker, defender).expect("combat");

        let target = game
            .combat()
            .and_then(|c| c.living(Side::Defender).next().map(|s| s.pos))
            .expect("defender deployed");
        let step = game
            .execute_combat_action(CombatCommand::CastSpell {
                spell_id: "MAGIC_ARROW".to_string(),
                target: Some(target),
            })
            .expect("cast");
        assert!(matches!(step.outcome, ActionOutcome::Spell(_)));

        game.auto_resolve_combat().expect("in combat").expect("decided");
        assert_eq!(game.hero(attacker).map(|h| h.mana), Some(15));
    }
}
