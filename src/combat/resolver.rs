//! Attack/move resolver - one stack action per call
//!
//! Every action validates first and mutates second. An `Err` means the
//! combat state is exactly as it was before the call.

use serde::{Deserialize, Serialize};

use crate::combat::error::CombatError;
use crate::combat::spellcast::SpellOutcome;
use crate::combat::state::{CombatEventKind, CombatStack, CombatState, Side};
use crate::core::types::{GridPos, StackId};
use crate::units::calculate_damage_with;

/// The closed set of things a stack can do with its turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatAction {
    Attack {
        attacker: StackId,
        target: StackId,
    },
    /// A bare move consumes the whole action
    Move {
        stack: StackId,
        to: GridPos,
    },
    Wait {
        stack: StackId,
    },
    Defend {
        stack: StackId,
    },
    /// The acting stack's commander casts; the stack's turn is spent
    CastSpell {
        stack: StackId,
        spell_id: String,
        target: Option<StackId>,
    },
}

impl CombatAction {
    /// The stack spending its turn on this action
    pub fn actor(&self) -> StackId {
        match self {
            CombatAction::Attack { attacker, .. } => *attacker,
            CombatAction::Move { stack, .. }
            | CombatAction::Wait { stack }
            | CombatAction::Defend { stack }
            | CombatAction::CastSpell { stack, .. } => *stack,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOutcome {
    pub damage: u32,
    pub kills: u32,
    pub retaliation_damage: u32,
    pub retaliation_kills: u32,
    pub ranged: bool,
    /// Cell the attacker walked to before striking
    pub relocated_to: Option<GridPos>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionOutcome {
    Attack(AttackOutcome),
    Moved { from: GridPos, to: GridPos },
    Waited,
    Defended { bonus: i32 },
    Spell(SpellOutcome),
}

impl CombatState {
    /// Dispatch one action for the stack whose turn it is
    pub fn perform(&mut self, action: CombatAction) -> Result<ActionOutcome, CombatError> {
        self.ensure_turn(action.actor())?;
        match action {
            CombatAction::Attack { attacker, target } => {
                self.attack(attacker, target).map(ActionOutcome::Attack)
            }
            CombatAction::Move { stack, to } => {
                let from = self.move_stack(stack, to)?;
                self.stacks[stack.0].has_acted = true;
                Ok(ActionOutcome::Moved { from, to })
            }
            CombatAction::Wait { stack } => self.wait(stack).map(|_| ActionOutcome::Waited),
            CombatAction::Defend { stack } => {
                self.defend(stack).map(|bonus| ActionOutcome::Defended { bonus })
            }
            CombatAction::CastSpell { stack, spell_id, target } => {
                let side = self.living_stack(stack)?.side;
                let outcome = self.cast_spell(side, &spell_id, target)?;
                self.stacks[stack.0].has_acted = true;
                Ok(ActionOutcome::Spell(outcome))
            }
        }
    }

    /// Only the current stack may act, and only once per round
    pub(crate) fn ensure_turn(&self, id: StackId) -> Result<(), CombatError> {
        self.ensure_in_progress()?;
        self.living_stack(id)?;
        if self.current_stack() != Some(id) {
            return Err(CombatError::NotYourTurn);
        }
        Ok(())
    }

    pub(crate) fn living_stack(&self, id: StackId) -> Result<&CombatStack, CombatError> {
        let stack = self.stack(id).ok_or(CombatError::UnknownStack(id))?;
        if !stack.is_alive() {
            return Err(CombatError::DeadStack(id));
        }
        Ok(stack)
    }

    pub(crate) fn ensure_in_progress(&self) -> Result<(), CombatError> {
        if self.result.is_decided() {
            return Err(CombatError::CombatOver);
        }
        Ok(())
    }

    /// Strike `target`, walking next to it first if needed; the target
    /// retaliates once per round against melee blows
    pub fn attack(
        &mut self,
        attacker: StackId,
        target: StackId,
    ) -> Result<AttackOutcome, CombatError> {
        self.ensure_in_progress()?;
        let (a, t) = (self.living_stack(attacker)?, self.living_stack(target)?);
        if a.side == t.side {
            return Err(CombatError::SameSide);
        }

        let distance = a.pos.manhattan(&t.pos);
        let ranged = a.unit.ranged && a.unit.shots_left > 0 && distance > 1;

        let relocated_to = if !ranged && distance > 2 {
            let cell = self
                .grid
                .find_adjacent_open_cell(t.pos, a.pos, a.unit.movement_budget())
                .ok_or(CombatError::TargetUnreachable)?;
            Some(cell)
        } else {
            None
        };

        // Validation done; from here on the blow lands
        let attacker_side = a.side;
        if let Some(cell) = relocated_to {
            self.relocate(attacker, cell);
        }

        let bonus = self.hero_bonus(attacker_side);
        let damage = calculate_damage_with(
            &self.stacks[attacker.0].unit,
            &self.stacks[target.0].unit,
            ranged,
            bonus,
            &mut self.rng,
        );
        let kills = self.wound(target, damage);
        if ranged {
            let shooter = &mut self.stacks[attacker.0].unit;
            shooter.shots_left = shooter.shots_left.saturating_sub(1);
        }

        let mut retaliation_damage = 0;
        let mut retaliation_kills = 0;
        let defender = &self.stacks[target.0];
        let retaliates = defender.is_alive()
            && !defender.has_retaliated
            && !ranged
            && !self.stacks[attacker.0].unit.no_retaliation;
        if retaliates {
            let bonus = self.hero_bonus(attacker_side.opponent());
            retaliation_damage = calculate_damage_with(
                &self.stacks[target.0].unit,
                &self.stacks[attacker.0].unit,
                false,
                bonus,
                &mut self.rng,
            );
            retaliation_kills = self.wound(attacker, retaliation_damage);
            let defender = &mut self.stacks[target.0];
            if !defender.unit.unlimited_retaliation {
                defender.has_retaliated = true;
            }
        }

        self.stacks[attacker.0].has_acted = true;

        let description = self.describe_attack(
            attacker,
            target,
            damage,
            kills,
            retaliates.then_some((retaliation_damage, retaliation_kills)),
        );
        self.log_event(
            CombatEventKind::Attack { attacker, target, damage, kills, ranged },
            description,
        );
        if retaliates {
            let description = format!("{} strikes back.", self.stacks[target.0].label());
            self.log_event(
                CombatEventKind::Retaliation {
                    stack: target,
                    damage: retaliation_damage,
                    kills: retaliation_kills,
                },
                description,
            );
        }
        self.update_result();

        Ok(AttackOutcome {
            damage,
            kills,
            retaliation_damage,
            retaliation_kills,
            ranged,
            relocated_to,
        })
    }

    /// Move within range to an open cell; the caller decides whether the
    /// move used up the turn. Returns the cell left behind.
    pub fn move_stack(&mut self, id: StackId, to: GridPos) -> Result<GridPos, CombatError> {
        self.ensure_in_progress()?;
        let stack = self.living_stack(id)?;
        let cell = self.grid.get_cell(to).ok_or(CombatError::OutOfBounds(to))?;
        if cell.obstacle {
            return Err(CombatError::Obstacle(to));
        }
        if cell.occupant.is_some() {
            return Err(CombatError::Occupied(to));
        }
        if stack.pos.manhattan(&to) > stack.unit.movement_budget() {
            return Err(CombatError::OutOfRange(to));
        }

        let from = stack.pos;
        self.relocate(id, to);
        let label = self.stacks[id.0].label();
        self.log_event(
            CombatEventKind::Moved { stack: id, from, to },
            format!("{} moves to {}.", label, to),
        );
        Ok(from)
    }

    /// Give up the rest of the round
    pub fn wait(&mut self, id: StackId) -> Result<(), CombatError> {
        self.ensure_in_progress()?;
        self.living_stack(id)?;
        let stack = &mut self.stacks[id.0];
        stack.wait_mode = true;
        stack.has_acted = true;
        let label = stack.label();
        self.log_event(CombatEventKind::Waited { stack: id }, format!("{} waits.", label));
        Ok(())
    }

    /// Raise defense until the next round starts; returns the bonus
    pub fn defend(&mut self, id: StackId) -> Result<i32, CombatError> {
        self.ensure_in_progress()?;
        self.living_stack(id)?;
        let multiplier = self.rules.defend_multiplier;
        let stack = &mut self.stacks[id.0];
        if stack.defend_mode {
            stack.unit.defense -= stack.defend_bonus;
        }
        let base = stack.unit.defense;
        let bonus = ((base as f64) * multiplier).floor() as i32 - base;
        stack.unit.defense += bonus;
        stack.defend_bonus = bonus;
        stack.defend_mode = true;
        stack.has_acted = true;
        let label = stack.label();
        self.log_event(
            CombatEventKind::Defended { stack: id, bonus },
            format!("{} defends.", label),
        );
        Ok(bonus)
    }

    pub(crate) fn relocate(&mut self, id: StackId, to: GridPos) {
        let from = self.stacks[id.0].pos;
        self.grid.vacate(from, id);
        self.grid.occupy(to, id);
        self.stacks[id.0].pos = to;
    }

    /// Apply damage to a stack, freeing its cell if it dies; returns kills
    pub(crate) fn wound(&mut self, id: StackId, damage: u32) -> u32 {
        let stack = &mut self.stacks[id.0];
        let before = stack.unit.count;
        stack.unit = stack.unit.apply_damage(damage);
        let kills = before - stack.unit.count;
        if !stack.is_alive() {
            let pos = stack.pos;
            self.grid.vacate(pos, id);
        }
        kills
    }

    fn describe_attack(
        &self,
        attacker: StackId,
        target: StackId,
        damage: u32,
        kills: u32,
        retaliation: Option<(u32, u32)>,
    ) -> String {
        let a = &self.stacks[attacker.0];
        let t = &self.stacks[target.0];
        let mut line = format!("{} deals {} damage to {}", a.label(), damage, t.unit.name);
        if kills > 0 {
            line.push_str(&format!(", killing {}", kills));
        }
        if let Some((damage, kills)) = retaliation {
            line.push_str(&format!(". {} retaliates for {} damage", t.unit.name, damage));
            if kills > 0 {
                line.push_str(&format!(", killing {}", kills));
            }
        }
        line.push('.');
        line
    }

    /// Nearest living enemy by Manhattan distance, ties to deployment order
    pub fn nearest_enemy(&self, id: StackId) -> Option<StackId> {
        let stack = self.stack(id)?;
        self.living(stack.side.opponent())
            .min_by_key(|enemy| enemy.pos.manhattan(&stack.pos))
            .map(|enemy| enemy.id)
    }

    /// Living stacks of `side`, as ids
    pub fn living_ids(&self, side: Side) -> Vec<StackId> {
        self.living(side).map(|stack| stack.id).collect()
    }
}
