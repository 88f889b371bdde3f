//! Turn scheduler - speed-ordered rounds
//!
//! Each round every living stack acts once, fastest first. Equal speeds keep
//! deployment order. Nothing is requeued: a waiting stack is done for the round.

use std::cmp::Reverse;

use crate::combat::state::{CombatEventKind, CombatState};
use crate::core::types::StackId;
use crate::units::StatusEffect;

impl CombatState {
    /// Rebuild the order from living stacks, fastest first (stable)
    pub fn compute_turn_order(&mut self) {
        let mut order: Vec<StackId> = self
            .stacks
            .iter()
            .filter(|stack| stack.is_alive())
            .map(|stack| stack.id)
            .collect();
        order.sort_by_key(|id| Reverse(self.stacks[id.0].unit.speed));
        self.turn_order = order;
    }

    /// The stack whose turn it is, None when the round is spent or the fight is over
    pub fn current_stack(&self) -> Option<StackId> {
        if self.result.is_decided() {
            return None;
        }
        self.turn_order.iter().copied().find(|id| {
            let stack = &self.stacks[id.0];
            stack.is_alive() && !stack.has_acted && !stack.unit.has_effect(StatusEffect::Blind)
        })
    }

    /// Start a new round once nobody is left to act; returns true if one began
    pub fn advance_turn(&mut self) -> bool {
        if self.result.is_decided() || self.current_stack().is_some() {
            return false;
        }
        self.begin_round();
        true
    }

    /// Round rollover: undo defends, expire buffs, reset flags, reorder
    pub fn begin_round(&mut self) {
        self.round += 1;

        let mut expired = Vec::new();
        for stack in &mut self.stacks {
            if stack.defend_mode {
                stack.unit.defense -= stack.defend_bonus;
                stack.defend_bonus = 0;
                stack.defend_mode = false;
            }
            for buff in stack.unit.tick_buffs() {
                expired.push((stack.id, stack.label(), buff.spell_id));
            }
        }
        for (id, label, spell_id) in expired {
            self.log_event(
                CombatEventKind::BuffExpired { stack: id, spell_id: spell_id.clone() },
                format!("{} is no longer affected by {}.", label, spell_id),
            );
        }

        self.reset_round_flags();
        self.compute_turn_order();
        let round = self.round;
        self.log_event(CombatEventKind::RoundStarted, format!("--- Round {} ---", round));
    }

    pub(crate) fn start_first_round(&mut self) {
        self.reset_round_flags();
        self.compute_turn_order();
    }

    fn reset_round_flags(&mut self) {
        for stack in &mut self.stacks {
            stack.has_acted = false;
            stack.has_retaliated = false;
            stack.wait_mode = false;
        }
    }
}
