//! Auto-resolve - play a combat out without a human at the controls
//!
//! Every stack strikes the nearest enemy, or marches toward it when out of
//! reach. An iteration cap bounds the loop; running out of iterations leaves
//! the combat undecided rather than spinning forever.

use serde::{Deserialize, Serialize};

use crate::combat::state::{CombatResult, CombatState};
use crate::core::types::{GridPos, StackId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoResolveReport {
    pub result: CombatResult,
    pub rounds: u32,
    pub iterations: u32,
    /// The cap ran out before a side was wiped out
    pub exhausted: bool,
}

impl CombatState {
    /// Run the combat to completion (or to the iteration cap)
    pub fn auto_resolve(&mut self) -> AutoResolveReport {
        let cap = self.rules.auto_resolve_iteration_cap;
        let mut iterations = 0;

        while !self.result.is_decided() && iterations < cap {
            iterations += 1;
            let Some(id) = self.current_stack() else {
                self.advance_turn();
                continue;
            };
            self.auto_act(id);
            self.advance_turn();
        }

        let exhausted = !self.result.is_decided();
        if exhausted {
            tracing::warn!(
                round = self.round,
                iterations,
                "auto-resolve hit its iteration cap with the combat undecided"
            );
        }

        AutoResolveReport {
            result: self.result,
            rounds: self.round,
            iterations,
            exhausted,
        }
    }

    /// One heuristic action for the stack whose turn it is
    pub fn auto_act(&mut self, id: StackId) {
        let Some(target) = self.nearest_enemy(id) else {
            self.update_result();
            return;
        };
        if self.attack(id, target).is_ok() {
            return;
        }

        let goal = self.stacks[target.0].pos;
        self.step_toward(id, goal);
        // Moving, or failing to, ends the turn either way
        self.stacks[id.0].has_acted = true;
    }

    /// Greedy march toward `goal`: diagonal first, then straight along
    /// each axis, longest legal move wins. Returns whether the stack moved.
    fn step_toward(&mut self, id: StackId, goal: GridPos) -> bool {
        let stack = &self.stacks[id.0];
        let from = stack.pos;
        let budget = stack.unit.movement_budget();
        let (dx, dy) = (goal.x - from.x, goal.y - from.y);
        let (step_x, step_y) = (dx.signum(), dy.signum());
        let clamp = |pos: GridPos| {
            GridPos::new(
                pos.x.clamp(0, self.grid.width() - 1),
                pos.y.clamp(0, self.grid.height() - 1),
            )
        };

        let diagonal = (1..=budget).rev().map(|steps| {
            from.offset(step_x * steps.min(dx.abs()), step_y * steps.min(dy.abs()))
        });
        let horizontal = (1..=budget).rev().map(|steps| from.offset(step_x * steps, 0));
        let vertical = (1..=budget).rev().map(|steps| from.offset(0, step_y * steps));

        let candidates: Vec<GridPos> = diagonal
            .chain(horizontal)
            .chain(vertical)
            .map(clamp)
            .filter(|&pos| pos != from)
            .collect();

        candidates
            .into_iter()
            .any(|pos| self.move_stack(id, pos).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::state::Side;
    use crate::core::config::CombatRules;
    use crate::units::{UnitRegistry, UnitStack};

    fn army(units: &[(&str, u32)]) -> Vec<UnitStack> {
        let registry = UnitRegistry::standard();
        units
            .iter()
            .map(|(id, count)| registry.create_stack(id, *count).expect("known template"))
            .collect()
    }

    #[test]
    fn test_swordsmen_overrun_peasants() {
        let mut combat =
            CombatState::skirmish(&army(&[("SWORDSMAN", 20)]), &army(&[("PEASANT", 5)]), 11);
        let report = combat.auto_resolve();
        assert_eq!(report.result, CombatResult::AttackerWon);
        assert!(!report.exhausted);
        assert!(report.iterations <= 100);
        assert!(combat.living(Side::Defender).next().is_none());
    }

    #[test]
    fn test_blocked_stack_marches_toward_enemy() {
        let mut combat =
            CombatState::skirmish(&army(&[("PEASANT", 5)]), &army(&[("WOLF", 5)]), 3);
        let wolves = StackId(1);
        // Wolves go first (speed 6) but cannot reach from the far edge
        combat.auto_act(wolves);
        assert_eq!(combat.stacks[1].pos, GridPos::new(8, 5));
        assert!(combat.stacks[1].has_acted);
    }

    #[test]
    fn test_exhausted_cap_leaves_combat_in_progress() {
        let rules = CombatRules { auto_resolve_iteration_cap: 1, ..CombatRules::default() };
        let mut combat =
            CombatState::skirmish(&army(&[("PEASANT", 5)]), &army(&[("WOLF", 5)]), 3)
                .with_rules(rules);
        let report = combat.auto_resolve();
        assert!(report.exhausted);
        assert_eq!(report.result, CombatResult::InProgress);
        assert_eq!(report.iterations, 1);
    }
}
