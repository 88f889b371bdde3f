//! Computer player - greedy town management and target picking
//!
//! Each AI turn:
//! - every owned town builds its priciest affordable building and empties
//!   its pools into a hero standing next to it
//! - every hero with movement left heads for the best-scoring target and
//!   auto-resolves any fight it walks into

use serde::{Deserialize, Serialize};

use super::combat_flow::CombatSummary;
use super::state::{GamePhase, GameState};
use crate::core::types::{GridPos, HeroId, PlayerId, TownId};
use crate::map::MapObjectKind;
use crate::town::BuildingKind;

/// Auto-resolve passes before an AI gives up on a stalled fight
const AI_COMBAT_ATTEMPTS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    EnemyHero,
    Town,
    Mine,
    ResourcePile,
    /// Own town with creatures to pick up
    Recruitment,
}

impl TargetKind {
    /// Priority before the distance penalty
    pub fn base_priority(&self) -> i32 {
        match self {
            TargetKind::EnemyHero => 100,
            TargetKind::Town => 80,
            TargetKind::Mine => 60,
            TargetKind::ResourcePile => 50,
            TargetKind::Recruitment => 40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiTarget {
    pub pos: GridPos,
    pub kind: TargetKind,
    pub priority: i32,
}

/// What the AI did, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AiAction {
    Built { town: TownId, building: BuildingKind },
    Recruited { town: TownId, unit: String, count: u32 },
    Moved { hero: HeroId, to: GridPos, target: TargetKind },
    Fought { hero: HeroId, summary: Option<CombatSummary> },
}

impl GameState {
    /// Play the current player's turn automatically
    pub fn execute_ai_turn(&mut self) -> Vec<AiAction> {
        let player = self.current_player;
        let mut actions = Vec::new();
        self.manage_towns(player, &mut actions);
        self.move_heroes(player, &mut actions);
        tracing::debug!(%player, actions = actions.len(), "AI turn finished");
        actions
    }

    fn manage_towns(&mut self, player: PlayerId, actions: &mut Vec<AiAction>) {
        let towns: Vec<TownId> = self.towns_of(player).map(|t| t.id).collect();

        for town_id in towns {
            let Some(town) = self.town(town_id) else {
                continue;
            };
            let mut options = town.available_buildings();
            // Stable, so equal prices keep catalog order
            options.sort_by_key(|b| std::cmp::Reverse(b.cost().gold));
            for building in options {
                if self.build_in_town(town_id, building).is_ok() {
                    actions.push(AiAction::Built { town: town_id, building });
                    break;
                }
            }

            let Some(town) = self.town(town_id) else {
                continue;
            };
            let pools: Vec<(String, u32)> = town
                .available_units()
                .into_iter()
                .map(|unit| (unit.to_string(), town.pool(unit)))
                .filter(|(_, pool)| *pool > 0)
                .collect();
            for (unit, pool) in pools {
                if let Ok(count) = self.recruit_from_town(town_id, &unit, pool) {
                    actions.push(AiAction::Recruited { town: town_id, unit, count });
                }
            }
        }
    }

    fn move_heroes(&mut self, player: PlayerId, actions: &mut Vec<AiAction>) {
        let heroes: Vec<HeroId> = self.heroes_of(player).map(|h| h.id).collect();

        for hero_id in heroes {
            if self.phase() != GamePhase::Adventure {
                break;
            }
            let Some(hero) = self.hero(hero_id) else {
                // Fell in an earlier fight this turn
                continue;
            };
            if hero.movement_points <= 0.0 {
                continue;
            }
            let Some(target) = self.best_target(hero_id) else {
                continue;
            };

            let Ok(report) = self.move_hero_to(hero_id, target.pos) else {
                continue;
            };
            if let Some(&to) = report.path.last() {
                actions.push(AiAction::Moved { hero: hero_id, to, target: target.kind });
            }
            if self.phase() == GamePhase::Combat {
                let summary = self.resolve_ai_combat();
                actions.push(AiAction::Fought { hero: hero_id, summary });
            }
        }
    }

    /// Highest-priority passable target for a hero (d = Manhattan distance)
    pub fn best_target(&self, hero_id: HeroId) -> Option<AiTarget> {
        let hero = self.hero(hero_id)?;
        let (player, from) = (hero.owner, hero.pos);
        let slots = self.config.max_army_slots;
        let mut targets = Vec::new();

        for enemy in self.heroes.iter().filter(|h| h.owner != player) {
            targets.push((enemy.pos, TargetKind::EnemyHero));
        }
        for town in self.towns.iter().filter(|t| t.owner != Some(player)) {
            targets.push((town.pos, TargetKind::Town));
        }
        for object in self.map.objects() {
            if object.is_mine() && object.owner != Some(player) {
                targets.push((object.pos, TargetKind::Mine));
            }
            if matches!(object.kind, MapObjectKind::ResourcePile { .. }) && !object.collected {
                targets.push((object.pos, TargetKind::ResourcePile));
            }
        }
        if hero.army.len() < slots {
            for town in self.towns_of(player) {
                let stocked = town.available_units().iter().any(|u| town.pool(u) > 0);
                if stocked {
                    targets.push((town.pos, TargetKind::Recruitment));
                }
            }
        }

        let mut best: Option<AiTarget> = None;
        for (pos, kind) in targets {
            if !self.map.is_passable(pos) {
                continue;
            }
            let priority = kind.base_priority() - from.manhattan(&pos);
            if best.map_or(true, |b| priority > b.priority) {
                best = Some(AiTarget { pos, kind, priority });
            }
        }
        best
    }

    /// Auto-resolve the active fight, abandoning it if it never settles
    fn resolve_ai_combat(&mut self) -> Option<CombatSummary> {
        for _ in 0..AI_COMBAT_ATTEMPTS {
            match self.auto_resolve_combat() {
                Ok(Some(summary)) => return Some(summary),
                Ok(None) => continue,
                Err(err) => {
                    tracing::warn!(%err, "AI could not resolve its combat");
                    break;
                }
            }
        }
        self.abandon_combat();
        None
    }
}
