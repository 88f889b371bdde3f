//! Hero movement and what happens where a hero stops

use serde::{Deserialize, Serialize};

use super::state::GameState;
use crate::core::error::{GameError, Result};
use crate::core::types::{GridPos, HeroId, ObjectId};
use crate::map::{find_path, MapObjectKind};
use crate::town::ResourceKind;

/// Something a hero triggered by moving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Interaction {
    Collected { resource: ResourceKind, amount: u32 },
    Treasure { gold: u32, experience: u64 },
    Captured { name: String },
    GuardiansEngaged { object: ObjectId },
    HeroEngaged { defender: HeroId },
}

impl Interaction {
    pub fn starts_combat(&self) -> bool {
        matches!(
            self,
            Interaction::GuardiansEngaged { .. } | Interaction::HeroEngaged { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveReport {
    /// Tiles actually walked
    pub path: Vec<GridPos>,
    pub cost: f64,
    pub movement_left: f64,
    pub interactions: Vec<Interaction>,
}

impl MoveReport {
    pub fn started_combat(&self) -> bool {
        self.interactions.iter().any(Interaction::starts_combat)
    }
}

impl GameState {
    /// Walk a hero toward `target` as far as its movement points allow
    ///
    /// Meeting an enemy hero with an army on the way starts a combat on
    /// that tile. Otherwise the hero stops on the last affordable step and
    /// whatever stands there is collected, captured or fought.
    pub fn move_hero_to(&mut self, hero_id: HeroId, target: GridPos) -> Result<MoveReport> {
        self.ensure_adventure()?;
        let hero = self.hero(hero_id).ok_or(GameError::UnknownHero(hero_id))?;
        if hero.owner != self.current_player {
            return Err(GameError::NotYourHero);
        }
        if hero.movement_points <= 0.0 {
            return Err(GameError::NoMovementPoints);
        }
        let (owner, start, budget) = (hero.owner, hero.pos, hero.movement_points);
        let route = find_path(&self.map, start, target).ok_or(GameError::NoPath)?;

        let mut walked = Vec::new();
        let mut cost = 0.0;
        let mut engaged = None;
        for step in route.steps {
            let step_cost = self.map.move_cost(step);
            if cost + step_cost > budget {
                break;
            }
            cost += step_cost;
            walked.push(step);

            let enemy = self
                .heroes
                .iter()
                .find(|h| h.owner != owner && h.pos == step && h.has_army());
            if let Some(enemy) = enemy {
                engaged = Some(enemy.id);
                break;
            }
        }

        let Some(&destination) = walked.last() else {
            return Err(GameError::CannotMoveThere);
        };
        let vision = self.config.vision_radius;
        let movement_left = match self.hero_mut(hero_id) {
            Some(hero) => {
                hero.pos = destination;
                hero.movement_points -= cost;
                hero.movement_points
            }
            None => return Err(GameError::UnknownHero(hero_id)),
        };
        self.map.update_visibility(destination, vision, owner);
        self.selected_hero = Some(hero_id);

        let interactions = match engaged {
            Some(defender) => {
                self.start_hero_combat(hero_id, defender)?;
                vec![Interaction::HeroEngaged { defender }]
            }
            None => self.handle_map_interactions(hero_id)?,
        };

        Ok(MoveReport {
            path: walked,
            cost,
            movement_left,
            interactions,
        })
    }

    /// Resolve the objects on the hero's tile; stops at the first fight
    pub(crate) fn handle_map_interactions(&mut self, hero_id: HeroId) -> Result<Vec<Interaction>> {
        let hero = self.hero(hero_id).ok_or(GameError::UnknownHero(hero_id))?;
        let (owner, pos) = (hero.owner, hero.pos);
        let object_ids: Vec<ObjectId> = self.map.objects_at(pos).map(|o| o.id).collect();
        let mut results = Vec::new();

        for object_id in object_ids {
            let Some(object) = self.map.object(object_id).cloned() else {
                continue;
            };
            match object.kind {
                MapObjectKind::ResourcePile { resource, amount } if !object.collected => {
                    if let Some(player) = self.player_mut(owner) {
                        *player.resources.get_mut(resource) += amount;
                    }
                    if let Some(object) = self.map.object_mut(object_id) {
                        object.collected = true;
                    }
                    self.log(format!("Collected {} {}!", amount, resource));
                    results.push(Interaction::Collected { resource, amount });
                }
                MapObjectKind::TreasureChest { gold, experience } if !object.collected => {
                    if let Some(player) = self.player_mut(owner) {
                        player.resources.gold += gold;
                    }
                    if let Some(object) = self.map.object_mut(object_id) {
                        object.collected = true;
                    }
                    let per_level = self.config.experience_per_level;
                    if let Some(hero) = self.heroes.iter_mut().find(|h| h.id == hero_id) {
                        hero.gain_experience(experience);
                        hero.check_level_up(per_level, &mut self.rng);
                    }
                    self.log(format!(
                        "Found treasure: {} gold and {} experience!",
                        gold, experience
                    ));
                    results.push(Interaction::Treasure { gold, experience });
                }
                MapObjectKind::Town { .. } | MapObjectKind::Mine { .. }
                    if object.owner != Some(owner) =>
                {
                    if object.is_guarded() {
                        self.start_guardian_combat(hero_id, object_id)?;
                        results.push(Interaction::GuardiansEngaged { object: object_id });
                        return Ok(results);
                    }
                    let name = object.name();
                    if object.is_town() {
                        self.capture_town_at(pos, owner);
                    } else if let Some(object) = self.map.object_mut(object_id) {
                        object.owner = Some(owner);
                    }
                    self.log(format!("Captured {}!", name));
                    results.push(Interaction::Captured { name });
                    self.check_win_condition();
                }
                MapObjectKind::MonsterLair if object.is_guarded() => {
                    self.start_guardian_combat(hero_id, object_id)?;
                    results.push(Interaction::GuardiansEngaged { object: object_id });
                    return Ok(results);
                }
                _ => {}
            }
        }

        Ok(results)
    }
}
