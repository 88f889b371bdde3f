//! Adventure-map spells

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::state::GameState;
use crate::core::error::{GameError, Result};
use crate::core::types::{GridPos, HeroId, TownId};
use crate::spells::{self, AdventureEffect, CastContext, SpellEffect, SpellKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdventureOutcome {
    Revealed { center: GridPos, radius: i32 },
    Teleported { town: TownId, to: GridPos },
}

impl GameState {
    /// Cast a map spell from a hero's book
    ///
    /// Targets are settled before any mana is spent, so a portal with no
    /// town to return to costs nothing.
    pub fn cast_adventure_spell(
        &mut self,
        hero_id: HeroId,
        spell_id: &str,
    ) -> Result<AdventureOutcome> {
        self.ensure_adventure()?;
        let catalog = Arc::clone(&self.catalogs.spells);
        let spell = catalog
            .get(spell_id)
            .ok_or_else(|| GameError::UnknownSpell(spell_id.to_string()))?;
        let hero = self.hero(hero_id).ok_or(GameError::UnknownHero(hero_id))?;
        if hero.owner != self.current_player {
            return Err(GameError::NotYourHero);
        }
        let (owner, from, name) = (hero.owner, hero.pos, hero.name.clone());

        let portal_town = match spell.kind {
            SpellKind::Adventure(AdventureEffect::TownPortal) => {
                let nearest = self
                    .towns_of(owner)
                    .min_by_key(|t| from.manhattan(&t.pos))
                    .map(|t| (t.id, t.pos))
                    .ok_or(GameError::NoTownToPortal)?;
                Some(nearest)
            }
            _ => None,
        };

        let hero = self.hero_mut(hero_id).ok_or(GameError::UnknownHero(hero_id))?;
        let effect = spells::cast(spell, hero, CastContext::Adventure)?;
        let SpellEffect::Adventure(effect) = effect else {
            return Err(GameError::UnknownSpell(spell_id.to_string()));
        };

        let outcome = match (effect, portal_town) {
            (AdventureEffect::TownPortal, Some((town, to))) => {
                hero.pos = to;
                self.map.update_visibility(to, self.config.vision_radius, owner);
                AdventureOutcome::Teleported { town, to }
            }
            _ => {
                let radius = self.config.view_map_radius;
                self.map.update_visibility(from, radius, owner);
                AdventureOutcome::Revealed { center: from, radius }
            }
        };
        self.log(format!("{} casts {}.", name, spell.name));
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::core::types::PlayerId;
    use crate::map::standard_map;
    use crate::spells::SpellError;
    use crate::units::UnitRegistry;

    fn game_with_spells(spells: &[&str]) -> (GameState, HeroId) {
        let map = standard_map(30, 30, &UnitRegistry::standard()).expect("map");
        let mut game = GameState::new_standard(map, GameConfig::default(), 2).expect("game");
        let knight = game.heroes_of(PlayerId(1)).next().expect("knight").id;
        if let Some(hero) = game.hero_mut(knight) {
            hero.spells.extend(spells.iter().map(|s| s.to_string()));
        }
        (game, knight)
    }

    #[test]
    fn test_view_map_reveals_wide_area() {
        let (mut game, knight) = game_with_spells(&["VIEW_MAP"]);
        let far = GridPos::new(11, 9);
        assert!(!game.map.is_visible_to(far, PlayerId(1)));

        let outcome = game.cast_adventure_spell(knight, "VIEW_MAP").expect("cast");
        assert!(matches!(outcome, AdventureOutcome::Revealed { radius: 10, .. }));
        assert!(game.map.is_visible_to(far, PlayerId(1)));
        assert_eq!(game.hero(knight).map(|h| h.mana), Some(18));
    }

    #[test]
    fn test_town_portal_returns_home() {
        let (mut game, knight) = game_with_spells(&["TOWN_PORTAL"]);
        if let Some(hero) = game.hero_mut(knight) {
            hero.pos = GridPos::new(14, 20);
        }
        let outcome = game.cast_adventure_spell(knight, "TOWN_PORTAL").expect("cast");
        assert!(matches!(
            outcome,
            AdventureOutcome::Teleported { to, .. } if to == GridPos::new(3, 3)
        ));
        assert_eq!(game.hero(knight).map(|h| h.pos), Some(GridPos::new(3, 3)));
    }

    #[test]
    fn test_portal_without_town_costs_nothing() {
        let (mut game, knight) = game_with_spells(&["TOWN_PORTAL"]);
        for town in &mut game.towns {
            if town.owner == Some(PlayerId(1)) {
                town.owner = None;
            }
        }
        assert!(matches!(
            game.cast_adventure_spell(knight, "TOWN_PORTAL"),
            Err(GameError::NoTownToPortal)
        ));
        assert_eq!(game.hero(knight).map(|h| h.mana), Some(20));
    }

    #[test]
    fn test_combat_spell_rejected_on_the_map() {
        let (mut game, knight) = game_with_spells(&[]);
        assert!(matches!(
            game.cast_adventure_spell(knight, "MAGIC_ARROW"),
            Err(GameError::Spell(SpellError::WrongContext(_)))
        ));
    }
}
