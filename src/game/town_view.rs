//! Town screen orders - viewing, building and recruiting

use super::state::{GameState, Phase};
use crate::core::error::{GameError, Result};
use crate::core::types::{HeroId, TownId};
use crate::hero::Hero;
use crate::town::{BuildingKind, Resources};

impl GameState {
    /// Enter the town screen of one of the current player's towns
    pub fn open_town_view(&mut self, town_id: TownId) -> Result<()> {
        self.ensure_adventure()?;
        let town = self.town(town_id).ok_or(GameError::UnknownTown(town_id))?;
        if town.owner != Some(self.current_player) {
            return Err(GameError::NotYourTown);
        }
        self.phase = Phase::TownView(town_id);
        Ok(())
    }

    /// Leave the town screen; a no-op in any other phase
    pub fn close_town_view(&mut self) {
        if let Phase::TownView(_) = self.phase {
            self.phase = Phase::Adventure;
        }
    }

    /// Town orders are accepted on the map or the town screen
    fn ensure_town_orders(&self) -> Result<()> {
        match self.phase {
            Phase::Adventure | Phase::TownView(_) => Ok(()),
            Phase::GameOver => Err(GameError::GameOver),
            Phase::Combat(_) => Err(GameError::WrongPhase(self.phase())),
        }
    }

    fn owned_town_index(&self, town_id: TownId) -> Result<usize> {
        let index = self
            .towns
            .iter()
            .position(|t| t.id == town_id)
            .ok_or(GameError::UnknownTown(town_id))?;
        if self.towns[index].owner != Some(self.current_player) {
            return Err(GameError::NotYourTown);
        }
        Ok(index)
    }

    /// Construct a building, paid from the current player's treasury
    pub fn build_in_town(&mut self, town_id: TownId, building: BuildingKind) -> Result<Resources> {
        self.ensure_town_orders()?;
        let index = self.owned_town_index(town_id)?;
        let player = self.current_player;
        let treasury = self
            .player(player)
            .map(|p| p.resources)
            .unwrap_or_default();

        let remaining = self.towns[index]
            .build(building, &treasury)
            .ok_or_else(|| GameError::TownRejected(format!("cannot build {}", building.name())))?;
        if let Some(p) = self.player_mut(player) {
            p.resources = remaining;
        }
        let town_name = self.towns[index].name.clone();
        self.log(format!("Built {} in {}.", building.name(), town_name));
        Ok(remaining)
    }

    /// Own hero within one tile of the town that can take `unit_id`
    fn recruiting_hero(&self, town_id: TownId, unit_id: &str) -> Result<HeroId> {
        let town = self.town(town_id).ok_or(GameError::UnknownTown(town_id))?;
        let slots = self.config.max_army_slots;
        let mut candidates: Vec<&Hero> = self
            .heroes_of(self.current_player)
            .filter(|h| h.pos.chebyshev(&town.pos) <= 1)
            .collect();
        // The selected hero gets first pick
        candidates.sort_by_key(|h| Some(h.id) != self.selected_hero);
        if candidates.is_empty() {
            return Err(GameError::NoHeroNearTown);
        }
        candidates
            .into_iter()
            .find(|h| h.army.len() < slots || h.army.iter().any(|s| s.template_id == unit_id))
            .map(|h| h.id)
            .ok_or_else(|| GameError::TownRejected("army has no free slot".to_string()))
    }

    /// Buy creatures into a hero standing at or next to the town
    ///
    /// Returns the number recruited, which may be less than asked when the
    /// pool runs short.
    pub fn recruit_from_town(&mut self, town_id: TownId, unit_id: &str, count: u32) -> Result<u32> {
        self.ensure_town_orders()?;
        let index = self.owned_town_index(town_id)?;
        let hero_id = self.recruiting_hero(town_id, unit_id)?;
        // Fails on an unknown unit before anything is paid
        let template = self.catalogs.units.create_stack(unit_id, 1)?;
        let player = self.current_player;
        let treasury = self
            .player(player)
            .map(|p| p.resources)
            .unwrap_or_default();

        let recruitment = self.towns[index]
            .recruit(unit_id, count, &treasury)
            .ok_or_else(|| GameError::TownRejected(format!("cannot recruit {}", unit_id)))?;
        if let Some(p) = self.player_mut(player) {
            p.resources = recruitment.resources;
        }

        let slots = self.config.max_army_slots;
        let mut stack = template;
        stack.count = recruitment.recruited;
        if let Some(hero) = self.hero_mut(hero_id) {
            hero.add_units(stack, slots);
        }
        self.log(format!("Recruited {} {}.", recruitment.recruited, unit_id));
        Ok(recruitment.recruited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::core::types::{GridPos, PlayerId};
    use crate::game::GamePhase;
    use crate::map::standard_map;
    use crate::units::UnitRegistry;

    fn standard_game() -> GameState {
        let map = standard_map(20, 20, &UnitRegistry::standard()).expect("map");
        GameState::new_standard(map, GameConfig::default(), 4).expect("game")
    }

    fn own_town(game: &GameState) -> TownId {
        game.towns_of(PlayerId(1)).next().expect("capital").id
    }

    #[test]
    fn test_open_and_close_town_view() {
        let mut game = standard_game();
        let town = own_town(&game);
        game.open_town_view(town).expect("own town");
        assert_eq!(game.phase(), GamePhase::TownView);
        assert_eq!(game.viewed_town(), Some(town));
        game.close_town_view();
        assert_eq!(game.phase(), GamePhase::Adventure);
    }

    #[test]
    fn test_cannot_view_foreign_town() {
        let mut game = standard_game();
        let enemy = game.towns_of(PlayerId(2)).next().expect("enemy capital").id;
        assert!(matches!(game.open_town_view(enemy), Err(GameError::NotYourTown)));
        assert_eq!(game.phase(), GamePhase::Adventure);
    }

    #[test]
    fn test_build_and_recruit() {
        let mut game = standard_game();
        let town = own_town(&game);

        let remaining = game.build_in_town(town, BuildingKind::Fort).expect("fort");
        assert_eq!(remaining.gold, 3000);
        assert_eq!(game.players[0].resources.gold, 3000);

        let recruited = game.recruit_from_town(town, "ARCHER", 5).expect("archers");
        assert_eq!(recruited, 5);
        assert_eq!(game.players[0].resources.gold, 2500);
        let knight = game.heroes_of(PlayerId(1)).next().expect("knight");
        let archers = knight.army.iter().find(|s| s.template_id == "ARCHER").expect("merged");
        assert_eq!(archers.count, 15);
    }

    #[test]
    fn test_recruit_needs_nearby_hero() {
        let mut game = standard_game();
        let town = own_town(&game);
        game.build_in_town(town, BuildingKind::Fort).expect("fort");
        if let Some(hero) = game.heroes.iter_mut().find(|h| h.owner == PlayerId(1)) {
            hero.pos = GridPos::new(8, 8);
        }
        assert!(matches!(
            game.recruit_from_town(town, "PEASANT", 5),
            Err(GameError::NoHeroNearTown)
        ));
    }

    #[test]
    fn test_recruit_rejections_cost_nothing() {
        let mut game = standard_game();
        let town = own_town(&game);
        let gold = game.players[0].resources.gold;
        // No fort yet, so nothing is for sale
        assert!(matches!(
            game.recruit_from_town(town, "PEASANT", 5),
            Err(GameError::TownRejected(_))
        ));
        assert!(matches!(
            game.build_in_town(town, BuildingKind::CastleUpgrade),
            Err(GameError::TownRejected(_))
        ));
        assert_eq!(game.players[0].resources.gold, gold);
    }
}
