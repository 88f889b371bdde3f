//! Game state - players, heroes, towns, the map and the phase machine

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::combat::CombatState;
use crate::core::catalogs::Catalogs;
use crate::core::config::GameConfig;
use crate::core::error::{GameError, Result};
use crate::core::types::{GridPos, HeroId, PlayerId, TownId};
use crate::hero::{Hero, HeroClass};
use crate::map::scenario::{first_capital, second_capital};
use crate::map::{AdventureMap, MapObjectKind};
use crate::town::{Resources, Town};

/// Coarse phase, without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    Adventure,
    Combat,
    TownView,
    GameOver,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GamePhase::Adventure => "adventure",
            GamePhase::Combat => "combat",
            GamePhase::TownView => "town view",
            GamePhase::GameOver => "game over",
        };
        write!(f, "{}", name)
    }
}

/// A combat in progress and the heroes it will be reconciled against
#[derive(Debug, Clone)]
pub struct ActiveCombat {
    pub state: CombatState,
    pub attacker: HeroId,
    /// None when fighting map guardians
    pub defender: Option<HeroId>,
}

/// Phase with its payload; the combat exists exactly while in `Combat`
#[derive(Debug, Clone)]
pub enum Phase {
    Adventure,
    Combat(Box<ActiveCombat>),
    TownView(TownId),
    GameOver,
}

impl Phase {
    pub fn kind(&self) -> GamePhase {
        match self {
            Phase::Adventure => GamePhase::Adventure,
            Phase::Combat(_) => GamePhase::Combat,
            Phase::TownView(_) => GamePhase::TownView,
            Phase::GameOver => GamePhase::GameOver,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_ai: bool,
    pub resources: Resources,
}

impl Player {
    pub fn new(id: PlayerId, name: &str, is_ai: bool) -> Self {
        Self {
            id,
            name: name.to_string(),
            is_ai,
            resources: Resources::new(),
        }
    }
}

pub struct GameState {
    pub config: GameConfig,
    pub catalogs: Catalogs,
    pub map: AdventureMap,
    /// Turn order follows this list
    pub players: Vec<Player>,
    pub heroes: Vec<Hero>,
    pub towns: Vec<Town>,
    /// Day counter, starting at 1
    pub turn: u32,
    pub current_player: PlayerId,
    pub selected_hero: Option<HeroId>,
    pub winner: Option<PlayerId>,
    pub game_log: Vec<String>,
    pub(crate) phase: Phase,
    pub(crate) rng: ChaCha8Rng,
    next_hero_id: u32,
}

impl GameState {
    /// Empty game on `map`: towns come from the map's town objects, no heroes yet
    pub fn new(
        map: AdventureMap,
        mut players: Vec<Player>,
        config: GameConfig,
        catalogs: Catalogs,
        seed: u64,
    ) -> Result<Self> {
        config.validate().map_err(GameError::InvalidConfig)?;
        let first = players
            .first()
            .map(|p| p.id)
            .ok_or_else(|| GameError::InvalidConfig("a game needs at least one player".into()))?;

        for player in &mut players {
            player.resources = config.starting_resources;
        }

        let towns = map
            .objects()
            .iter()
            .filter_map(|object| match &object.kind {
                MapObjectKind::Town { name, faction } => Some((object, name, *faction)),
                _ => None,
            })
            .enumerate()
            .map(|(i, (object, name, faction))| {
                Town::new(
                    TownId(i as u32 + 1),
                    name,
                    faction,
                    object.pos,
                    object.owner,
                    &catalogs.units,
                )
            })
            .collect();

        Ok(Self {
            config,
            catalogs,
            map,
            players,
            heroes: Vec::new(),
            towns,
            turn: 1,
            current_player: first,
            selected_hero: None,
            winner: None,
            game_log: vec!["Welcome to Ironhold!".to_string()],
            phase: Phase::Adventure,
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_hero_id: 1,
        })
    }

    /// Two-player opening: a human knight against an AI warlock
    pub fn new_standard(map: AdventureMap, config: GameConfig, seed: u64) -> Result<Self> {
        let players = vec![
            Player::new(PlayerId(1), "Player 1", false),
            Player::new(PlayerId(2), "Player 2", true),
        ];
        let p1_start = first_capital(&map);
        let p2_start = second_capital(&map);
        let mut game = Self::new(map, players, config, Catalogs::standard(), seed)?;

        let knight = game.add_hero(
            HeroClass::Knight,
            PlayerId(1),
            p1_start,
            &[("PEASANT", 30), ("ARCHER", 10), ("GRIFFIN", 4)],
            &["MAGIC_ARROW", "HASTE", "CURE", "SHIELD"],
        )?;
        game.add_hero(
            HeroClass::Warlock,
            PlayerId(2),
            p2_start,
            &[("IMP", 40), ("DEMON", 8), ("PIT_FIEND", 3)],
            &["LIGHTNING_BOLT", "SLOW", "BLOODLUST", "FIREBALL"],
        )?;
        game.selected_hero = Some(knight);
        Ok(game)
    }

    /// Recruit a new hero onto the map with a starting army
    pub fn add_hero(
        &mut self,
        class: HeroClass,
        owner: PlayerId,
        pos: GridPos,
        army: &[(&str, u32)],
        spells: &[&str],
    ) -> Result<HeroId> {
        let stacks = army
            .iter()
            .map(|(unit, count)| self.catalogs.units.create_stack(unit, *count))
            .collect::<Result<Vec<_>>>()?;

        let id = HeroId(self.next_hero_id);
        self.next_hero_id += 1;
        let mut hero = Hero::new(id, class, owner, pos, &mut self.rng)
            .with_spells(spells)
            .with_movement(self.config.hero_movement_points);
        for stack in stacks {
            hero.add_units(stack, self.config.max_army_slots);
        }

        self.map
            .update_visibility(pos, self.config.vision_radius, owner);
        tracing::debug!(hero = %hero.name, %owner, "hero enters the map");
        self.heroes.push(hero);
        Ok(id)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase.kind()
    }

    /// The combat being fought, if any
    pub fn combat(&self) -> Option<&CombatState> {
        match &self.phase {
            Phase::Combat(active) => Some(&active.state),
            _ => None,
        }
    }

    pub fn active_combat(&self) -> Option<&ActiveCombat> {
        match &self.phase {
            Phase::Combat(active) => Some(active),
            _ => None,
        }
    }

    pub fn viewed_town(&self) -> Option<TownId> {
        match self.phase {
            Phase::TownView(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver)
    }

    /// Adventure-only orders fail with the current phase
    pub(crate) fn ensure_adventure(&self) -> Result<()> {
        match self.phase {
            Phase::Adventure => Ok(()),
            Phase::GameOver => Err(GameError::GameOver),
            _ => Err(GameError::WrongPhase(self.phase())),
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn current(&self) -> Option<&Player> {
        self.player(self.current_player)
    }

    pub fn hero(&self, id: HeroId) -> Option<&Hero> {
        self.heroes.iter().find(|h| h.id == id)
    }

    pub fn hero_mut(&mut self, id: HeroId) -> Option<&mut Hero> {
        self.heroes.iter_mut().find(|h| h.id == id)
    }

    pub fn heroes_of(&self, player: PlayerId) -> impl Iterator<Item = &Hero> {
        self.heroes.iter().filter(move |h| h.owner == player)
    }

    pub fn hero_at(&self, pos: GridPos) -> Option<&Hero> {
        self.heroes.iter().find(|h| h.pos == pos)
    }

    pub fn town(&self, id: TownId) -> Option<&Town> {
        self.towns.iter().find(|t| t.id == id)
    }

    pub fn town_mut(&mut self, id: TownId) -> Option<&mut Town> {
        self.towns.iter_mut().find(|t| t.id == id)
    }

    pub fn town_at(&self, pos: GridPos) -> Option<&Town> {
        self.towns.iter().find(|t| t.pos == pos)
    }

    pub fn towns_of(&self, player: PlayerId) -> impl Iterator<Item = &Town> {
        self.towns
            .iter()
            .filter(move |t| t.owner == Some(player))
    }

    /// Hand a town (and its map marker) to a player
    pub(crate) fn capture_town_at(&mut self, pos: GridPos, player: PlayerId) -> Option<String> {
        let town = self.towns.iter_mut().find(|t| t.pos == pos)?;
        town.owner = Some(player);
        let name = town.name.clone();
        let marker = self
            .map
            .objects()
            .iter()
            .find(|o| o.pos == pos && o.is_town())
            .map(|o| o.id);
        if let Some(object) = marker.and_then(|id| self.map.object_mut(id)) {
            object.owner = Some(player);
        }
        Some(name)
    }

    pub(crate) fn remove_hero(&mut self, id: HeroId) -> Option<Hero> {
        let index = self.heroes.iter().position(|h| h.id == id)?;
        if self.selected_hero == Some(id) {
            self.selected_hero = None;
        }
        Some(self.heroes.remove(index))
    }

    pub(crate) fn combat_seed(&mut self) -> u64 {
        self.rng.gen()
    }

    /// Player-facing message, mirrored to tracing
    pub(crate) fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(turn = self.turn, "{}", message);
        self.game_log.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::standard_map;
    use crate::units::UnitRegistry;

    fn standard_game() -> GameState {
        let map = standard_map(20, 20, &UnitRegistry::standard()).expect("map");
        GameState::new_standard(map, GameConfig::default(), 7).expect("game")
    }

    #[test]
    fn test_standard_opening() {
        let game = standard_game();
        assert_eq!(game.phase(), GamePhase::Adventure);
        assert!(game.combat().is_none());
        assert_eq!(game.turn, 1);
        assert_eq!(game.current_player, PlayerId(1));
        assert_eq!(game.heroes.len(), 2);
        assert_eq!(game.towns.len(), 3);

        let knight = game.heroes_of(PlayerId(1)).next().expect("knight");
        assert_eq!(knight.class, HeroClass::Knight);
        assert_eq!(knight.pos, GridPos::new(3, 3));
        assert_eq!(knight.army.len(), 3);
        assert!(game.map.is_visible_to(GridPos::new(5, 5), PlayerId(1)));

        let warlock = game.heroes_of(PlayerId(2)).next().expect("warlock");
        assert_eq!(warlock.pos, GridPos::new(16, 16));
        assert_eq!(game.players[0].resources.gold, 5000);
        assert!(game.players[1].is_ai);
    }

    #[test]
    fn test_town_ownership_comes_from_the_map() {
        let game = standard_game();
        assert_eq!(game.towns_of(PlayerId(1)).count(), 1);
        assert_eq!(game.towns_of(PlayerId(2)).count(), 1);
        let deyja = game.town_at(GridPos::new(10, 10)).expect("neutral town");
        assert_eq!(deyja.owner, None);
    }

    #[test]
    fn test_add_hero_rejects_unknown_units() {
        let mut game = standard_game();
        let result = game.add_hero(
            HeroClass::Necromancer,
            PlayerId(1),
            GridPos::new(5, 5),
            &[("LICH", 3)],
            &[],
        );
        assert!(matches!(result, Err(GameError::UnknownTemplate(_))));
        assert_eq!(game.heroes.len(), 2);
    }

    #[test]
    fn test_capture_updates_town_and_marker() {
        let mut game = standard_game();
        let name = game.capture_town_at(GridPos::new(10, 10), PlayerId(2));
        assert_eq!(name.as_deref(), Some("Deyja"));
        assert_eq!(game.towns_of(PlayerId(2)).count(), 2);
        let marker = game
            .map
            .objects_at(GridPos::new(10, 10))
            .next()
            .expect("marker");
        assert_eq!(marker.owner, Some(PlayerId(2)));
    }
}
