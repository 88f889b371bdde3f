//! Win condition - a player with no heroes and no towns is out

use super::state::{GameState, Phase};
use crate::core::types::PlayerId;

impl GameState {
    pub fn is_eliminated(&self, player: PlayerId) -> bool {
        self.heroes_of(player).next().is_none() && self.towns_of(player).next().is_none()
    }

    /// Declare a winner once a single player is left standing
    pub fn check_win_condition(&mut self) -> Option<PlayerId> {
        if self.winner.is_some() {
            return self.winner;
        }

        let remaining: Vec<PlayerId> = self
            .players
            .iter()
            .map(|p| p.id)
            .filter(|&id| !self.is_eliminated(id))
            .collect();

        match *remaining.as_slice() {
            [winner] => {
                self.winner = Some(winner);
                self.phase = Phase::GameOver;
                let name = self
                    .player(winner)
                    .map_or_else(|| winner.to_string(), |p| p.name.clone());
                self.log(format!("{} wins the game!", name));
            }
            [] => {
                self.phase = Phase::GameOver;
                self.log("Every player has been eliminated.");
            }
            _ => {}
        }
        self.winner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::game::GamePhase;
    use crate::map::standard_map;
    use crate::units::UnitRegistry;

    fn standard_game() -> GameState {
        let map = standard_map(16, 16, &UnitRegistry::standard()).expect("map");
        GameState::new_standard(map, GameConfig::default(), 5).expect("game")
    }

    #[test]
    fn test_no_winner_while_both_stand() {
        let mut game = standard_game();
        assert_eq!(game.check_win_condition(), None);
        assert_eq!(game.phase(), GamePhase::Adventure);
    }

    #[test]
    fn test_player_without_heroes_or_towns_loses() {
        let mut game = standard_game();
        game.heroes.retain(|h| h.owner != PlayerId(2));
        // Still holds Kreelah
        assert_eq!(game.check_win_condition(), None);

        for town in &mut game.towns {
            if town.owner == Some(PlayerId(2)) {
                town.owner = None;
            }
        }
        assert!(game.is_eliminated(PlayerId(2)));
        assert_eq!(game.check_win_condition(), Some(PlayerId(1)));
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert!(game.game_log.iter().any(|l| l.contains("wins the game")));
    }
}
