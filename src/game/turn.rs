//! Turn cycle - income, weekly growth and handing control to AI players

use super::state::{GameState, Phase};
use crate::core::error::{GameError, Result};
use crate::town::Resources;

impl GameState {
    /// End the current player's turn
    ///
    /// Control passes down the player list. AI players take their turn
    /// immediately, so the call returns with a human to move or the game
    /// over. Each player is visited at most once per call.
    pub fn end_turn(&mut self) -> Result<()> {
        match self.phase {
            Phase::Adventure => {}
            Phase::TownView(_) => self.close_town_view(),
            Phase::Combat(_) => return Err(GameError::WrongPhase(self.phase())),
            Phase::GameOver => return Err(GameError::GameOver),
        }

        for _ in 0..self.players.len() {
            self.advance_player();
            let is_ai = self.current().map_or(false, |p| p.is_ai);
            if self.is_over() || !is_ai {
                break;
            }

            self.execute_ai_turn();
            if self.is_over() {
                break;
            }
            let name = self
                .current()
                .map_or_else(|| self.current_player.to_string(), |p| p.name.clone());
            self.log(format!("{} ends their turn.", name));
        }
        Ok(())
    }

    /// Hand the turn to the next player and start their day
    fn advance_player(&mut self) {
        let index = self
            .players
            .iter()
            .position(|p| p.id == self.current_player)
            .unwrap_or(0);
        let next = (index + 1) % self.players.len().max(1);

        if next == 0 {
            self.turn += 1;
            self.log(format!("--- Day {} ---", self.turn));
            if self.turn % self.config.week_length == 0 {
                for town in &mut self.towns {
                    town.refresh_unit_pools();
                }
                self.log("A new week begins! Creature pools have grown.");
            }
        }

        let Some(player) = self.players.get(next) else {
            return;
        };
        let player_id = player.id;
        self.current_player = player_id;

        let income = self
            .towns_of(player_id)
            .map(|t| t.income())
            .chain(
                self.map
                    .objects()
                    .iter()
                    .filter(|o| o.owner == Some(player_id))
                    .map(|o| o.daily_income()),
            )
            .fold(Resources::new(), |total, r| total.add(&r));
        if let Some(player) = self.player_mut(player_id) {
            player.resources = player.resources.add(&income);
        }

        for hero in self.heroes.iter_mut().filter(|h| h.owner == player_id) {
            hero.reset_for_new_turn();
        }
        let selected = self.heroes_of(player_id).next().map(|h| h.id);
        self.selected_hero = selected;

        let name = self
            .current()
            .map_or_else(|| player_id.to_string(), |p| p.name.clone());
        self.log(format!("{}'s turn. Income: {} gold.", name, income.gold));
    }
}
