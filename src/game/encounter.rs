//! Starting combats from adventure-map encounters

use super::state::{ActiveCombat, GameState, Phase};
use crate::combat::{CombatState, Side};
use crate::core::error::{GameError, Result};
use crate::core::types::{HeroId, ObjectId};

impl GameState {
    /// Hero against hero; the mover attacks
    pub(crate) fn start_hero_combat(&mut self, attacker: HeroId, defender: HeroId) -> Result<()> {
        let seed = self.combat_seed();
        let a = self.hero(attacker).ok_or(GameError::UnknownHero(attacker))?;
        let d = self.hero(defender).ok_or(GameError::UnknownHero(defender))?;

        let state = CombatState::new(self.catalogs.clone(), &a.army, &d.army, seed)
            .with_commander(Side::Attacker, a.commander())
            .with_commander(Side::Defender, d.commander())
            .with_rules(self.config.combat);
        let message = format!("{} attacks {}!", a.name, d.name);

        self.enter_combat(state, attacker, Some(defender), message)
    }

    /// Hero against the guardians of a town, mine or lair
    pub(crate) fn start_guardian_combat(
        &mut self,
        attacker: HeroId,
        object: ObjectId,
    ) -> Result<()> {
        let seed = self.combat_seed();
        let a = self.hero(attacker).ok_or(GameError::UnknownHero(attacker))?;
        let guarded = self
            .map
            .object(object)
            .ok_or(GameError::UnknownObject(object))?;

        let state = CombatState::new(self.catalogs.clone(), &a.army, &guarded.guardians, seed)
            .with_commander(Side::Attacker, a.commander())
            .with_map_object(object)
            .with_rules(self.config.combat);
        let message = format!("{} engages the guardians of {}!", a.name, guarded.name());

        self.enter_combat(state, attacker, None, message)
    }

    fn enter_combat(
        &mut self,
        state: CombatState,
        attacker: HeroId,
        defender: Option<HeroId>,
        message: String,
    ) -> Result<()> {
        self.log(message);
        let decided = state.result.is_decided();
        self.phase = Phase::Combat(Box::new(ActiveCombat {
            state,
            attacker,
            defender,
        }));
        // An empty side loses before anyone acts
        if decided {
            self.resolve_combat_end()?;
        }
        Ok(())
    }
}
