//! Game phase orchestrator
//!
//! `GameState` owns every persistent piece of a match and moves it between
//! phases:
//! - Adventure: heroes walk the map, collect, capture and pick fights
//! - Combat: one `CombatState`, driven by orders or auto-resolve
//! - TownView: the current player's town screen
//! - GameOver: terminal, once a single player is left
//!
//! Combat results are folded back into heroes, guardians and map objects
//! before the phase leaves `Combat`.

pub mod ai;
pub mod combat_flow;
pub mod encounter;
pub mod magic;
pub mod movement;
pub mod state;
pub mod town_view;
pub mod turn;
pub mod victory;

pub use ai::{AiAction, AiTarget, TargetKind};
pub use combat_flow::{CombatCommand, CombatStep, CombatSummary};
pub use magic::AdventureOutcome;
pub use movement::{Interaction, MoveReport};
pub use state::{ActiveCombat, GamePhase, GameState, Phase, Player};
