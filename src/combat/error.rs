use thiserror::Error;

use crate::core::types::{GridPos, StackId};
use crate::spells::SpellError;

/// Why a combat action was refused
///
/// A rejected action leaves the combat exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CombatError {
    #[error("Combat is already over")]
    CombatOver,

    #[error("No stack {0:?} in this combat")]
    UnknownStack(StackId),

    #[error("Stack {0:?} has no creatures left")]
    DeadStack(StackId),

    #[error("Stacks on the same side cannot attack each other")]
    SameSide,

    #[error("No open cell next to the target within reach")]
    TargetUnreachable,

    #[error("Cell {0} is outside the battlefield")]
    OutOfBounds(GridPos),

    #[error("Cell {0} is occupied")]
    Occupied(GridPos),

    #[error("Cell {0} is blocked by an obstacle")]
    Obstacle(GridPos),

    #[error("Cell {0} is beyond the stack's movement range")]
    OutOfRange(GridPos),

    #[error("It is not this stack's turn")]
    NotYourTurn,

    #[error("No living stack at {0}")]
    NoTarget(GridPos),

    #[error("No hero commands this side")]
    NoCommander,

    #[error("Unknown spell: {0}")]
    UnknownSpell(String),

    #[error("Spell {0} cannot target that stack")]
    InvalidSpellTarget(String),

    #[error("No room on the battlefield to summon")]
    NoRoomToSummon,

    #[error("Unknown unit template: {0}")]
    UnknownTemplate(String),

    #[error(transparent)]
    Spell(#[from] SpellError),
}
