use thiserror::Error;

use crate::combat::CombatError;
use crate::core::types::{HeroId, ObjectId, TownId};
use crate::game::GamePhase;
use crate::spells::SpellError;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Unknown unit template: {0}")]
    UnknownTemplate(String),

    #[error("Unknown hero: {0:?}")]
    UnknownHero(HeroId),

    #[error("Unknown town: {0:?}")]
    UnknownTown(TownId),

    #[error("Unknown map object: {0:?}")]
    UnknownObject(ObjectId),

    #[error("Unknown spell: {0}")]
    UnknownSpell(String),

    #[error("Not allowed during the {0:?} phase")]
    WrongPhase(GamePhase),

    #[error("Not your hero")]
    NotYourHero,

    #[error("Not your town")]
    NotYourTown,

    #[error("No movement points remaining")]
    NoMovementPoints,

    #[error("No path found")]
    NoPath,

    #[error("Cannot move there")]
    CannotMoveThere,

    #[error("No hero of yours stands next to the town")]
    NoHeroNearTown,

    #[error("Town rejected the order: {0}")]
    TownRejected(String),

    #[error("No town to return to")]
    NoTownToPortal,

    #[error("The game is over")]
    GameOver,

    #[error("Combat error: {0}")]
    Combat(#[from] CombatError),

    #[error("Spell error: {0}")]
    Spell(#[from] SpellError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
