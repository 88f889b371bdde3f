pub mod catalogs;
pub mod config;
pub mod error;
pub mod types;

pub use catalogs::Catalogs;
pub use config::{CombatRules, GameConfig};
pub use error::{GameError, Result};
pub use types::{GridPos, HeroId, ObjectId, PlayerId, StackId, TownId};
