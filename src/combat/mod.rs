//! Tactical combat - grid, turn scheduler, action resolver, auto-resolve
//!
//! One `CombatState` per encounter. Stacks live in a flat list addressed by
//! `StackId`; grid cells hold ids, never references.
//!
//! Flow of one action:
//! - `current_stack` names the stack whose turn it is
//! - `perform` (or `attack`/`move_stack`/`wait`/`defend`/`cast_spell`) resolves it
//! - `advance_turn` rolls the round over once every stack has acted

pub mod auto_resolve;
pub mod constants;
pub mod error;
pub mod grid;
pub mod resolver;
pub mod scheduler;
pub mod spellcast;
pub mod state;

pub use auto_resolve::AutoResolveReport;
pub use constants::*;
pub use error::CombatError;
pub use grid::{CombatGrid, GridCell};
pub use resolver::{ActionOutcome, AttackOutcome, CombatAction};
pub use spellcast::{SpellHit, SpellOutcome};
pub use state::{
    check_combat_end, CombatEvent, CombatEventKind, CombatResult, CombatStack, CombatState,
    Commander, Side,
};
