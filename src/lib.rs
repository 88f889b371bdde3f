//! Ironhold - turn-based fantasy strategy engine
//!
//! Heroes lead armies of unit stacks across an adventure map, capture towns
//! and mines, and settle encounters on a tactical battle grid.
//!
//! Layers, bottom up:
//! - `units` and `spells`: creature templates, stacks, damage math, spell book
//! - `combat`: one tactical encounter from deployment to result
//! - `hero`, `town`, `map`: adventure-layer entities
//! - `game`: phase machine tying everything together, plus the AI opponent

pub mod combat;
pub mod core;
pub mod game;
pub mod hero;
pub mod map;
pub mod spells;
pub mod town;
pub mod units;
