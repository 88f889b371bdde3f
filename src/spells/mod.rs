//! Spells - catalog and the cast contract used by combat and the adventure map

pub mod casting;
pub mod catalog;

pub use casting::{
    available_spells, can_cast, cast, preview, CastContext, Caster, SpellEffect, SpellError,
};
pub use catalog::{AdventureEffect, DamageArea, Spell, SpellCatalog, SpellKind};
