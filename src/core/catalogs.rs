//! Shared read-only content: unit templates and the spell book

use std::sync::Arc;

use crate::spells::SpellCatalog;
use crate::units::UnitRegistry;

/// Content handles shared by the game and every combat it spawns
#[derive(Debug, Clone)]
pub struct Catalogs {
    pub units: Arc<UnitRegistry>,
    pub spells: Arc<SpellCatalog>,
}

impl Catalogs {
    pub fn new(units: UnitRegistry, spells: SpellCatalog) -> Self {
        Self {
            units: Arc::new(units),
            spells: Arc::new(spells),
        }
    }

    /// The built-in roster and spell book
    pub fn standard() -> Self {
        Self::new(UnitRegistry::standard(), SpellCatalog::standard())
    }
}

impl Default for Catalogs {
    fn default() -> Self {
        Self::standard()
    }
}
