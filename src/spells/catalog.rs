//! Spell definitions

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::units::{Stat, StatusEffect};

/// Which stacks a damage spell hits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageArea {
    Single,
    /// Target cell and its eight neighbours, friend or foe
    Burst,
    /// Jumps to further enemies, halving each time
    Chain { jumps: usize },
}

/// Effects that only make sense on the adventure map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdventureEffect {
    RevealMap,
    TownPortal,
}

/// Closed set of spell behaviours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpellKind {
    Damage {
        base: u32,
        area: DamageArea,
    },
    Buff {
        stat: Option<Stat>,
        bonus: i32,
        duration: u32,
        effect: Option<StatusEffect>,
    },
    Debuff {
        stat: Option<Stat>,
        penalty: i32,
        duration: u32,
        effect: Option<StatusEffect>,
    },
    Heal {
        base: u32,
    },
    Resurrect {
        base: u32,
    },
    Summon {
        unit: String,
        base_count: u32,
    },
    Adventure(AdventureEffect),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spell {
    pub id: String,
    pub name: String,
    pub mana_cost: u32,
    pub kind: SpellKind,
}

impl Spell {
    pub fn new(id: &str, name: &str, mana_cost: u32, kind: SpellKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            mana_cost,
            kind,
        }
    }

    pub fn is_adventure(&self) -> bool {
        matches!(self.kind, SpellKind::Adventure(_))
    }

    /// Spells aimed at the caster's enemies
    pub fn is_hostile(&self) -> bool {
        matches!(self.kind, SpellKind::Damage { .. } | SpellKind::Debuff { .. })
    }
}

/// Every spell heroes can learn, keyed by id
#[derive(Debug, Clone, Default)]
pub struct SpellCatalog {
    spells: AHashMap<String, Spell>,
}

impl SpellCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, spell: Spell) {
        self.spells.insert(spell.id.clone(), spell);
    }

    pub fn get(&self, id: &str) -> Option<&Spell> {
        self.spells.get(id)
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Spell> {
        self.spells.values()
    }

    pub fn standard() -> Self {
        use SpellKind::*;

        let spells = [
            Spell::new(
                "MAGIC_ARROW",
                "Magic Arrow",
                5,
                Damage {
                    base: 10,
                    area: DamageArea::Single,
                },
            ),
            Spell::new(
                "LIGHTNING_BOLT",
                "Lightning Bolt",
                10,
                Damage {
                    base: 25,
                    area: DamageArea::Single,
                },
            ),
            Spell::new(
                "FIREBALL",
                "Fireball",
                15,
                Damage {
                    base: 15,
                    area: DamageArea::Burst,
                },
            ),
            Spell::new(
                "CHAIN_LIGHTNING",
                "Chain Lightning",
                24,
                Damage {
                    base: 25,
                    area: DamageArea::Chain { jumps: 3 },
                },
            ),
            Spell::new(
                "HASTE",
                "Haste",
                6,
                Buff {
                    stat: Some(Stat::Speed),
                    bonus: 3,
                    duration: 3,
                    effect: None,
                },
            ),
            Spell::new(
                "SHIELD",
                "Shield",
                5,
                Buff {
                    stat: Some(Stat::Defense),
                    bonus: 3,
                    duration: 3,
                    effect: None,
                },
            ),
            Spell::new(
                "BLESS",
                "Bless",
                5,
                Buff {
                    stat: None,
                    bonus: 0,
                    duration: 3,
                    effect: Some(StatusEffect::MaxDamage),
                },
            ),
            Spell::new(
                "BLOODLUST",
                "Bloodlust",
                5,
                Buff {
                    stat: Some(Stat::Attack),
                    bonus: 3,
                    duration: 3,
                    effect: None,
                },
            ),
            Spell::new(
                "SLOW",
                "Slow",
                6,
                Debuff {
                    stat: Some(Stat::Speed),
                    penalty: 3,
                    duration: 3,
                    effect: None,
                },
            ),
            Spell::new(
                "CURSE",
                "Curse",
                6,
                Debuff {
                    stat: None,
                    penalty: 0,
                    duration: 3,
                    effect: Some(StatusEffect::MinDamage),
                },
            ),
            Spell::new(
                "BLIND",
                "Blind",
                10,
                Debuff {
                    stat: Some(Stat::Speed),
                    penalty: 999,
                    duration: 1,
                    effect: Some(StatusEffect::Blind),
                },
            ),
            Spell::new("CURE", "Cure", 6, Heal { base: 10 }),
            Spell::new("RESURRECT", "Resurrect", 20, Resurrect { base: 40 }),
            Spell::new(
                "SUMMON_ELEMENTAL",
                "Summon Elemental",
                25,
                Summon {
                    unit: "OGRE".to_string(),
                    base_count: 2,
                },
            ),
            Spell::new("VIEW_MAP", "View Map", 2, Adventure(AdventureEffect::RevealMap)),
            Spell::new(
                "TOWN_PORTAL",
                "Town Portal",
                15,
                Adventure(AdventureEffect::TownPortal),
            ),
        ];

        let mut catalog = Self::new();
        for spell in spells {
            catalog.insert(spell);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog() {
        let catalog = SpellCatalog::standard();
        assert_eq!(catalog.len(), 16);

        let fireball = catalog.get("FIREBALL").expect("fireball");
        assert_eq!(fireball.mana_cost, 15);
        assert!(fireball.is_hostile());

        assert!(catalog.get("TOWN_PORTAL").is_some_and(Spell::is_adventure));
        assert!(!catalog.get("CURE").is_some_and(Spell::is_hostile));
    }
}
