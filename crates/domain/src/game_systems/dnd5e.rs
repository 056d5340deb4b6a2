//! D&D 5th Edition rules tables.
//!
//! Class casting progressions, the multiclass spell slot table and the pact
//! magic table, all from the SRD.

use super::traits::{CasterType, ClassCatalog, PactSlots, SpellSlots};
use crate::value_objects::{Ability, ClassLevel};

/// XP thresholds for each level in D&D 5e.
/// Index is level - 1 (so level 1 = index 0).
pub const XP_THRESHOLDS: [u32; 20] = [
    0,      // Level 1
    300,    // Level 2
    900,    // Level 3
    2700,   // Level 4
    6500,   // Level 5
    14000,  // Level 6
    23000,  // Level 7
    34000,  // Level 8
    48000,  // Level 9
    64000,  // Level 10
    85000,  // Level 11
    100000, // Level 12
    120000, // Level 13
    140000, // Level 14
    165000, // Level 15
    195000, // Level 16
    225000, // Level 17
    265000, // Level 18
    305000, // Level 19
    355000, // Level 20
];

/// Multiclass spellcaster table, indexed by caster level - 1.
/// Each row lists slot counts for spell levels 1 upward.
const MULTICLASS_SLOTS: [&[u32]; 20] = [
    &[2],
    &[3],
    &[4, 2],
    &[4, 3],
    &[4, 3, 2],
    &[4, 3, 3],
    &[4, 3, 3, 1],
    &[4, 3, 3, 2],
    &[4, 3, 3, 3, 1],
    &[4, 3, 3, 3, 2],
    &[4, 3, 3, 3, 2, 1],
    &[4, 3, 3, 3, 2, 1],
    &[4, 3, 3, 3, 2, 1, 1],
    &[4, 3, 3, 3, 2, 1, 1],
    &[4, 3, 3, 3, 2, 1, 1, 1],
    &[4, 3, 3, 3, 2, 1, 1, 1],
    &[4, 3, 3, 3, 2, 1, 1, 1, 1],
    &[4, 3, 3, 3, 3, 1, 1, 1, 1],
    &[4, 3, 3, 3, 3, 2, 1, 1, 1],
    &[4, 3, 3, 3, 3, 2, 2, 1, 1],
];

/// D&D 5th Edition class catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dnd5eSystem;

impl Dnd5eSystem {
    /// Create a new D&D 5e catalog.
    pub fn new() -> Self {
        Self
    }

    /// Subclasses that turn a martial class into a third caster.
    fn third_caster_subclass(class: &ClassLevel) -> bool {
        let subclass = class.subclass.as_deref().map(str::to_lowercase);
        matches!(
            (class.class_name.key().as_str(), subclass.as_deref()),
            ("fighter", Some("eldritch knight")) | ("rogue", Some("arcane trickster"))
        )
    }
}

impl ClassCatalog for Dnd5eSystem {
    fn system_id(&self) -> &str {
        "dnd5e"
    }

    fn caster_type(&self, class: &ClassLevel) -> Option<CasterType> {
        match class.class_name.key().as_str() {
            "wizard" | "cleric" | "druid" | "sorcerer" | "bard" => Some(CasterType::Full),
            "paladin" | "ranger" => Some(CasterType::Half),
            "warlock" => Some(CasterType::Pact),
            "eldritch knight" | "arcane trickster" => Some(CasterType::Third),
            _ if Self::third_caster_subclass(class) => Some(CasterType::Third),
            _ => None,
        }
    }

    fn spellcasting_ability(&self, class: &ClassLevel) -> Option<Ability> {
        match class.class_name.key().as_str() {
            "wizard" | "eldritch knight" | "arcane trickster" => Some(Ability::Intelligence),
            "cleric" | "druid" | "ranger" => Some(Ability::Wisdom),
            "sorcerer" | "bard" | "paladin" | "warlock" => Some(Ability::Charisma),
            _ if Self::third_caster_subclass(class) => Some(Ability::Intelligence),
            _ => None,
        }
    }

    fn multiclass_slots(&self, caster_level: u8) -> SpellSlots {
        let level = usize::from(caster_level.min(20));
        if level == 0 {
            return SpellSlots::new();
        }
        MULTICLASS_SLOTS[level - 1]
            .iter()
            .zip(1u8..)
            .map(|(&count, spell_level)| (spell_level, count))
            .collect()
    }

    fn pact_slots(&self, class_level: u8) -> Option<PactSlots> {
        // Warlock pact magic - fewer slots but higher level
        let (count, slot_level) = match class_level {
            1 => (1, 1),
            2 => (2, 1),
            3..=4 => (2, 2),
            5..=6 => (2, 3),
            7..=8 => (2, 4),
            9..=10 => (2, 5),
            11..=16 => (3, 5),
            17..=20 => (4, 5),
            _ => return None,
        };
        Some(PactSlots { slot_level, count })
    }
}
