//! Rules-table traits.
//!
//! These traits define the seam between the derived-statistics engines and
//! a concrete game system, so a different slot table or class list can be
//! injected without touching the calculations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value_objects::{Ability, ClassLevel};

/// Spell slots by spell level (1..=9) to slot count.
pub type SpellSlots = BTreeMap<u8, u32>;

/// Type of spellcaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CasterType {
    /// Full caster (Wizard, Cleric, Druid, Sorcerer, Bard)
    Full,
    /// Half caster (Paladin, Ranger)
    Half,
    /// Third caster (Eldritch Knight, Arcane Trickster)
    Third,
    /// Pact magic (Warlock)
    Pact,
}

impl CasterType {
    /// Get the caster level for multiclassing calculations.
    pub fn effective_caster_levels(&self, class_level: u8) -> u8 {
        match self {
            CasterType::Full => class_level,
            CasterType::Half => class_level / 2,
            CasterType::Third => class_level / 3,
            CasterType::Pact => 0, // Pact slots are tracked separately
        }
    }
}

/// Pact magic slots: every slot is cast at the same level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PactSlots {
    pub slot_level: u8,
    pub count: u32,
}

/// Class list and spell slot tables for one game system.
///
/// Class lookups are case-insensitive. Unknown classes are non-casters.
pub trait ClassCatalog: Send + Sync {
    /// Unique identifier for this game system (e.g., "dnd5e").
    fn system_id(&self) -> &str;

    /// Casting progression for a class entry, or `None` for non-casters.
    ///
    /// Takes the whole entry because some subclasses grant spellcasting
    /// to an otherwise non-casting class.
    fn caster_type(&self, class: &ClassLevel) -> Option<CasterType>;

    /// Ability that governs spell attacks and save DCs for a class entry.
    fn spellcasting_ability(&self, class: &ClassLevel) -> Option<Ability>;

    /// Slots from the shared multiclass spellcaster table.
    /// Caster level 0 has no slots.
    fn multiclass_slots(&self, caster_level: u8) -> SpellSlots;

    /// Pact magic slots for a pact caster of the given class level.
    fn pact_slots(&self, class_level: u8) -> Option<PactSlots>;
}
