//! Derived-statistics engines.
//!
//! Every function here is pure over an immutable record or value object.
//! Nothing is cached; callers recompute on demand.

pub mod damage;
pub mod encumbrance;
pub mod progression;
pub mod spellcasting;
pub mod stats;

pub use damage::{effective_hp, vitality, Vitality};
pub use encumbrance::{
    carrying_capacity, encumbrance_level, equipment_weight, CarryingCapacity, EncumbranceLevel,
    EncumbranceThresholds, EquipmentWeight,
};
pub use progression::{proficiency_bonus, total_level, ExperienceInfo, XpTable};
pub use spellcasting::{caster_level, calculate_spellcasting, SpellcastingStats};
pub use stats::{ability_modifier, calculate_character_stats, CharacterStats};
