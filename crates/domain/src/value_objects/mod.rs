//! Value objects for the character record.

mod abilities;
mod classes;
mod hit_points;
mod identity;
mod inventory;
mod lifecycle;
mod names;
mod skills;

pub use abilities::{
    Ability, AbilityScore, AbilityScores, SaveProficiencies, MAX_ABILITY_SCORE, MIN_ABILITY_SCORE,
};
pub use classes::{ClassLevel, ClassList, HitDie, MAX_CHARACTER_LEVEL};
pub(crate) use classes::{first_duplicate, sum_levels};
pub use hit_points::HitPoints;
pub use identity::{CharacterKind, Size};
pub use inventory::{EquipmentItem, SpellEntry, MAX_SPELL_LEVEL};
pub use lifecycle::LifecycleStatus;
pub use names::{
    CharacterName, ClassName, FreeText, MAX_CLASS_NAME_LENGTH, MAX_FREE_TEXT_LENGTH,
    MAX_NAME_LENGTH,
};
pub use skills::Skill;
