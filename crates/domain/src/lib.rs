//! Character sheet domain: records, validation and derived statistics.
//!
//! Everything in this crate is synchronous and free of I/O. The engine crate
//! wires it to storage and access control.

pub mod access;
pub mod aggregates;
pub mod calculations;
pub mod error;
pub mod events;
pub mod game_systems;
pub mod ids;
pub mod validation;
pub mod value_objects;

pub use access::Permissions;
pub use aggregates::{CharacterRecord, CharacterSummary};
pub use calculations::{
    CarryingCapacity, CharacterStats, EncumbranceLevel, EncumbranceThresholds, EquipmentWeight,
    ExperienceInfo, SpellcastingStats, Vitality, XpTable,
};
pub use error::DomainError;
pub use events::{DamageOutcome, HealOutcome, TemporaryHpOutcome};
pub use game_systems::{CasterType, ClassCatalog, Dnd5eSystem};
pub use ids::{CharacterId, PartyId, RestoreToken, UserId};
pub use validation::{
    validate_create, validate_update, CharacterChanges, CharacterInput, FieldViolation,
    NewCharacter, ValidationError,
};
pub use value_objects::{
    Ability, AbilityScore, AbilityScores, CharacterKind, HitPoints, LifecycleStatus, Skill,
};
