//! Validation gate for character commands.
//!
//! Commands arrive as loosely typed [`CharacterInput`] payloads. The gate runs
//! schema checks first (types, ranges, required fields) and collects every
//! violation it finds. Business rules (multiclass uniqueness, level cap) run
//! only once the schema is clean.

mod gate;
mod input;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use gate::{validate_create, validate_update, CharacterChanges, HitPointsChanges, NewCharacter};
pub use input::{
    AbilityScoresInput, CharacterInput, ClassInput, EquipmentInput, HitPointsInput, SpellInput,
};

/// One field-level schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Dotted path of the offending field, e.g. `classes[1].level`.
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Why a command was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Schema-level failure: one or more fields are missing, mistyped, or out of range.
    #[error("Invalid character data: {}", describe(.0))]
    InvalidData(Vec<FieldViolation>),

    /// The class levels add up to more than 20.
    #[error("Total character level {total} exceeds the maximum of 20")]
    InvalidLevel { total: u32 },

    /// The same class name appears in more than one class entry.
    #[error("Class {class_name} appears more than once")]
    DuplicateClass { class_name: String },
}

impl ValidationError {
    /// Shorthand for a single-violation schema failure.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidData(vec![FieldViolation::new(field, message)])
    }

    /// Field violations carried by a schema failure (empty for business-rule failures).
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::InvalidData(violations) => violations,
            _ => &[],
        }
    }
}

fn describe(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}
