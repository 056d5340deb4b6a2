//! Loosely typed command payloads.
//!
//! Every field is optional and numbers are wide (`i64`/`f64`) so that
//! out-of-range values reach the gate as range violations instead of failing
//! deserialization. Enumerations travel as strings for the same reason.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{FieldViolation, ValidationError};
use crate::value_objects::Ability;

/// Creation or update payload for a character.
///
/// For creation, the required fields are `name`, `kind`, `race`, `classes`,
/// all six `abilityScores`, `hitPoints.maximum` and `armorClass`. For updates,
/// every field is optional and only supplied fields are checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub race: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<ClassInput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ability_scores: Option<AbilityScoresInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_points: Option<HitPointsInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armor_class: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saving_throw_proficiencies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_proficiencies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<Vec<EquipmentInput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spells: Option<Vec<SpellInput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_points: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backstory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_id: Option<Uuid>,
}

impl CharacterInput {
    /// Decode an untyped JSON payload.
    ///
    /// Structural type errors (a string where an object belongs, etc.) are
    /// reported as a single violation on the `body` field.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ValidationError> {
        serde_json::from_value(value).map_err(|e| {
            ValidationError::InvalidData(vec![FieldViolation::new("body", e.to_string())])
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassInput {
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default)]
    pub subclass: Option<String>,
    #[serde(default)]
    pub hit_die: Option<String>,
}

impl ClassInput {
    pub fn new(class_name: impl Into<String>, level: i64, hit_die: impl Into<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            level: Some(level),
            subclass: None,
            hit_die: Some(hit_die.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScoresInput {
    #[serde(default)]
    pub strength: Option<i64>,
    #[serde(default)]
    pub dexterity: Option<i64>,
    #[serde(default)]
    pub constitution: Option<i64>,
    #[serde(default)]
    pub intelligence: Option<i64>,
    #[serde(default)]
    pub wisdom: Option<i64>,
    #[serde(default)]
    pub charisma: Option<i64>,
}

impl AbilityScoresInput {
    /// All six scores at once, in STR/DEX/CON/INT/WIS/CHA order.
    pub fn all(scores: [i64; 6]) -> Self {
        let [strength, dexterity, constitution, intelligence, wisdom, charisma] = scores;
        Self {
            strength: Some(strength),
            dexterity: Some(dexterity),
            constitution: Some(constitution),
            intelligence: Some(intelligence),
            wisdom: Some(wisdom),
            charisma: Some(charisma),
        }
    }

    pub fn get(&self, ability: Ability) -> Option<i64> {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPointsInput {
    #[serde(default)]
    pub maximum: Option<i64>,
    #[serde(default)]
    pub current: Option<i64>,
    #[serde(default)]
    pub temporary: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub equipped: Option<bool>,
    #[serde(default)]
    pub magical: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default)]
    pub prepared: Option<bool>,
}
