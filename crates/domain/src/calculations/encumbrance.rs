//! Carrying capacity and variant encumbrance.

use serde::{Deserialize, Serialize};

use crate::aggregates::CharacterRecord;
use crate::error::DomainError;
use crate::value_objects::{AbilityScore, EquipmentItem};

/// Encumbrance tier, ordered from unburdened to overloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncumbranceLevel {
    None,
    Light,
    Heavy,
    Overloaded,
}

/// Strength multipliers for capacity and each encumbrance tier.
///
/// A tier applies once carried weight is strictly greater than
/// `multiplier * strength`. Every multiplier is finite and positive, and
/// the tiers are strictly increasing: light < heavy < overloaded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ThresholdsDocument", into = "ThresholdsDocument")]
pub struct EncumbranceThresholds {
    capacity_multiplier: f64,
    light_multiplier: f64,
    heavy_multiplier: f64,
    overloaded_multiplier: f64,
}

impl EncumbranceThresholds {
    /// # Errors
    ///
    /// Returns `DomainError::Constraint` if a multiplier is not a finite
    /// positive number or the tiers are not strictly increasing.
    pub fn new(
        capacity_multiplier: f64,
        light_multiplier: f64,
        heavy_multiplier: f64,
        overloaded_multiplier: f64,
    ) -> Result<Self, DomainError> {
        let named = [
            ("capacityMultiplier", capacity_multiplier),
            ("lightMultiplier", light_multiplier),
            ("heavyMultiplier", heavy_multiplier),
            ("overloadedMultiplier", overloaded_multiplier),
        ];
        if let Some((name, value)) = named.iter().find(|(_, v)| !(v.is_finite() && *v > 0.0)) {
            return Err(DomainError::constraint(format!(
                "{} must be a finite positive number, got {}",
                name, value
            )));
        }
        if !(light_multiplier < heavy_multiplier && heavy_multiplier < overloaded_multiplier) {
            return Err(DomainError::constraint(format!(
                "encumbrance tiers must increase: light {} < heavy {} < overloaded {}",
                light_multiplier, heavy_multiplier, overloaded_multiplier
            )));
        }
        Ok(Self {
            capacity_multiplier,
            light_multiplier,
            heavy_multiplier,
            overloaded_multiplier,
        })
    }

    pub fn capacity_multiplier(&self) -> f64 {
        self.capacity_multiplier
    }

    pub fn light_multiplier(&self) -> f64 {
        self.light_multiplier
    }

    pub fn heavy_multiplier(&self) -> f64 {
        self.heavy_multiplier
    }

    pub fn overloaded_multiplier(&self) -> f64 {
        self.overloaded_multiplier
    }
}

impl Default for EncumbranceThresholds {
    fn default() -> Self {
        Self {
            capacity_multiplier: 15.0,
            light_multiplier: 5.0,
            heavy_multiplier: 10.0,
            overloaded_multiplier: 15.0,
        }
    }
}

/// Wire form of [`EncumbranceThresholds`]. Missing fields take the defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ThresholdsDocument {
    capacity_multiplier: f64,
    light_multiplier: f64,
    heavy_multiplier: f64,
    overloaded_multiplier: f64,
}

impl Default for ThresholdsDocument {
    fn default() -> Self {
        EncumbranceThresholds::default().into()
    }
}

impl TryFrom<ThresholdsDocument> for EncumbranceThresholds {
    type Error = DomainError;

    fn try_from(doc: ThresholdsDocument) -> Result<Self, Self::Error> {
        Self::new(
            doc.capacity_multiplier,
            doc.light_multiplier,
            doc.heavy_multiplier,
            doc.overloaded_multiplier,
        )
    }
}

impl From<EncumbranceThresholds> for ThresholdsDocument {
    fn from(t: EncumbranceThresholds) -> Self {
        Self {
            capacity_multiplier: t.capacity_multiplier,
            light_multiplier: t.light_multiplier,
            heavy_multiplier: t.heavy_multiplier,
            overloaded_multiplier: t.overloaded_multiplier,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarryingCapacity {
    pub maximum: f64,
    pub current: f64,
    pub encumbrance_level: EncumbranceLevel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentWeight {
    pub total: f64,
    pub equipped: f64,
    pub carried: f64,
}

/// Total weight of a list, split into equipped and carried-only subtotals.
pub fn equipment_weight(items: &[EquipmentItem]) -> EquipmentWeight {
    items.iter().fold(EquipmentWeight::default(), |mut acc, item| {
        let weight = item.total_weight();
        acc.total += weight;
        if item.equipped {
            acc.equipped += weight;
        } else {
            acc.carried += weight;
        }
        acc
    })
}

pub fn encumbrance_level(
    weight: f64,
    strength: AbilityScore,
    thresholds: &EncumbranceThresholds,
) -> EncumbranceLevel {
    let strength = f64::from(strength.value());
    if weight > thresholds.overloaded_multiplier * strength {
        EncumbranceLevel::Overloaded
    } else if weight > thresholds.heavy_multiplier * strength {
        EncumbranceLevel::Heavy
    } else if weight > thresholds.light_multiplier * strength {
        EncumbranceLevel::Light
    } else {
        EncumbranceLevel::None
    }
}

pub fn carrying_capacity(
    record: &CharacterRecord,
    thresholds: &EncumbranceThresholds,
) -> CarryingCapacity {
    let strength = record.ability_scores().strength;
    let current = equipment_weight(record.equipment()).total;
    CarryingCapacity {
        maximum: thresholds.capacity_multiplier * f64::from(strength.value()),
        current,
        encumbrance_level: encumbrance_level(current, strength, thresholds),
    }
}
