//! Hit-point mutation outcomes
//!
//! These enums communicate what happened when a damage, heal or
//! temporary-HP command ran, allowing callers to react appropriately.

use serde::{Deserialize, Serialize};

/// Outcome of applying damage to a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum DamageOutcome {
    /// Amount was zero or negative, nothing changed
    NoEffect,
    /// Temporary hit points soaked the whole hit
    #[serde(rename_all = "camelCase")]
    Absorbed { absorbed: u32, remaining_temporary: u32 },
    /// Character took damage but is still conscious
    #[serde(rename_all = "camelCase")]
    Wounded {
        absorbed: u32,
        damage_dealt: u32,
        remaining_hp: u32,
    },
    /// Current hit points reached zero
    #[serde(rename_all = "camelCase")]
    KnockedOut { absorbed: u32, damage_dealt: u32 },
}

/// Outcome of healing a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum HealOutcome {
    /// Amount was zero or negative, nothing changed
    NoEffect,
    /// Already at max HP
    AlreadyFull,
    /// Healing applied, capped at the maximum
    #[serde(rename_all = "camelCase")]
    Healed { amount_healed: u32, new_hp: u32 },
}

/// Outcome of granting temporary hit points. Temporary HP never stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum TemporaryHpOutcome {
    /// Amount was zero or negative, nothing changed
    NoEffect,
    /// The new pool replaced a smaller one
    Granted { previous: u32, temporary: u32 },
    /// The existing pool was at least as large and was kept
    Kept { temporary: u32 },
}

impl DamageOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, DamageOutcome::NoEffect)
    }
}

impl HealOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, HealOutcome::Healed { .. })
    }
}

impl TemporaryHpOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, TemporaryHpOutcome::Granted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_serialize_with_tag() {
        let json = serde_json::to_value(DamageOutcome::Wounded {
            absorbed: 2,
            damage_dealt: 5,
            remaining_hp: 7,
        })
        .unwrap();
        assert_eq!(json["outcome"], "wounded");
        assert_eq!(json["damageDealt"], 5);
        assert_eq!(json["remainingHp"], 7);
    }

    #[test]
    fn only_real_changes_report_changed() {
        assert!(!DamageOutcome::NoEffect.changed());
        assert!(!HealOutcome::AlreadyFull.changed());
        assert!(!TemporaryHpOutcome::Kept { temporary: 5 }.changed());
        assert!(TemporaryHpOutcome::Granted {
            previous: 0,
            temporary: 5
        }
        .changed());
    }
}
