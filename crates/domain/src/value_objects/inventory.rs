//! Equipment and spell list entries.

use serde::{Deserialize, Serialize};

/// A carried item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentItem {
    pub name: String,
    pub quantity: u32,
    /// Weight of a single unit, in pounds.
    pub weight: f64,
    /// Value of a single unit, in gold pieces.
    pub value: f64,
    #[serde(default)]
    pub equipped: bool,
    #[serde(default)]
    pub magical: bool,
}

impl EquipmentItem {
    pub fn new(name: impl Into<String>, quantity: u32, weight: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            weight,
            value: 0.0,
            equipped: false,
            magical: false,
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    pub fn equipped(mut self) -> Self {
        self.equipped = true;
        self
    }

    pub fn magical(mut self) -> Self {
        self.magical = true;
        self
    }

    /// `weight × quantity`.
    pub fn total_weight(&self) -> f64 {
        self.weight * f64::from(self.quantity)
    }
}

/// Highest spell level.
pub const MAX_SPELL_LEVEL: u8 = 9;

/// A spell on the character's list. Level 0 is a cantrip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellEntry {
    pub name: String,
    pub level: u8,
    #[serde(default)]
    pub prepared: bool,
}

impl SpellEntry {
    pub fn new(name: impl Into<String>, level: u8) -> Self {
        Self {
            name: name.into(),
            level,
            prepared: false,
        }
    }

    pub fn is_cantrip(&self) -> bool {
        self.level == 0
    }
}
