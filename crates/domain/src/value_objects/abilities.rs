//! Ability scores and saving-throw proficiencies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Lowest legal ability score.
pub const MIN_ABILITY_SCORE: u8 = 1;

/// Highest legal ability score.
pub const MAX_ABILITY_SCORE: u8 = 30;

/// The six abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    /// All abilities in sheet order.
    pub const ALL: [Ability; 6] = [
        Ability::Strength,
        Ability::Dexterity,
        Ability::Constitution,
        Ability::Intelligence,
        Ability::Wisdom,
        Ability::Charisma,
    ];

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Ability::Strength => "strength",
            Ability::Dexterity => "dexterity",
            Ability::Constitution => "constitution",
            Ability::Intelligence => "intelligence",
            Ability::Wisdom => "wisdom",
            Ability::Charisma => "charisma",
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Ability {
    type Err = DomainError;

    /// Accepts full names or three-letter abbreviations, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Ability::ALL
            .into_iter()
            .find(|a| a.name() == normalized || a.abbreviation().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| DomainError::parse(format!("Unknown ability: {}", s)))
    }
}

// ============================================================================
// AbilityScore
// ============================================================================

/// A single ability score, always within 1..=30.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AbilityScore(u8);

impl AbilityScore {
    /// Create a validated ability score.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the score is outside 1..=30.
    pub fn new(score: u8) -> Result<Self, DomainError> {
        if !(MIN_ABILITY_SCORE..=MAX_ABILITY_SCORE).contains(&score) {
            return Err(DomainError::validation(format!(
                "Ability score must be between {} and {}, got {}",
                MIN_ABILITY_SCORE, MAX_ABILITY_SCORE, score
            )));
        }
        Ok(Self(score))
    }

    #[inline]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for AbilityScore {
    fn default() -> Self {
        Self(10)
    }
}

impl TryFrom<u8> for AbilityScore {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AbilityScore> for u8 {
    fn from(score: AbilityScore) -> u8 {
        score.0
    }
}

impl fmt::Display for AbilityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// AbilityScores
// ============================================================================

/// The full block of six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: AbilityScore,
    pub dexterity: AbilityScore,
    pub constitution: AbilityScore,
    pub intelligence: AbilityScore,
    pub wisdom: AbilityScore,
    pub charisma: AbilityScore,
}

impl AbilityScores {
    pub fn get(&self, ability: Ability) -> AbilityScore {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    /// Returns a copy with one score replaced.
    pub fn with(mut self, ability: Ability, score: AbilityScore) -> Self {
        match ability {
            Ability::Strength => self.strength = score,
            Ability::Dexterity => self.dexterity = score,
            Ability::Constitution => self.constitution = score,
            Ability::Intelligence => self.intelligence = score,
            Ability::Wisdom => self.wisdom = score,
            Ability::Charisma => self.charisma = score,
        }
        self
    }
}

// ============================================================================
// Saving throw proficiencies
// ============================================================================

/// One proficiency flag per saving throw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SaveProficiencies {
    pub strength: bool,
    pub dexterity: bool,
    pub constitution: bool,
    pub intelligence: bool,
    pub wisdom: bool,
    pub charisma: bool,
}

impl SaveProficiencies {
    /// Build flags from the abilities a character is proficient in.
    pub fn from_abilities(abilities: impl IntoIterator<Item = Ability>) -> Self {
        abilities
            .into_iter()
            .fold(Self::default(), |flags, ability| flags.with(ability, true))
    }

    pub fn has(&self, ability: Ability) -> bool {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn with(mut self, ability: Ability, proficient: bool) -> Self {
        match ability {
            Ability::Strength => self.strength = proficient,
            Ability::Dexterity => self.dexterity = proficient,
            Ability::Constitution => self.constitution = proficient,
            Ability::Intelligence => self.intelligence = proficient,
            Ability::Wisdom => self.wisdom = proficient,
            Ability::Charisma => self.charisma = proficient,
        }
        self
    }
}
