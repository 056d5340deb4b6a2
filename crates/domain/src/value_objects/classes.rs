//! Class entries and the multiclass list.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::names::ClassName;
use crate::error::DomainError;

/// Highest level a single class entry, or a whole character, can reach.
pub const MAX_CHARACTER_LEVEL: u32 = 20;

/// Hit die rolled per class level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitDie {
    D6,
    D8,
    D10,
    D12,
}

impl HitDie {
    pub fn sides(&self) -> u8 {
        match self {
            HitDie::D6 => 6,
            HitDie::D8 => 8,
            HitDie::D10 => 10,
            HitDie::D12 => 12,
        }
    }
}

impl fmt::Display for HitDie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

impl FromStr for HitDie {
    type Err = DomainError;

    /// Accepts "d8", "D8", "1d8" or a bare "8".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let sides = lowered
            .strip_prefix("1d")
            .or_else(|| lowered.strip_prefix('d'))
            .unwrap_or(&lowered);
        match sides {
            "6" => Ok(HitDie::D6),
            "8" => Ok(HitDie::D8),
            "10" => Ok(HitDie::D10),
            "12" => Ok(HitDie::D12),
            _ => Err(DomainError::parse(format!("Unknown hit die: {}", s))),
        }
    }
}

/// One class a character has levels in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassLevel {
    pub class_name: ClassName,
    pub level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subclass: Option<String>,
    pub hit_die: HitDie,
}

impl ClassLevel {
    pub fn new(class_name: ClassName, level: u8, hit_die: HitDie) -> Self {
        Self {
            class_name,
            level,
            subclass: None,
            hit_die,
        }
    }

    pub fn with_subclass(mut self, subclass: impl Into<String>) -> Self {
        self.subclass = Some(subclass.into());
        self
    }
}

/// The ordered multiclass list.
///
/// # Invariants
///
/// - at least one entry
/// - every entry has level >= 1
/// - class names are unique (case-insensitive)
/// - total level is within 1..=20
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ClassLevel>", into = "Vec<ClassLevel>")]
pub struct ClassList(Vec<ClassLevel>);

impl ClassList {
    /// Build a class list, checking every multiclass invariant.
    pub fn new(entries: Vec<ClassLevel>) -> Result<Self, DomainError> {
        if entries.is_empty() {
            return Err(DomainError::validation("A character needs at least one class"));
        }
        if let Some(entry) = entries.iter().find(|e| e.level == 0) {
            return Err(DomainError::validation(format!(
                "Class {} must have at least one level",
                entry.class_name
            )));
        }
        if let Some(duplicate) = first_duplicate(&entries) {
            return Err(DomainError::constraint(format!(
                "Class {} appears more than once",
                duplicate
            )));
        }
        let total = sum_levels(&entries);
        if total > MAX_CHARACTER_LEVEL {
            return Err(DomainError::constraint(format!(
                "Total level {} exceeds maximum of {}",
                total, MAX_CHARACTER_LEVEL
            )));
        }
        Ok(Self(entries))
    }

    pub fn entries(&self) -> &[ClassLevel] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ClassLevel> {
        self.0.iter()
    }

    /// Sum of all class levels.
    pub fn total_level(&self) -> u32 {
        sum_levels(&self.0)
    }
}

impl TryFrom<Vec<ClassLevel>> for ClassList {
    type Error = DomainError;

    fn try_from(entries: Vec<ClassLevel>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<ClassList> for Vec<ClassLevel> {
    fn from(list: ClassList) -> Self {
        list.0
    }
}

pub(crate) fn sum_levels(entries: &[ClassLevel]) -> u32 {
    entries.iter().map(|e| u32::from(e.level)).sum()
}

/// First class name that appears twice, compared case-insensitively.
pub(crate) fn first_duplicate(entries: &[ClassLevel]) -> Option<&ClassName> {
    entries.iter().enumerate().find_map(|(i, entry)| {
        entries[..i]
            .iter()
            .any(|earlier| earlier.class_name.matches(&entry.class_name))
            .then_some(&entry.class_name)
    })
}
