//! Character kind and size.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Player character or non-player character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterKind {
    Pc,
    Npc,
}

impl fmt::Display for CharacterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pc => write!(f, "pc"),
            Self::Npc => write!(f, "npc"),
        }
    }
}

impl FromStr for CharacterKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pc" | "player" => Ok(Self::Pc),
            "npc" => Ok(Self::Npc),
            _ => Err(DomainError::parse(format!("Unknown character kind: {}", s))),
        }
    }
}

/// Creature size category. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    Tiny,
    Small,
    #[default]
    Medium,
    Large,
    Huge,
    Gargantuan,
}

impl FromStr for Size {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tiny" => Ok(Self::Tiny),
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            "huge" => Ok(Self::Huge),
            "gargantuan" => Ok(Self::Gargantuan),
            _ => Err(DomainError::parse(format!("Unknown size: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_and_displays() {
        assert_eq!("PC".parse::<CharacterKind>().unwrap(), CharacterKind::Pc);
        assert_eq!("npc".parse::<CharacterKind>().unwrap(), CharacterKind::Npc);
        assert!("monster".parse::<CharacterKind>().is_err());
        assert_eq!(CharacterKind::Npc.to_string(), "npc");
    }

    #[test]
    fn size_defaults_to_medium() {
        assert_eq!(Size::default(), Size::Medium);
        assert_eq!("Large".parse::<Size>().unwrap(), Size::Large);
    }
}
