//! Validated text newtypes for character records
//!
//! These newtypes ensure that text is valid by construction:
//! - Non-empty (except FreeText)
//! - Within length limits
//! - Trimmed of leading/trailing whitespace

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Maximum length for character names
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length for class and subclass names
pub const MAX_CLASS_NAME_LENGTH: usize = 60;

/// Maximum length for backstory and notes
pub const MAX_FREE_TEXT_LENGTH: usize = 10_000;

// ============================================================================
// CharacterName
// ============================================================================

/// A validated character name (non-empty, <=200 chars, trimmed)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CharacterName(String);

impl CharacterName {
    /// Create a new validated character name.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if:
    /// - The name is empty after trimming
    /// - The name exceeds 200 characters after trimming
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("Character name cannot be empty"));
        }
        if trimmed.chars().count() > MAX_NAME_LENGTH {
            return Err(DomainError::validation(format!(
                "Character name cannot exceed {} characters",
                MAX_NAME_LENGTH
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharacterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CharacterName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CharacterName> for String {
    fn from(name: CharacterName) -> String {
        name.0
    }
}

// ============================================================================
// ClassName
// ============================================================================

/// A validated class name (non-empty, <=60 chars, trimmed).
///
/// Equality is exact; use [`ClassName::matches`] for the case-insensitive
/// comparison that multiclass uniqueness is defined on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClassName(String);

impl ClassName {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("Class name cannot be empty"));
        }
        if trimmed.chars().count() > MAX_CLASS_NAME_LENGTH {
            return Err(DomainError::validation(format!(
                "Class name cannot exceed {} characters",
                MAX_CLASS_NAME_LENGTH
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased key used for catalog lookups and duplicate detection.
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }

    pub fn matches(&self, other: &ClassName) -> bool {
        self.key() == other.key()
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ClassName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ClassName> for String {
    fn from(name: ClassName) -> String {
        name.0
    }
}

// ============================================================================
// FreeText
// ============================================================================

/// Backstory and notes (may be empty, <=10000 chars)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FreeText(String);

impl FreeText {
    pub fn new(text: impl Into<String>) -> Result<Self, DomainError> {
        let text = text.into();
        if text.chars().count() > MAX_FREE_TEXT_LENGTH {
            return Err(DomainError::validation(format!(
                "Text cannot exceed {} characters",
                MAX_FREE_TEXT_LENGTH
            )));
        }
        Ok(Self(text))
    }

    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<String> for FreeText {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<FreeText> for String {
    fn from(text: FreeText) -> String {
        text.0
    }
}
