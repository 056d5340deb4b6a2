//! Value-object errors.
//!
//! `DomainError` covers value-object construction failures. Command
//! validation has its own richer type in [`crate::validation::ValidationError`]
//! because callers need the full list of field violations.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// A table or collection rule, such as a non-increasing XP table.
    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl DomainError {
    /// A value fell outside what a value object accepts, e.g. an empty name
    /// or an ability score of 31.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// A string did not name a known variant (skill, ability, hit die).
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    /// The message without the category prefix, for field-level reporting.
    pub fn detail(&self) -> &str {
        match self {
            Self::Validation(msg) | Self::Parse(msg) | Self::Constraint(msg) => msg,
        }
    }
}
