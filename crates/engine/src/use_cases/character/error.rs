//! Character operation errors.

use sheetkeeper_domain::{FieldViolation, ValidationError};

use crate::infrastructure::importers::ImportError;
use crate::infrastructure::ports::RepoError;

/// Errors that can occur during character operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CharacterError {
    #[error("Invalid character data: {}", describe(.0))]
    InvalidCharacterData(Vec<FieldViolation>),

    #[error("Total character level {total} exceeds the maximum of 20")]
    InvalidCharacterLevel { total: u32 },

    #[error("Invalid multiclass combination: {class_name} appears more than once")]
    InvalidMulticlassCombination { class_name: String },

    #[error("Character not found: {id}")]
    CharacterNotFound { id: String },

    #[error("Not authorized to perform this action")]
    UnauthorizedAccess,

    #[error("Character limit of {limit} reached")]
    CharacterLimitExceeded { limit: u64 },

    #[error("Database error in {operation}: {message}")]
    DatabaseError {
        operation: &'static str,
        message: String,
    },

    #[error("Unknown import format: {0}")]
    UnknownImportFormat(String),

    #[error("Restore token is invalid")]
    InvalidRestoreToken,
}

impl CharacterError {
    pub fn not_found(id: impl ToString) -> Self {
        Self::CharacterNotFound { id: id.to_string() }
    }

    /// Stable machine-readable code for outer layers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCharacterData(_) => "INVALID_CHARACTER_DATA",
            Self::InvalidCharacterLevel { .. } => "INVALID_CHARACTER_LEVEL",
            Self::InvalidMulticlassCombination { .. } => "INVALID_MULTICLASS_COMBINATION",
            Self::CharacterNotFound { .. } => "CHARACTER_NOT_FOUND",
            Self::UnauthorizedAccess => "UNAUTHORIZED_ACCESS",
            Self::CharacterLimitExceeded { .. } => "CHARACTER_LIMIT_EXCEEDED",
            Self::DatabaseError { .. } => "DATABASE_ERROR",
            Self::UnknownImportFormat(_) => "UNKNOWN_IMPORT_FORMAT",
            Self::InvalidRestoreToken => "INVALID_RESTORE_TOKEN",
        }
    }

    /// Field violations for schema failures, empty otherwise.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::InvalidCharacterData(violations) => violations,
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

impl From<ValidationError> for CharacterError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidData(violations) => Self::InvalidCharacterData(violations),
            ValidationError::InvalidLevel { total } => Self::InvalidCharacterLevel { total },
            ValidationError::DuplicateClass { class_name } => {
                Self::InvalidMulticlassCombination { class_name }
            }
        }
    }
}

impl From<RepoError> for CharacterError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { id, .. } => Self::CharacterNotFound { id },
            RepoError::Conflict { .. } => Self::DatabaseError {
                operation: "update",
                message: err.to_string(),
            },
            RepoError::Database { operation, message } => {
                Self::DatabaseError { operation, message }
            }
        }
    }
}

impl From<ImportError> for CharacterError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::UnknownFormat(format) => Self::UnknownImportFormat(format),
            other => Self::InvalidCharacterData(vec![FieldViolation::new(
                "body",
                other.to_string(),
            )]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_character_errors() {
        let err: CharacterError = ValidationError::DuplicateClass {
            class_name: "Fighter".into(),
        }
        .into();
        assert_eq!(err.code(), "INVALID_MULTICLASS_COMBINATION");

        let err: CharacterError = ValidationError::InvalidLevel { total: 22 }.into();
        assert_eq!(err, CharacterError::InvalidCharacterLevel { total: 22 });

        let err: CharacterError = ValidationError::field("name", "is required").into();
        assert_eq!(err.violations()[0].field, "name");
    }

    #[test]
    fn repo_errors_keep_operation() {
        let err: CharacterError = RepoError::database("find_by_id", "connection reset").into();
        assert_eq!(
            err,
            CharacterError::DatabaseError {
                operation: "find_by_id",
                message: "connection reset".into()
            }
        );

        let err: CharacterError = RepoError::not_found("Character", "abc").into();
        assert_eq!(err, CharacterError::not_found("abc"));

        let err: CharacterError = RepoError::conflict("abc", 1, 2).into();
        assert!(matches!(err, CharacterError::DatabaseError { operation: "update", .. }));
    }

    #[test]
    fn import_errors_split_format_from_payload() {
        let err: CharacterError = ImportError::UnknownFormat("xml".into()).into();
        assert_eq!(err.code(), "UNKNOWN_IMPORT_FORMAT");

        let err: CharacterError = ImportError::Unsupported("v9".into()).into();
        assert_eq!(err.violations()[0].field, "body");
    }
}
