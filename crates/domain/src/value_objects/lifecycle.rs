//! Soft-delete lifecycle.
//!
//! A deleted character keeps its data for a short restoration window. Expiry
//! is evaluated against the caller's clock on every read; nothing runs in the
//! background, so a record past its window simply stops being visible.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::RestoreToken;

/// Whether a record is live or waiting out its restoration window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum LifecycleStatus {
    #[default]
    Active,
    #[serde(rename_all = "camelCase")]
    PendingDeletion {
        deleted_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        restore_token: RestoreToken,
    },
}

impl LifecycleStatus {
    /// Start a pending deletion that can be undone until `now + window`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Constraint` if the window is not positive or
    /// the expiry falls outside the representable time range.
    pub fn pending_deletion(
        now: DateTime<Utc>,
        window: Duration,
        token: RestoreToken,
    ) -> Result<Self, DomainError> {
        if window <= Duration::zero() {
            return Err(DomainError::constraint(format!(
                "restore window must be positive, got {}",
                window
            )));
        }
        let expires_at = now.checked_add_signed(window).ok_or_else(|| {
            DomainError::constraint(format!("restore window of {} overflows the clock", window))
        })?;
        Ok(Self::PendingDeletion {
            deleted_at: now,
            expires_at,
            restore_token: token,
        })
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// A pending deletion whose window has closed. The record is gone for good.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::Active => false,
            Self::PendingDeletion { expires_at, .. } => now >= *expires_at,
        }
    }

    /// Whether `token` can restore the record right now.
    pub fn can_restore(&self, token: RestoreToken, now: DateTime<Utc>) -> bool {
        match self {
            Self::Active => false,
            Self::PendingDeletion {
                expires_at,
                restore_token,
                ..
            } => *restore_token == token && now < *expires_at,
        }
    }
}
