//! Hit point pool.
//!
//! The state transitions (damage, healing, temporary HP) live in
//! [`crate::calculations::damage`]; this type only guarantees that a pool is
//! well formed.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Maximum, current and temporary hit points.
///
/// # Invariants
///
/// - `current <= maximum`
/// - all three values are non-negative (enforced by `u32`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HitPointsRaw", into = "HitPointsRaw")]
pub struct HitPoints {
    maximum: u32,
    current: u32,
    temporary: u32,
}

impl HitPoints {
    /// Create a validated hit point pool.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `current` exceeds `maximum`.
    pub fn new(maximum: u32, current: u32, temporary: u32) -> Result<Self, DomainError> {
        if current > maximum {
            return Err(DomainError::validation(format!(
                "Current hit points ({}) cannot exceed maximum ({})",
                current, maximum
            )));
        }
        Ok(Self {
            maximum,
            current,
            temporary,
        })
    }

    /// A pool at full health with no temporary hit points.
    pub fn full(maximum: u32) -> Self {
        Self {
            maximum,
            current: maximum,
            temporary: 0,
        }
    }

    #[inline]
    pub fn maximum(&self) -> u32 {
        self.maximum
    }

    #[inline]
    pub fn current(&self) -> u32 {
        self.current
    }

    #[inline]
    pub fn temporary(&self) -> u32 {
        self.temporary
    }

    // Crate-internal constructor for transitions that already uphold the invariant.
    pub(crate) fn from_parts_unchecked(maximum: u32, current: u32, temporary: u32) -> Self {
        debug_assert!(current <= maximum);
        Self {
            maximum,
            current,
            temporary,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct HitPointsRaw {
    maximum: u32,
    current: u32,
    #[serde(default)]
    temporary: u32,
}

impl TryFrom<HitPointsRaw> for HitPoints {
    type Error = DomainError;

    fn try_from(raw: HitPointsRaw) -> Result<Self, Self::Error> {
        Self::new(raw.maximum, raw.current, raw.temporary)
    }
}

impl From<HitPoints> for HitPointsRaw {
    fn from(hp: HitPoints) -> Self {
        Self {
            maximum: hp.maximum,
            current: hp.current,
            temporary: hp.temporary,
        }
    }
}
