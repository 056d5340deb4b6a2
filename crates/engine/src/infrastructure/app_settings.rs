//! Engine settings.
//!
//! Defaults are tuned for a single-user tracker. Every value can be
//! overridden from the environment; the binary loads `.env` first.
//! A value that fails to parse is ignored with a warning and the default
//! stays in place.

use serde::{Deserialize, Deserializer, Serialize};
use sheetkeeper_domain::EncumbranceThresholds;

pub const ENV_MAX_CHARACTERS: &str = "SHEETKEEPER_MAX_CHARACTERS";
pub const ENV_RESTORE_WINDOW_SECS: &str = "SHEETKEEPER_RESTORE_WINDOW_SECS";
pub const ENV_MAX_WRITE_RETRIES: &str = "SHEETKEEPER_MAX_WRITE_RETRIES";

/// Longest accepted restore window: one year.
pub const MAX_RESTORE_WINDOW_SECS: i64 = 365 * 24 * 60 * 60;

fn default_max_characters_per_owner() -> u64 {
    50
}

fn default_restore_window_secs() -> i64 {
    24 * 60 * 60
}

fn default_max_write_retries() -> u32 {
    5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Active characters one owner may hold.
    #[serde(default = "default_max_characters_per_owner")]
    pub max_characters_per_owner: u64,

    /// How long a soft-deleted character can be restored. 1 to
    /// [`MAX_RESTORE_WINDOW_SECS`].
    #[serde(
        default = "default_restore_window_secs",
        deserialize_with = "deserialize_restore_window"
    )]
    pub restore_window_secs: i64,

    /// Re-reads allowed after a revision conflict before giving up.
    #[serde(default = "default_max_write_retries")]
    pub max_write_retries: u32,

    #[serde(default)]
    pub encumbrance: EncumbranceThresholds,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_characters_per_owner: default_max_characters_per_owner(),
            restore_window_secs: default_restore_window_secs(),
            max_write_retries: default_max_write_retries(),
            encumbrance: EncumbranceThresholds::default(),
        }
    }
}

impl EngineSettings {
    /// Defaults overridden by any valid environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EngineSettings::from_env`] with an injectable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            max_characters_per_owner: parse_override(
                &lookup,
                ENV_MAX_CHARACTERS,
                defaults.max_characters_per_owner,
                |v: &u64| *v > 0,
            ),
            restore_window_secs: parse_override(
                &lookup,
                ENV_RESTORE_WINDOW_SECS,
                defaults.restore_window_secs,
                valid_restore_window,
            ),
            max_write_retries: parse_override(
                &lookup,
                ENV_MAX_WRITE_RETRIES,
                defaults.max_write_retries,
                |_: &u32| true,
            ),
            encumbrance: defaults.encumbrance,
        }
    }

    /// The restore window as a duration. Out-of-range values set directly
    /// on the struct are clamped into range.
    pub fn restore_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.restore_window_secs.clamp(1, MAX_RESTORE_WINDOW_SECS))
    }
}

fn valid_restore_window(secs: &i64) -> bool {
    (1..=MAX_RESTORE_WINDOW_SECS).contains(secs)
}

fn deserialize_restore_window<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = i64::deserialize(deserializer)?;
    if valid_restore_window(&secs) {
        Ok(secs)
    } else {
        Err(serde::de::Error::custom(format!(
            "restore_window_secs must be between 1 and {}, got {}",
            MAX_RESTORE_WINDOW_SECS, secs
        )))
    }
}

fn parse_override<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    valid: impl Fn(&T) -> bool,
) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => value,
        _ => {
            tracing::warn!(
                key,
                value = %raw,
                default = %default,
                "Invalid setting, using default"
            );
            default
        }
    }
}
