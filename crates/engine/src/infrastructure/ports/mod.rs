//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Character storage (in-memory today, a database tomorrow)
//! - Access control (owner comparison today, an auth service tomorrow)
//! - Clock (for testing)

mod error;
mod repos;
mod testing;

pub use error::RepoError;
pub use repos::{AccessControl, CharacterFilter, CharacterRepo};
pub use testing::ClockPort;

#[cfg(test)]
pub use repos::{MockAccessControl, MockCharacterRepo};
#[cfg(test)]
pub use testing::MockClockPort;
