//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific domain area.

pub mod character;

pub use character::{CharacterError, CharacterSearch, CharacterUseCases, HitPointsResult};
