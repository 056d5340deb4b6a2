//! Domain events
//!
//! Return types from aggregate mutations, communicating what happened when
//! hit point state was modified so the use-case layer can log and respond.

pub mod character_events;

pub use character_events::*;
