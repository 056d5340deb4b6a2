//! Persistence adapters
//!
//! Implements the storage port for character records.

mod memory;

pub use memory::InMemoryCharacterRepo;
