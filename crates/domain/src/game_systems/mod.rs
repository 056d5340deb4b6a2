//! Game system rules tables.
//!
//! The calculation engines never hard-code class names. They ask a
//! [`ClassCatalog`] how a class casts spells and which slot tables apply.
//! [`Dnd5eSystem`] is the default catalog, built from the 5e SRD.

mod dnd5e;
mod traits;

pub use dnd5e::{Dnd5eSystem, XP_THRESHOLDS};
pub use traits::{CasterType, ClassCatalog, PactSlots, SpellSlots};
