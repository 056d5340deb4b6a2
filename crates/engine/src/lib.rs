//! SheetKeeper Engine library.
//!
//! Everything outside the pure domain crate lives here.
//!
//! ## Structure
//!
//! - `infrastructure/` - Ports and their adapters (storage, access control, clock, importers)
//! - `use_cases/` - The character façade composed over the ports
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
