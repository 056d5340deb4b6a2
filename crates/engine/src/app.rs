//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    access::OwnerAccessControl,
    app_settings::EngineSettings,
    clock::SystemClock,
    persistence::InMemoryCharacterRepo,
    ports::{AccessControl, CharacterRepo, ClockPort},
};
use crate::use_cases;

/// Main application state.
///
/// Holds the settings the use cases were built with and the use cases themselves.
pub struct App {
    pub settings: EngineSettings,
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub character: use_cases::CharacterUseCases,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        character_repo: Arc<dyn CharacterRepo>,
        access: Arc<dyn AccessControl>,
        clock: Arc<dyn ClockPort>,
        settings: EngineSettings,
    ) -> Self {
        let character =
            use_cases::CharacterUseCases::new(character_repo, access, clock, settings.clone());

        Self {
            settings,
            use_cases: UseCases { character },
        }
    }

    /// In-memory storage, owner-based access control and the system clock.
    pub fn in_memory(settings: EngineSettings) -> Self {
        Self::new(
            Arc::new(InMemoryCharacterRepo::new()),
            Arc::new(OwnerAccessControl),
            Arc::new(SystemClock::new()),
            settings,
        )
    }
}
