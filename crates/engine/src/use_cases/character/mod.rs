//! Character use cases.
//!
//! The façade over the character domain: validation, permission checks,
//! soft delete, hit point commands and derived-stat projections, composed
//! over the storage, access-control and clock ports.
//!
//! Every mutation is a single conditional write of the full record. On a
//! revision conflict the command is re-run from a fresh read, up to the
//! configured retry budget.

mod error;

pub use error::CharacterError;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sheetkeeper_domain::calculations::{
    calculate_character_stats, calculate_spellcasting, carrying_capacity, equipment_weight,
    vitality,
};
use sheetkeeper_domain::{
    validate_create, validate_update, CarryingCapacity, CharacterId, CharacterInput,
    CharacterKind, CharacterRecord, CharacterStats, CharacterSummary, ClassCatalog,
    DamageOutcome, Dnd5eSystem, EquipmentWeight, ExperienceInfo, HealOutcome, HitPoints,
    LifecycleStatus, PartyId, Permissions, RestoreToken, SpellcastingStats, TemporaryHpOutcome,
    UserId, Vitality, XpTable,
};

use crate::infrastructure::app_settings::EngineSettings;
use crate::infrastructure::importers::ImportRegistry;
use crate::infrastructure::ports::{AccessControl, CharacterFilter, CharacterRepo, ClockPort};

// =============================================================================
// Result Types
// =============================================================================

/// Result of a hit point command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitPointsResult<O> {
    pub hit_points: HitPoints,
    pub outcome: O,
    pub status: Vitality,
}

/// Caller-facing search criteria. Visibility is always applied on top.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterSearch {
    pub name_contains: Option<String>,
    pub kind: Option<CharacterKind>,
    pub class_name: Option<String>,
    pub party_id: Option<PartyId>,
    pub limit: Option<usize>,
    pub offset: usize,
}

/// How much of the lifecycle a lookup may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookup {
    /// Active records only; pending deletion reads as not found.
    Active,
    /// Active or pending deletion within its window.
    Restorable,
}

// =============================================================================
// Use Cases
// =============================================================================

/// Container for character use cases.
pub struct CharacterUseCases {
    repo: Arc<dyn CharacterRepo>,
    access: Arc<dyn AccessControl>,
    clock: Arc<dyn ClockPort>,
    catalog: Arc<dyn ClassCatalog>,
    xp_table: XpTable,
    importers: ImportRegistry,
    settings: EngineSettings,
}

impl CharacterUseCases {
    pub fn new(
        repo: Arc<dyn CharacterRepo>,
        access: Arc<dyn AccessControl>,
        clock: Arc<dyn ClockPort>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            repo,
            access,
            clock,
            catalog: Arc::new(Dnd5eSystem::new()),
            xp_table: XpTable::standard(),
            importers: ImportRegistry::default(),
            settings,
        }
    }

    /// Swap the class catalog used for spellcasting.
    pub fn with_catalog(mut self, catalog: Arc<dyn ClassCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_xp_table(mut self, xp_table: XpTable) -> Self {
        self.xp_table = xp_table;
        self
    }

    pub fn with_importers(mut self, importers: ImportRegistry) -> Self {
        self.importers = importers;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Create a character owned by `owner`.
    pub async fn create(
        &self,
        owner: UserId,
        input: &CharacterInput,
    ) -> Result<CharacterRecord, CharacterError> {
        let new = validate_create(input)?;

        let owned = self.repo.count_by_owner(owner).await?;
        if owned >= self.settings.max_characters_per_owner {
            tracing::warn!(
                owner_id = %owner,
                owned,
                limit = self.settings.max_characters_per_owner,
                "Character limit reached"
            );
            return Err(CharacterError::CharacterLimitExceeded {
                limit: self.settings.max_characters_per_owner,
            });
        }

        let record = CharacterRecord::new(owner, new, self.clock.now());
        let stored = self.repo.create(&record).await?;

        // A concurrent create may have passed the same check. Re-count and
        // back this one out if the owner is now over the limit.
        let owned = self.repo.count_by_owner(owner).await?;
        if owned > self.settings.max_characters_per_owner {
            tracing::warn!(
                character_id = %stored.id(),
                owner_id = %owner,
                owned,
                limit = self.settings.max_characters_per_owner,
                "Character limit overrun by a concurrent create, rolling back"
            );
            self.repo.delete_by_id(stored.id()).await?;
            return Err(CharacterError::CharacterLimitExceeded {
                limit: self.settings.max_characters_per_owner,
            });
        }

        tracing::info!(
            character_id = %stored.id(),
            owner_id = %owner,
            name = %stored.name(),
            total_level = stored.total_level(),
            "Character created"
        );
        Ok(stored)
    }

    pub async fn get(
        &self,
        requester: UserId,
        id: CharacterId,
    ) -> Result<CharacterRecord, CharacterError> {
        self.load_viewable(requester, id).await
    }

    /// Validate and merge a partial update.
    pub async fn update(
        &self,
        requester: UserId,
        id: CharacterId,
        input: &CharacterInput,
    ) -> Result<CharacterRecord, CharacterError> {
        let changes = validate_update(input)?;

        let (record, ()) = self
            .mutate(requester, id, Lookup::Active, "update", |record, perms, now| {
                if !perms.can_edit {
                    return Err(CharacterError::UnauthorizedAccess);
                }
                record.apply_changes(&changes, now)?;
                Ok(())
            })
            .await?;

        tracing::debug!(
            character_id = %id,
            revision = record.revision(),
            "Character updated"
        );
        Ok(record)
    }

    /// Soft delete. Returns the token that can undo it within the restore window.
    pub async fn delete(
        &self,
        requester: UserId,
        id: CharacterId,
    ) -> Result<RestoreToken, CharacterError> {
        let window = self.settings.restore_window();
        let (record, token) = self
            .mutate(requester, id, Lookup::Active, "delete", |record, perms, now| {
                if !perms.can_delete {
                    return Err(CharacterError::UnauthorizedAccess);
                }
                let token = RestoreToken::new();
                let status = LifecycleStatus::pending_deletion(now, window, token).map_err(|e| {
                    CharacterError::DatabaseError {
                        operation: "delete",
                        message: e.detail().to_string(),
                    }
                })?;
                record.set_status(status, now);
                Ok(token)
            })
            .await?;

        tracing::info!(
            character_id = %id,
            expires_at = ?pending_expiry(&record),
            "Character deleted, restorable until expiry"
        );
        Ok(token)
    }

    /// Undo a soft delete. The token is consumed on success.
    pub async fn restore(
        &self,
        requester: UserId,
        id: CharacterId,
        token: RestoreToken,
    ) -> Result<CharacterRecord, CharacterError> {
        let (record, ()) = self
            .mutate(requester, id, Lookup::Restorable, "restore", |record, perms, now| {
                if !perms.can_delete {
                    return Err(CharacterError::UnauthorizedAccess);
                }
                if !record.status().can_restore(token, now) {
                    return Err(CharacterError::InvalidRestoreToken);
                }
                record.set_status(LifecycleStatus::Active, now);
                Ok(())
            })
            .await?;

        tracing::info!(character_id = %id, "Character restored");
        Ok(record)
    }

    /// Hard delete through storage. Works on active and pending-deletion records.
    pub async fn purge(&self, requester: UserId, id: CharacterId) -> Result<(), CharacterError> {
        let record = self.load(id, Lookup::Restorable).await?;
        let perms = self.permissions_for(&record, requester).await;
        if !perms.can_delete {
            return Err(CharacterError::UnauthorizedAccess);
        }

        self.repo.delete_by_id(id).await?;
        tracing::info!(character_id = %id, "Character purged");
        Ok(())
    }

    /// Parse a template through the import registry, then create it.
    pub async fn import(
        &self,
        owner: UserId,
        format: &str,
        payload: &str,
    ) -> Result<CharacterRecord, CharacterError> {
        let input = self.importers.parse(format, payload)?;
        let record = self.create(owner, &input).await?;

        tracing::info!(
            character_id = %record.id(),
            format,
            "Character imported"
        );
        Ok(record)
    }

    // =========================================================================
    // Hit points
    // =========================================================================

    pub async fn take_damage(
        &self,
        requester: UserId,
        id: CharacterId,
        amount: i64,
    ) -> Result<HitPointsResult<DamageOutcome>, CharacterError> {
        let (record, outcome) = self
            .mutate(requester, id, Lookup::Active, "take_damage", |record, perms, now| {
                require_edit(perms)?;
                Ok(record.take_damage(amount, now))
            })
            .await?;

        tracing::debug!(character_id = %id, amount, ?outcome, "Damage applied");
        Ok(hit_points_result(&record, outcome))
    }

    pub async fn heal(
        &self,
        requester: UserId,
        id: CharacterId,
        amount: i64,
    ) -> Result<HitPointsResult<HealOutcome>, CharacterError> {
        let (record, outcome) = self
            .mutate(requester, id, Lookup::Active, "heal", |record, perms, now| {
                require_edit(perms)?;
                Ok(record.heal(amount, now))
            })
            .await?;

        tracing::debug!(character_id = %id, amount, ?outcome, "Healing applied");
        Ok(hit_points_result(&record, outcome))
    }

    pub async fn add_temporary_hp(
        &self,
        requester: UserId,
        id: CharacterId,
        amount: i64,
    ) -> Result<HitPointsResult<TemporaryHpOutcome>, CharacterError> {
        let (record, outcome) = self
            .mutate(
                requester,
                id,
                Lookup::Active,
                "add_temporary_hp",
                |record, perms, now| {
                    require_edit(perms)?;
                    Ok(record.add_temporary_hp(amount, now))
                },
            )
            .await?;

        tracing::debug!(character_id = %id, amount, ?outcome, "Temporary hit points applied");
        Ok(hit_points_result(&record, outcome))
    }

    // =========================================================================
    // Sharing
    // =========================================================================

    pub async fn set_visibility(
        &self,
        requester: UserId,
        id: CharacterId,
        is_public: bool,
    ) -> Result<CharacterRecord, CharacterError> {
        let (record, ()) = self
            .mutate(requester, id, Lookup::Active, "set_visibility", |record, perms, now| {
                if !perms.can_share {
                    return Err(CharacterError::UnauthorizedAccess);
                }
                record.set_visibility(is_public, now);
                Ok(())
            })
            .await?;

        tracing::debug!(character_id = %id, is_public, "Visibility changed");
        Ok(record)
    }

    /// Attach the character to a party, or detach it with `None`.
    pub async fn assign_party(
        &self,
        requester: UserId,
        id: CharacterId,
        party_id: Option<PartyId>,
    ) -> Result<CharacterRecord, CharacterError> {
        let (record, ()) = self
            .mutate(requester, id, Lookup::Active, "assign_party", |record, perms, now| {
                require_edit(perms)?;
                record.assign_party(party_id, now);
                Ok(())
            })
            .await?;

        tracing::debug!(character_id = %id, party_id = ?party_id, "Party assignment changed");
        Ok(record)
    }

    pub async fn permissions(
        &self,
        requester: UserId,
        id: CharacterId,
    ) -> Result<Permissions, CharacterError> {
        let record = self.load(id, Lookup::Active).await?;
        Ok(self.permissions_for(&record, requester).await)
    }

    // =========================================================================
    // Projections
    // =========================================================================

    pub async fn stats(
        &self,
        requester: UserId,
        id: CharacterId,
    ) -> Result<CharacterStats, CharacterError> {
        let record = self.load_viewable(requester, id).await?;
        Ok(calculate_character_stats(&record))
    }

    pub async fn spellcasting(
        &self,
        requester: UserId,
        id: CharacterId,
    ) -> Result<SpellcastingStats, CharacterError> {
        let record = self.load_viewable(requester, id).await?;
        Ok(calculate_spellcasting(&record, self.catalog.as_ref()))
    }

    pub async fn carrying_capacity(
        &self,
        requester: UserId,
        id: CharacterId,
    ) -> Result<CarryingCapacity, CharacterError> {
        let record = self.load_viewable(requester, id).await?;
        Ok(carrying_capacity(&record, &self.settings.encumbrance))
    }

    pub async fn equipment_weight(
        &self,
        requester: UserId,
        id: CharacterId,
    ) -> Result<EquipmentWeight, CharacterError> {
        let record = self.load_viewable(requester, id).await?;
        Ok(equipment_weight(record.equipment()))
    }

    pub async fn experience(
        &self,
        requester: UserId,
        id: CharacterId,
    ) -> Result<ExperienceInfo, CharacterError> {
        let record = self.load_viewable(requester, id).await?;
        Ok(self.xp_table.experience_info(record.experience_points()))
    }

    pub async fn summary(
        &self,
        requester: UserId,
        id: CharacterId,
    ) -> Result<CharacterSummary, CharacterError> {
        let record = self.load_viewable(requester, id).await?;
        Ok(CharacterSummary::from(&record))
    }

    // =========================================================================
    // Listing
    // =========================================================================

    /// Summaries of the owner's active characters.
    pub async fn list_owned(&self, owner: UserId) -> Result<Vec<CharacterSummary>, CharacterError> {
        let records = self
            .repo
            .find_by_filter(&CharacterFilter::owned_by(owner))
            .await?;
        Ok(records.iter().map(CharacterSummary::from).collect())
    }

    /// Every active character the requester may view, narrowed by `query`.
    ///
    /// Storage applies the query criteria; viewing rights come from the
    /// access-control port per record, so paging happens after that check.
    pub async fn search(
        &self,
        requester: UserId,
        query: &CharacterSearch,
    ) -> Result<Vec<CharacterSummary>, CharacterError> {
        let filter = CharacterFilter {
            owner_id: None,
            name_contains: query.name_contains.clone(),
            kind: query.kind,
            class_name: query.class_name.clone(),
            party_id: query.party_id,
            include_pending_deletion: false,
            limit: None,
            offset: 0,
        };
        let candidates = self.repo.find_by_filter(&filter).await?;

        let mut visible = Vec::new();
        for record in &candidates {
            if self.permissions_for(record, requester).await.can_view {
                visible.push(CharacterSummary::from(record));
            }
        }

        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(visible.into_iter().skip(query.offset).take(limit).collect())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn permissions_for(&self, record: &CharacterRecord, requester: UserId) -> Permissions {
        let is_owner = self.access.is_owner(record, requester).await;
        Permissions::resolve(is_owner, record.is_public())
    }

    /// Read a record, applying lifecycle visibility.
    ///
    /// Pending-deletion records past their window are removed from storage
    /// on sight and reported as not found.
    async fn load(&self, id: CharacterId, lookup: Lookup) -> Result<CharacterRecord, CharacterError> {
        let record = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| CharacterError::not_found(id))?;

        let now = self.clock.now();
        if record.status().is_expired(now) {
            self.discard_expired(id).await;
            return Err(CharacterError::not_found(id));
        }
        if lookup == Lookup::Active && !record.is_active() {
            return Err(CharacterError::not_found(id));
        }
        Ok(record)
    }

    async fn load_viewable(
        &self,
        requester: UserId,
        id: CharacterId,
    ) -> Result<CharacterRecord, CharacterError> {
        let record = self.load(id, Lookup::Active).await?;
        if !self.permissions_for(&record, requester).await.can_view {
            return Err(CharacterError::UnauthorizedAccess);
        }
        Ok(record)
    }

    async fn discard_expired(&self, id: CharacterId) {
        match self.repo.delete_by_id(id).await {
            Ok(()) => tracing::debug!(character_id = %id, "Expired character removed"),
            Err(e) if e.is_not_found() => {}
            Err(e) => tracing::warn!(character_id = %id, error = %e, "Failed to remove expired character"),
        }
    }

    /// Read, apply `change`, conditionally write; retry on revision conflict.
    ///
    /// `change` may run more than once, each time against a fresh read. If it
    /// leaves the record untouched nothing is written.
    async fn mutate<T, F>(
        &self,
        requester: UserId,
        id: CharacterId,
        lookup: Lookup,
        operation: &'static str,
        mut change: F,
    ) -> Result<(CharacterRecord, T), CharacterError>
    where
        F: FnMut(&mut CharacterRecord, Permissions, DateTime<Utc>) -> Result<T, CharacterError>
            + Send,
        T: Send,
    {
        let max_retries = self.settings.max_write_retries;
        let mut attempt: u32 = 0;
        loop {
            let original = self.load(id, lookup).await?;
            let perms = self.permissions_for(&original, requester).await;

            let mut record = original.clone();
            let value = change(&mut record, perms, self.clock.now())?;
            if record == original {
                return Ok((record, value));
            }

            match self.repo.update_by_id(&record, original.revision()).await {
                Ok(stored) => return Ok((stored, value)),
                Err(e) if e.is_conflict() && attempt < max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        character_id = %id,
                        operation,
                        attempt,
                        max_retries,
                        "Revision conflict, retrying from a fresh read"
                    );
                }
                Err(e) if e.is_conflict() => {
                    tracing::warn!(
                        character_id = %id,
                        operation,
                        attempts = attempt + 1,
                        "Revision conflict persisted, giving up"
                    );
                    return Err(CharacterError::DatabaseError {
                        operation: "update",
                        message: format!(
                            "{} on {} still conflicting after {} retries",
                            operation, id, max_retries
                        ),
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

fn require_edit(perms: Permissions) -> Result<(), CharacterError> {
    if perms.can_edit {
        Ok(())
    } else {
        Err(CharacterError::UnauthorizedAccess)
    }
}

fn hit_points_result<O>(record: &CharacterRecord, outcome: O) -> HitPointsResult<O> {
    let hit_points = record.hit_points();
    HitPointsResult {
        hit_points,
        outcome,
        status: vitality(&hit_points),
    }
}

fn pending_expiry(record: &CharacterRecord) -> Option<DateTime<Utc>> {
    match record.status() {
        LifecycleStatus::PendingDeletion { expires_at, .. } => Some(*expires_at),
        LifecycleStatus::Active => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use chrono::{Duration, TimeZone};
    use sheetkeeper_domain::validation::{AbilityScoresInput, ClassInput, HitPointsInput};
    use sheetkeeper_domain::Ability;

    use super::*;
    use crate::infrastructure::access::OwnerAccessControl;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::persistence::InMemoryCharacterRepo;
    use crate::infrastructure::ports::{MockCharacterRepo, RepoError};

    fn fixed_now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn wizard_input(name: &str) -> CharacterInput {
        CharacterInput {
            name: Some(name.into()),
            kind: Some("pc".into()),
            race: Some("Elf".into()),
            classes: Some(vec![ClassInput::new("Wizard", 5, "d6")]),
            ability_scores: Some(AbilityScoresInput::all([8, 14, 12, 16, 13, 10])),
            hit_points: Some(HitPointsInput {
                maximum: Some(27),
                current: None,
                temporary: None,
            }),
            armor_class: Some(12),
            ..Default::default()
        }
    }

    fn use_cases_at(
        repo: Arc<InMemoryCharacterRepo>,
        now: DateTime<Utc>,
        settings: EngineSettings,
    ) -> CharacterUseCases {
        CharacterUseCases::new(
            repo,
            Arc::new(OwnerAccessControl),
            Arc::new(FixedClock(now)),
            settings,
        )
    }

    fn in_memory() -> (Arc<InMemoryCharacterRepo>, CharacterUseCases) {
        let repo = Arc::new(InMemoryCharacterRepo::new());
        let use_cases = use_cases_at(repo.clone(), fixed_now(), EngineSettings::default());
        (repo, use_cases)
    }

    fn with_mock_repo(repo: MockCharacterRepo, settings: EngineSettings) -> CharacterUseCases {
        CharacterUseCases::new(
            Arc::new(repo),
            Arc::new(OwnerAccessControl),
            Arc::new(FixedClock(fixed_now())),
            settings,
        )
    }

    fn stored_wizard(owner: UserId) -> CharacterRecord {
        let new = validate_create(&wizard_input("Elowen")).unwrap();
        CharacterRecord::new(owner, new, fixed_now())
    }

    mod lifecycle {
        use super::*;

        #[tokio::test]
        async fn create_then_get_returns_the_stored_record() {
            let (_, use_cases) = in_memory();
            let owner = UserId::new();

            let created = use_cases.create(owner, &wizard_input("Elowen")).await.unwrap();
            let fetched = use_cases.get(owner, created.id()).await.unwrap();

            assert_eq!(fetched, created);
            assert_eq!(fetched.revision(), 0);
            assert_eq!(fetched.owner_id(), owner);
        }

        #[tokio::test]
        async fn create_reports_every_field_violation() {
            let (repo, use_cases) = in_memory();
            let input = CharacterInput {
                name: None,
                armor_class: Some(99),
                ..wizard_input("ignored")
            };

            let err = use_cases.create(UserId::new(), &input).await.unwrap_err();

            assert_eq!(err.code(), "INVALID_CHARACTER_DATA");
            let fields: Vec<&str> = err.violations().iter().map(|v| v.field.as_str()).collect();
            assert!(fields.contains(&"name"));
            assert!(fields.contains(&"armorClass"));
            assert!(repo.is_empty());
        }

        #[tokio::test]
        async fn create_rejects_levels_above_twenty() {
            let (_, use_cases) = in_memory();
            let input = CharacterInput {
                classes: Some(vec![
                    ClassInput::new("Wizard", 15, "d6"),
                    ClassInput::new("Fighter", 6, "d10"),
                ]),
                ..wizard_input("Overachiever")
            };

            let err = use_cases.create(UserId::new(), &input).await.unwrap_err();
            assert_eq!(err, CharacterError::InvalidCharacterLevel { total: 21 });
        }

        #[tokio::test]
        async fn create_enforces_the_per_owner_limit() {
            let repo = Arc::new(InMemoryCharacterRepo::new());
            let settings = EngineSettings {
                max_characters_per_owner: 1,
                ..Default::default()
            };
            let use_cases = use_cases_at(repo, fixed_now(), settings);
            let owner = UserId::new();

            use_cases.create(owner, &wizard_input("First")).await.unwrap();
            let err = use_cases.create(owner, &wizard_input("Second")).await.unwrap_err();
            assert_eq!(err, CharacterError::CharacterLimitExceeded { limit: 1 });

            // The limit is per owner.
            assert!(use_cases.create(UserId::new(), &wizard_input("Other")).await.is_ok());
        }

        #[tokio::test]
        async fn deleted_characters_free_their_slot() {
            let repo = Arc::new(InMemoryCharacterRepo::new());
            let settings = EngineSettings {
                max_characters_per_owner: 1,
                ..Default::default()
            };
            let use_cases = use_cases_at(repo, fixed_now(), settings);
            let owner = UserId::new();

            let first = use_cases.create(owner, &wizard_input("First")).await.unwrap();
            use_cases.delete(owner, first.id()).await.unwrap();

            assert!(use_cases.create(owner, &wizard_input("Second")).await.is_ok());
        }

        #[tokio::test]
        async fn deleted_character_can_be_restored_inside_the_window() {
            let (repo, use_cases) = in_memory();
            let owner = UserId::new();
            let created = use_cases.create(owner, &wizard_input("Elowen")).await.unwrap();

            let token = use_cases.delete(owner, created.id()).await.unwrap();
            let err = use_cases.get(owner, created.id()).await.unwrap_err();
            assert_eq!(err.code(), "CHARACTER_NOT_FOUND");

            let later = use_cases_at(repo, fixed_now() + Duration::hours(23), EngineSettings::default());
            let restored = later.restore(owner, created.id(), token).await.unwrap();

            assert!(restored.is_active());
            assert_eq!(later.get(owner, created.id()).await.unwrap(), restored);
        }

        #[tokio::test]
        async fn restore_after_the_window_is_not_found_and_removes_the_record() {
            let (repo, use_cases) = in_memory();
            let owner = UserId::new();
            let created = use_cases.create(owner, &wizard_input("Elowen")).await.unwrap();
            let token = use_cases.delete(owner, created.id()).await.unwrap();

            let later = use_cases_at(
                repo.clone(),
                fixed_now() + Duration::hours(25),
                EngineSettings::default(),
            );
            let err = later.restore(owner, created.id(), token).await.unwrap_err();

            assert_eq!(err.code(), "CHARACTER_NOT_FOUND");
            assert!(repo.is_empty());
        }

        #[tokio::test]
        async fn restore_token_is_single_use() {
            let (_, use_cases) = in_memory();
            let owner = UserId::new();
            let created = use_cases.create(owner, &wizard_input("Elowen")).await.unwrap();
            let token = use_cases.delete(owner, created.id()).await.unwrap();

            use_cases.restore(owner, created.id(), token).await.unwrap();
            let err = use_cases.restore(owner, created.id(), token).await.unwrap_err();

            assert_eq!(err, CharacterError::InvalidRestoreToken);
        }

        #[tokio::test]
        async fn restore_rejects_wrong_token_and_strangers() {
            let (_, use_cases) = in_memory();
            let owner = UserId::new();
            let created = use_cases.create(owner, &wizard_input("Elowen")).await.unwrap();
            let token = use_cases.delete(owner, created.id()).await.unwrap();

            let err = use_cases
                .restore(owner, created.id(), RestoreToken::new())
                .await
                .unwrap_err();
            assert_eq!(err, CharacterError::InvalidRestoreToken);

            let err = use_cases
                .restore(UserId::new(), created.id(), token)
                .await
                .unwrap_err();
            assert_eq!(err, CharacterError::UnauthorizedAccess);
        }

        #[tokio::test]
        async fn purge_removes_pending_records() {
            let (repo, use_cases) = in_memory();
            let owner = UserId::new();
            let created = use_cases.create(owner, &wizard_input("Elowen")).await.unwrap();
            use_cases.delete(owner, created.id()).await.unwrap();

            use_cases.purge(owner, created.id()).await.unwrap();

            assert!(repo.is_empty());
        }

        #[tokio::test]
        async fn import_creates_from_native_json() {
            let (_, use_cases) = in_memory();
            let owner = UserId::new();
            let payload = serde_json::to_string(&serde_json::json!({
                "format": "sheetkeeper",
                "version": 1,
                "character": wizard_input("Imported"),
            }))
            .unwrap();

            let record = use_cases.import(owner, "native-json", &payload).await.unwrap();

            assert_eq!(record.name().as_str(), "Imported");
            assert_eq!(record.owner_id(), owner);
        }

        #[tokio::test]
        async fn import_rejects_unknown_formats() {
            let (_, use_cases) = in_memory();
            let err = use_cases
                .import(UserId::new(), "dndbeyond", "{}")
                .await
                .unwrap_err();
            assert_eq!(err.code(), "UNKNOWN_IMPORT_FORMAT");
        }
    }

    mod editing {
        use super::*;

        #[tokio::test]
        async fn update_merges_fields_and_bumps_revision() {
            let (_, use_cases) = in_memory();
            let owner = UserId::new();
            let created = use_cases.create(owner, &wizard_input("Elowen")).await.unwrap();

            let changes = CharacterInput {
                name: Some("Elowen the Grey".into()),
                classes: Some(vec![ClassInput::new("Wizard", 9, "d6")]),
                ..Default::default()
            };
            let updated = use_cases.update(owner, created.id(), &changes).await.unwrap();

            assert_eq!(updated.name().as_str(), "Elowen the Grey");
            assert_eq!(updated.race(), "Elf");
            assert_eq!(updated.revision(), 1);
            assert_eq!(updated.stored_proficiency_bonus(), 4);
        }

        #[tokio::test]
        async fn update_checks_hit_points_against_the_merged_maximum() {
            let (_, use_cases) = in_memory();
            let owner = UserId::new();
            let created = use_cases.create(owner, &wizard_input("Elowen")).await.unwrap();

            let changes = CharacterInput {
                hit_points: Some(HitPointsInput {
                    maximum: None,
                    current: Some(30),
                    temporary: None,
                }),
                ..Default::default()
            };
            let err = use_cases.update(owner, created.id(), &changes).await.unwrap_err();

            assert_eq!(err.violations()[0].field, "hitPoints.current");
            let unchanged = use_cases.get(owner, created.id()).await.unwrap();
            assert_eq!(unchanged.revision(), 0);
        }

        #[tokio::test]
        async fn strangers_cannot_edit_even_public_characters() {
            let (_, use_cases) = in_memory();
            let owner = UserId::new();
            let stranger = UserId::new();
            let created = use_cases.create(owner, &wizard_input("Elowen")).await.unwrap();

            let err = use_cases.get(stranger, created.id()).await.unwrap_err();
            assert_eq!(err, CharacterError::UnauthorizedAccess);

            use_cases.set_visibility(owner, created.id(), true).await.unwrap();
            assert!(use_cases.get(stranger, created.id()).await.is_ok());

            let changes = CharacterInput {
                notes: Some("mine now".into()),
                ..Default::default()
            };
            let err = use_cases.update(stranger, created.id(), &changes).await.unwrap_err();
            assert_eq!(err, CharacterError::UnauthorizedAccess);
            let err = use_cases.delete(stranger, created.id()).await.unwrap_err();
            assert_eq!(err, CharacterError::UnauthorizedAccess);
        }

        #[tokio::test]
        async fn permissions_reflect_ownership_and_visibility() {
            let (_, use_cases) = in_memory();
            let owner = UserId::new();
            let created = use_cases.create(owner, &wizard_input("Elowen")).await.unwrap();
            use_cases.set_visibility(owner, created.id(), true).await.unwrap();

            let mine = use_cases.permissions(owner, created.id()).await.unwrap();
            assert!(mine.can_edit && mine.can_delete && mine.can_share);

            let theirs = use_cases.permissions(UserId::new(), created.id()).await.unwrap();
            assert!(theirs.can_view);
            assert!(!theirs.can_edit);
        }

        #[tokio::test]
        async fn assign_party_sets_and_clears() {
            let (_, use_cases) = in_memory();
            let owner = UserId::new();
            let created = use_cases.create(owner, &wizard_input("Elowen")).await.unwrap();
            let party = PartyId::new();

            let joined = use_cases.assign_party(owner, created.id(), Some(party)).await.unwrap();
            assert_eq!(joined.party_id(), Some(party));

            let left = use_cases.assign_party(owner, created.id(), None).await.unwrap();
            assert_eq!(left.party_id(), None);
        }
    }

    mod hit_points {
        use super::*;

        #[tokio::test]
        async fn damage_heal_and_temporary_hit_points() {
            let (_, use_cases) = in_memory();
            let owner = UserId::new();
            let id = use_cases.create(owner, &wizard_input("Elowen")).await.unwrap().id();

            let temp = use_cases.add_temporary_hp(owner, id, 5).await.unwrap();
            assert_eq!(
                temp.outcome,
                TemporaryHpOutcome::Granted {
                    previous: 0,
                    temporary: 5
                }
            );

            let hit = use_cases.take_damage(owner, id, 8).await.unwrap();
            assert_eq!(
                hit.outcome,
                DamageOutcome::Wounded {
                    absorbed: 5,
                    damage_dealt: 3,
                    remaining_hp: 24
                }
            );
            assert_eq!(hit.hit_points.temporary(), 0);

            let healed = use_cases.heal(owner, id, 100).await.unwrap();
            assert_eq!(
                healed.outcome,
                HealOutcome::Healed {
                    amount_healed: 3,
                    new_hp: 27
                }
            );

            let down = use_cases.take_damage(owner, id, 100).await.unwrap();
            assert_eq!(
                down.outcome,
                DamageOutcome::KnockedOut {
                    absorbed: 0,
                    damage_dealt: 27
                }
            );
            assert_eq!(down.status, Vitality::Unconscious);
        }

        #[tokio::test]
        async fn no_op_commands_do_not_write() {
            let (_, use_cases) = in_memory();
            let owner = UserId::new();
            let id = use_cases.create(owner, &wizard_input("Elowen")).await.unwrap().id();

            let healed = use_cases.heal(owner, id, 10).await.unwrap();
            assert_eq!(healed.outcome, HealOutcome::AlreadyFull);
            let hit = use_cases.take_damage(owner, id, -4).await.unwrap();
            assert_eq!(hit.outcome, DamageOutcome::NoEffect);

            assert_eq!(use_cases.get(owner, id).await.unwrap().revision(), 0);
        }

        #[tokio::test]
        async fn zero_damage_never_reaches_storage() {
            let owner = UserId::new();
            let record = stored_wizard(owner);
            let id = record.id();

            let mut repo = MockCharacterRepo::new();
            repo.expect_find_by_id()
                .withf(move |requested| *requested == id)
                .returning(move |_| Ok(Some(record.clone())));
            repo.expect_update_by_id().never();

            let use_cases = with_mock_repo(repo, EngineSettings::default());
            let result = use_cases.take_damage(owner, id, 0).await.unwrap();

            assert_eq!(result.outcome, DamageOutcome::NoEffect);
            assert_eq!(result.hit_points.current(), 27);
        }
    }

    mod concurrency {
        use super::*;

        #[tokio::test]
        async fn conflict_is_retried_from_a_fresh_read() {
            let owner = UserId::new();
            let record = stored_wizard(owner);
            let id = record.id();
            let writes = Arc::new(AtomicU32::new(0));

            let mut repo = MockCharacterRepo::new();
            repo.expect_find_by_id()
                .times(2)
                .returning(move |_| Ok(Some(record.clone())));
            let counter = writes.clone();
            repo.expect_update_by_id()
                .times(2)
                .returning(move |candidate, expected| {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(RepoError::conflict(candidate.id(), expected, expected + 1))
                    } else {
                        let mut stored = candidate.clone();
                        stored.set_revision(expected + 1);
                        Ok(stored)
                    }
                });

            let use_cases = with_mock_repo(repo, EngineSettings::default());
            let result = use_cases.take_damage(owner, id, 7).await.unwrap();

            assert_eq!(result.hit_points.current(), 20);
            assert_eq!(writes.load(Ordering::SeqCst), 2);
        }

        #[tokio::test]
        async fn persistent_conflict_exhausts_the_retry_budget() {
            let owner = UserId::new();
            let record = stored_wizard(owner);
            let id = record.id();

            let mut repo = MockCharacterRepo::new();
            repo.expect_find_by_id()
                .times(3)
                .returning(move |_| Ok(Some(record.clone())));
            repo.expect_update_by_id()
                .times(3)
                .returning(|candidate, expected| {
                    Err(RepoError::conflict(candidate.id(), expected, expected + 1))
                });

            let settings = EngineSettings {
                max_write_retries: 2,
                ..Default::default()
            };
            let use_cases = with_mock_repo(repo, settings);
            let err = use_cases.take_damage(owner, id, 1).await.unwrap_err();
            assert!(matches!(
                err,
                CharacterError::DatabaseError {
                    operation: "update",
                    ..
                }
            ));
        }

        #[tokio::test]
        async fn storage_failures_surface_as_database_errors() {
            let mut repo = MockCharacterRepo::new();
            repo.expect_find_by_id()
                .returning(|_| Err(RepoError::database("find_by_id", "connection reset")));

            let use_cases = with_mock_repo(repo, EngineSettings::default());
            let err = use_cases
                .get(UserId::new(), CharacterId::new())
                .await
                .unwrap_err();

            assert_eq!(
                err,
                CharacterError::DatabaseError {
                    operation: "find_by_id",
                    message: "connection reset".into(),
                }
            );
        }
    }

    mod projections {
        use super::*;

        #[tokio::test]
        async fn wizard_projections() {
            let (_, use_cases) = in_memory();
            let owner = UserId::new();
            let id = use_cases.create(owner, &wizard_input("Elowen")).await.unwrap().id();

            let stats = use_cases.stats(owner, id).await.unwrap();
            assert_eq!(stats.total_level, 5);
            assert_eq!(stats.proficiency_bonus, 3);
            assert_eq!(stats.ability_modifiers[&Ability::Intelligence], 3);

            let spells = use_cases.spellcasting(owner, id).await.unwrap();
            assert_eq!(spells.caster_level, 5);
            assert_eq!(spells.spellcasting_ability, Some(Ability::Intelligence));
            assert_eq!(spells.spell_save_dc, Some(14));
            assert_eq!(spells.spell_attack_bonus, Some(6));
            assert_eq!(spells.spell_slots.get(&3), Some(&2));

            let xp = use_cases.experience(owner, id).await.unwrap();
            assert_eq!(xp.current_level, 1);
            assert_eq!(xp.xp_to_next_level, 300);

            let weight = use_cases.equipment_weight(owner, id).await.unwrap();
            assert_eq!(weight.total, 0.0);

            let capacity = use_cases.carrying_capacity(owner, id).await.unwrap();
            assert_eq!(capacity.maximum, 120.0);

            let summary = use_cases.summary(owner, id).await.unwrap();
            assert_eq!(summary.classes, vec!["Wizard 5".to_string()]);
        }

        #[tokio::test]
        async fn projections_respect_view_permission() {
            let (_, use_cases) = in_memory();
            let owner = UserId::new();
            let id = use_cases.create(owner, &wizard_input("Elowen")).await.unwrap().id();

            let err = use_cases.stats(UserId::new(), id).await.unwrap_err();
            assert_eq!(err, CharacterError::UnauthorizedAccess);
        }

        #[tokio::test]
        async fn search_shows_public_and_own_characters() {
            let (_, use_cases) = in_memory();
            let alice = UserId::new();
            let bob = UserId::new();

            use_cases.create(alice, &wizard_input("Aria")).await.unwrap();
            let public = use_cases.create(alice, &wizard_input("Brin")).await.unwrap();
            use_cases.set_visibility(alice, public.id(), true).await.unwrap();
            use_cases.create(bob, &wizard_input("Cass")).await.unwrap();

            let visible = use_cases.search(bob, &CharacterSearch::default()).await.unwrap();
            let names: Vec<&str> = visible.iter().map(|s| s.name.as_str()).collect();
            assert_eq!(names, vec!["Brin", "Cass"]);

            let query = CharacterSearch {
                name_contains: Some("ar".into()),
                ..Default::default()
            };
            let own = use_cases.search(alice, &query).await.unwrap();
            assert_eq!(own.len(), 1);
            assert_eq!(own[0].name, "Aria");

            assert_eq!(use_cases.list_owned(alice).await.unwrap().len(), 2);
        }
    }

    mod guards {
        use super::*;
        use crate::infrastructure::ports::MockAccessControl;

        fn with_access(
            repo: Arc<InMemoryCharacterRepo>,
            access: MockAccessControl,
        ) -> CharacterUseCases {
            CharacterUseCases::new(
                repo,
                Arc::new(access),
                Arc::new(FixedClock(fixed_now())),
                EngineSettings::default(),
            )
        }

        fn ownership(answer: bool) -> MockAccessControl {
            let mut access = MockAccessControl::new();
            access.expect_is_owner().returning(move |_, _| answer);
            access
        }

        #[tokio::test]
        async fn oversized_restore_window_is_clamped_not_fatal() {
            let repo = Arc::new(InMemoryCharacterRepo::new());
            let settings = EngineSettings {
                restore_window_secs: i64::MAX,
                ..Default::default()
            };
            let use_cases = use_cases_at(repo.clone(), fixed_now(), settings.clone());
            let owner = UserId::new();
            let created = use_cases.create(owner, &wizard_input("Elowen")).await.unwrap();

            let token = use_cases.delete(owner, created.id()).await.unwrap();

            let later = use_cases_at(repo, fixed_now() + Duration::days(300), settings);
            assert!(later.restore(owner, created.id(), token).await.is_ok());
        }

        #[tokio::test]
        async fn search_asks_the_access_port_about_ownership() {
            let repo = Arc::new(InMemoryCharacterRepo::new());
            let owner = UserId::new();
            let seed = use_cases_at(repo.clone(), fixed_now(), EngineSettings::default());
            seed.create(owner, &wizard_input("Hidden")).await.unwrap();
            let shown = seed.create(owner, &wizard_input("Shown")).await.unwrap();
            seed.set_visibility(owner, shown.id(), true).await.unwrap();

            // The port disowns the recorded owner: only public records remain.
            let disowned = with_access(repo.clone(), ownership(false));
            let names: Vec<String> = disowned
                .search(owner, &CharacterSearch::default())
                .await
                .unwrap()
                .into_iter()
                .map(|s| s.name)
                .collect();
            assert_eq!(names, vec!["Shown".to_string()]);

            // The port grants ownership to anyone: a stranger sees both.
            let stranger = UserId::new();
            let granted = with_access(repo, ownership(true));
            let all = granted
                .search(stranger, &CharacterSearch::default())
                .await
                .unwrap();
            assert_eq!(all.len(), 2);
        }

        #[tokio::test]
        async fn search_pages_after_visibility() {
            let (_, use_cases) = in_memory();
            let alice = UserId::new();
            let bob = UserId::new();
            for name in ["Ash", "Birch", "Cedar"] {
                use_cases.create(alice, &wizard_input(name)).await.unwrap();
            }
            use_cases.create(bob, &wizard_input("Dune")).await.unwrap();

            let query = CharacterSearch {
                limit: Some(2),
                offset: 1,
                ..Default::default()
            };
            let page = use_cases.search(bob, &query).await.unwrap();
            assert!(page.is_empty());

            let page = use_cases.search(alice, &query).await.unwrap();
            let names: Vec<&str> = page.iter().map(|s| s.name.as_str()).collect();
            assert_eq!(names, vec!["Birch", "Cedar"]);
        }

        #[tokio::test]
        async fn create_backs_out_when_a_concurrent_create_overran_the_limit() {
            let owner = UserId::new();
            let counts = Arc::new(AtomicU32::new(0));

            let mut repo = MockCharacterRepo::new();
            let calls = counts.clone();
            repo.expect_count_by_owner()
                .times(2)
                .returning(move |_| {
                    // Before the insert the owner is under the limit; afterwards
                    // another writer's record is there too.
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        Ok(0)
                    } else {
                        Ok(2)
                    }
                });
            repo.expect_create()
                .times(1)
                .returning(|record| Ok(record.clone()));
            repo.expect_delete_by_id().times(1).returning(|_| Ok(()));

            let settings = EngineSettings {
                max_characters_per_owner: 1,
                ..Default::default()
            };
            let use_cases = with_mock_repo(repo, settings);
            let err = use_cases
                .create(owner, &wizard_input("Racer"))
                .await
                .unwrap_err();

            assert_eq!(err, CharacterError::CharacterLimitExceeded { limit: 1 });
            assert_eq!(counts.load(Ordering::SeqCst), 2);
        }
    }
}
