//! Storage and access-control ports.

use async_trait::async_trait;
use sheetkeeper_domain::{CharacterId, CharacterKind, CharacterRecord, PartyId, UserId};

use super::error::RepoError;

/// Storage for character records.
///
/// Writes carry the full record. `update_by_id` is conditional on the
/// revision the caller read; adapters bump the revision on success.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterRepo: Send + Sync {
    /// Any record with this id, including ones pending deletion.
    async fn find_by_id(&self, id: CharacterId) -> Result<Option<CharacterRecord>, RepoError>;

    /// Insert a new record. Returns the stored copy.
    async fn create(&self, record: &CharacterRecord) -> Result<CharacterRecord, RepoError>;

    /// Replace the record if its stored revision still equals `expected_revision`.
    ///
    /// Returns `RepoError::Conflict` when another writer got there first.
    async fn update_by_id(
        &self,
        record: &CharacterRecord,
        expected_revision: u64,
    ) -> Result<CharacterRecord, RepoError>;

    /// Hard delete.
    async fn delete_by_id(&self, id: CharacterId) -> Result<(), RepoError>;

    /// Number of active (not pending deletion) records owned by `owner`.
    async fn count_by_owner(&self, owner: UserId) -> Result<u64, RepoError>;

    async fn find_by_filter(
        &self,
        filter: &CharacterFilter,
    ) -> Result<Vec<CharacterRecord>, RepoError>;
}

/// Decides whether a requester owns a record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessControl: Send + Sync {
    async fn is_owner(&self, record: &CharacterRecord, requester: UserId) -> bool;
}

/// Query over stored records. Every populated field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterFilter {
    /// Only records owned by this user.
    pub owner_id: Option<UserId>,
    /// Case-insensitive substring of the name.
    pub name_contains: Option<String>,
    pub kind: Option<CharacterKind>,
    /// Case-insensitive class name the record has levels in.
    pub class_name: Option<String>,
    pub party_id: Option<PartyId>,
    /// Pending-deletion records are skipped unless set.
    pub include_pending_deletion: bool,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl CharacterFilter {
    pub fn owned_by(owner: UserId) -> Self {
        Self {
            owner_id: Some(owner),
            ..Default::default()
        }
    }

    /// Whether a single record passes every populated criterion.
    /// `limit` and `offset` apply to the result set, not here.
    pub fn matches(&self, record: &CharacterRecord) -> bool {
        if !self.include_pending_deletion && !record.is_active() {
            return false;
        }
        if self.owner_id.is_some_and(|owner| record.owner_id() != owner) {
            return false;
        }
        if let Some(needle) = &self.name_contains {
            if !record
                .name()
                .as_str()
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        if self.kind.is_some_and(|kind| record.kind() != kind) {
            return false;
        }
        if let Some(class_name) = &self.class_name {
            let wanted = class_name.trim().to_lowercase();
            if !record.classes().iter().any(|c| c.class_name.key() == wanted) {
                return false;
            }
        }
        if self.party_id.is_some_and(|party| record.party_id() != Some(party)) {
            return false;
        }
        true
    }
}
