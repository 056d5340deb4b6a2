//! In-memory character storage.
//!
//! Records live in a `DashMap`. Conditional updates run under the shard lock
//! of the key's entry, so the revision compare and the write are atomic.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use sheetkeeper_domain::{CharacterId, CharacterRecord, UserId};

use crate::infrastructure::ports::{CharacterFilter, CharacterRepo, RepoError};

const ENTITY: &str = "Character";

#[derive(Debug, Default)]
pub struct InMemoryCharacterRepo {
    records: DashMap<CharacterId, CharacterRecord>,
}

impl InMemoryCharacterRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl CharacterRepo for InMemoryCharacterRepo {
    async fn find_by_id(&self, id: CharacterId) -> Result<Option<CharacterRecord>, RepoError> {
        Ok(self.records.get(&id).map(|entry| entry.value().clone()))
    }

    async fn create(&self, record: &CharacterRecord) -> Result<CharacterRecord, RepoError> {
        match self.records.entry(record.id()) {
            Entry::Occupied(_) => Err(RepoError::database(
                "create",
                format!("character {} already exists", record.id()),
            )),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(record.clone())
            }
        }
    }

    async fn update_by_id(
        &self,
        record: &CharacterRecord,
        expected_revision: u64,
    ) -> Result<CharacterRecord, RepoError> {
        let Some(mut stored) = self.records.get_mut(&record.id()) else {
            return Err(RepoError::not_found(ENTITY, record.id()));
        };
        let actual = stored.revision();
        if actual != expected_revision {
            return Err(RepoError::conflict(record.id(), expected_revision, actual));
        }

        let mut next = record.clone();
        next.set_revision(actual + 1);
        *stored = next.clone();
        Ok(next)
    }

    async fn delete_by_id(&self, id: CharacterId) -> Result<(), RepoError> {
        self.records
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepoError::not_found(ENTITY, id))
    }

    async fn count_by_owner(&self, owner: UserId) -> Result<u64, RepoError> {
        let count = self
            .records
            .iter()
            .filter(|entry| entry.owner_id() == owner && entry.is_active())
            .count();
        u64::try_from(count).map_err(|e| RepoError::database("count_by_owner", e))
    }

    async fn find_by_filter(
        &self,
        filter: &CharacterFilter,
    ) -> Result<Vec<CharacterRecord>, RepoError> {
        let mut matched: Vec<CharacterRecord> = self
            .records
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        // DashMap iteration order is arbitrary; sort so paging is stable.
        matched.sort_by(|a, b| {
            a.name()
                .as_str()
                .to_lowercase()
                .cmp(&b.name().as_str().to_lowercase())
                .then_with(|| a.created_at().cmp(&b.created_at()))
                .then_with(|| a.id().to_string().cmp(&b.id().to_string()))
        });

        let limit = filter.limit.unwrap_or(usize::MAX);
        Ok(matched.into_iter().skip(filter.offset).take(limit).collect())
    }
}
