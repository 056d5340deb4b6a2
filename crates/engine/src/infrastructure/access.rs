//! Default access-control adapter.

use async_trait::async_trait;
use sheetkeeper_domain::{CharacterRecord, UserId};

use crate::infrastructure::ports::AccessControl;

/// Grants ownership to the user recorded as the record's owner, nobody else.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerAccessControl;

#[async_trait]
impl AccessControl for OwnerAccessControl {
    async fn is_owner(&self, record: &CharacterRecord, requester: UserId) -> bool {
        record.owner_id() == requester
    }
}
