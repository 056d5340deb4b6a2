//! Permission rules for character records.
//!
//! Ownership is decided by the access-control port; this module only turns
//! "is the requester the owner" and "is the record public" into flags.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_share: bool,
}

impl Permissions {
    /// View is granted to the owner or anyone when public. Everything else is owner-only.
    pub fn resolve(is_owner: bool, is_public: bool) -> Self {
        Self {
            can_view: is_owner || is_public,
            can_edit: is_owner,
            can_delete: is_owner,
            can_share: is_owner,
        }
    }
}
