//! Permission identifiers used by the plugin repo.

use std::fmt;

use alloy_primitives::{Address, B256, keccak256};
use serde::{Deserialize, Serialize};

/// 32-byte permission identifier (`keccak256` of the permission name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionId(pub B256);

impl PermissionId {
    pub fn from_name(name: &str) -> Self {
        Self(keccak256(name.as_bytes()))
    }

    /// `UPGRADE_REPO_PERMISSION_ID` of `PluginRepo`.
    pub fn upgrade_repo() -> Self {
        Self::from_name("UPGRADE_REPO_PERMISSION")
    }

    /// `MAINTAINER_PERMISSION_ID` of `PluginRepo`, required by `createVersion`.
    pub fn maintainer() -> Self {
        Self::from_name("MAINTAINER_PERMISSION")
    }
}

impl fmt::Display for PermissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// "does `who` hold `permission` on `where_`"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PermissionGrant {
    pub where_: Address,
    pub who: Address,
    pub permission: PermissionId,
}

impl PermissionGrant {
    pub fn new(where_: Address, who: Address, permission: PermissionId) -> Self {
        Self {
            where_,
            who,
            permission,
        }
    }
}
