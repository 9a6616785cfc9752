//! Domain model (versions, actions, permissions, networks, ...).
//!
//! 純粋な型とルールのみ。チェーンやファイルへのアクセスは ports 経由で行います。

pub mod action;
pub mod ens;
pub mod errors;
pub mod events;
pub mod ids;
pub mod network;
pub mod permission;
pub mod version;

pub use action::{ProposalAction, ProposalData, ProxyCall, ReInitData, UpgradeAction, UpgradeTarget};
pub use errors::{MissingDeployment, UpgradeError};
pub use events::{EventWithBlockNumber, RepoEvent, TxReceipt, VersionCreated};
pub use network::{Environment, NetworkDeployment};
pub use permission::{PermissionGrant, PermissionId};
pub use version::{ProtocolVersion, UpgradeStep, VersionReading};
