//! Events - プラグインリポジトリのイベント
//!
//! チェーンクライアントがデコード済みの形で返します（ABI デコードは外部 SDK の責務）。

use alloy_primitives::{Address, B256, Bytes};
use serde::{Deserialize, Serialize};

/// `VersionCreated(uint8 release, uint16 build, address indexed pluginSetup, bytes buildMetadata)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionCreated {
    pub release: u8,
    pub build: u16,
    pub plugin_setup: Address,
    pub build_metadata: Bytes,
}

impl VersionCreated {
    pub const NAME: &'static str = "VersionCreated";
}

/// RepoEvent はリポジトリ／プロキシが発行するイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoEvent {
    VersionCreated(VersionCreated),
    ReleaseMetadataUpdated { release: u8, metadata: Bytes },
    Upgraded { implementation: Address },
}

/// 採掘済みトランザクションのレシート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: B256,
    pub block_number: u64,
    pub events: Vec<RepoEvent>,
}

impl TxReceipt {
    /// レシート内の最初の `VersionCreated`
    pub fn version_created(&self) -> Option<&VersionCreated> {
        self.events.iter().find_map(|event| match event {
            RepoEvent::VersionCreated(created) => Some(created),
            _ => None,
        })
    }
}

/// 過去のイベントとそのブロック番号
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventWithBlockNumber<E> {
    pub event: E,
    pub block_number: u64,
}
