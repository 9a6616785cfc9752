//! ChainClient port - チェーン RPC の抽象化
//!
//! 署名者の解決、読み取り専用の呼び出し（protocolVersion, isGranted, ENS）、
//! アップグレードトランザクションの送信とレシート待ちを提供します。
//!
//! # 実装
//! - **InMemoryChain**: 開発・テスト用（impls::inmem_chain）
//! - 本番用の RPC 実装は別クレートに配置します

use alloy_primitives::{Address, B256, Bytes, U256};
use async_trait::async_trait;

use crate::domain::{EventWithBlockNumber, PermissionGrant, TxReceipt, VersionCreated, VersionReading};

/// ChainError はチェーン呼び出しの失敗
///
/// リトライはしません。呼び出し側にそのまま伝播します。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("no contract deployed at {0}")]
    UnknownContract(Address),

    #[error("signer {0} is not available")]
    UnknownSigner(Address),

    #[error("transaction reverted: {0}")]
    Reverted(String),
}

/// `createVersion(release, pluginSetup, buildMetadata, releaseMetadata)` の引数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateVersionCall {
    pub release: u8,
    pub plugin_setup: Address,
    pub build_metadata: Bytes,
    pub release_metadata: Bytes,
}

/// ChainClient はチェーンへの唯一の入り口
///
/// # 設計原則
/// - 読み取りは毎回チェーンに問い合わせる（キャッシュしない）
/// - 書き込みはレシートを待ってから返す
/// - `protocol_version` は getter を持たない古いコントラクトに対して
///   エラーではなく `VersionReading::Unversioned` を返す
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// デフォルトの署名者（デプロイヤー）
    async fn default_signer(&self) -> Result<Address, ChainError>;

    async fn protocol_version(&self, contract: Address) -> Result<VersionReading, ChainError>;

    async fn is_granted(&self, grant: PermissionGrant) -> Result<bool, ChainError>;

    /// ローカルノードでのみ使用: `account` として署名できるようにし、残高を設定する
    async fn impersonate(&self, account: Address, balance: U256) -> Result<(), ChainError>;

    /// registrar → ENS → resolver を辿って node のアドレスを解決（レコードがなければ None）
    async fn resolve_ens(&self, registrar: Address, node: B256) -> Result<Option<Address>, ChainError>;

    async fn upgrade_to(
        &self,
        signer: Address,
        proxy: Address,
        implementation: Address,
    ) -> Result<TxReceipt, ChainError>;

    async fn upgrade_to_and_call(
        &self,
        signer: Address,
        proxy: Address,
        implementation: Address,
        data: Bytes,
    ) -> Result<TxReceipt, ChainError>;

    async fn create_version(
        &self,
        signer: Address,
        repo: Address,
        call: CreateVersionCall,
    ) -> Result<TxReceipt, ChainError>;

    /// リポジトリの過去の `VersionCreated` イベント（ブロック 0 から最新まで）
    async fn version_created_events(
        &self,
        repo: Address,
    ) -> Result<Vec<EventWithBlockNumber<VersionCreated>>, ChainError>;
}
