//! Errors - アップグレード手続きのエラー分類
//!
//! すべて致命的（fatal）で、自動リトライはしません。
//! チェーンへの書き込みは冪等性が保証されないため、二重送信を避けます。

use alloy_primitives::{Address, B256};
use thiserror::Error;

use super::version::ProtocolVersion;
use crate::ports::chain::ChainError;
use crate::ports::proposal_sink::SinkError;

/// 存在しないデプロイメント
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MissingDeployment {
    #[error("PluginRepo '{ens_domain}' does not exist yet")]
    PluginRepo { ens_domain: String },

    #[error("deployments are not available on network {network}")]
    NetworkDeployments { network: String },
}

/// UpgradeError は upgrade / publish 手続きのエラー
#[derive(Debug, Error)]
pub enum UpgradeError {
    #[error("the plugin repo, currently at '{current}', cannot be upgraded to the earlier version {target}")]
    DowngradeRejected {
        current: ProtocolVersion,
        target: ProtocolVersion,
    },

    #[error(transparent)]
    MissingDeployment(#[from] MissingDeployment),

    #[error("unsupported network: {0}")]
    UnsupportedNetwork(String),

    #[error("failed to find {event} event in transaction {tx_hash}")]
    EventLookupFailure { event: &'static str, tx_hash: B256 },

    #[error("implementation at {0} does not report a protocol version")]
    UnversionedImplementation(Address),

    #[error("chain call failed: {0}")]
    Chain(#[from] ChainError),

    #[error("failed to persist proposal data: {0}")]
    Sink(#[from] SinkError),
}
