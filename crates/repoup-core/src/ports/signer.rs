//! SignerStrategy port - 権限がないときの署名者の選び方
//!
//! 環境（ローカル / 本番）による分岐は手続きの中ではなく、
//! どの strategy を渡すかで表現します。
//!
//! # 実装
//! - **DeployerOnly**: 本番用。代替の署名者は使わない
//! - **ImpersonateManagementDao**: ローカル用。管理 DAO になりすます

use alloy_primitives::Address;
use async_trait::async_trait;

use super::chain::{ChainClient, ChainError};

/// デプロイヤーがアップグレード権限を持たないときの代替署名者を決める
#[async_trait]
pub trait SignerStrategy: Send + Sync {
    /// 代替署名者を返す（代替しない場合は `deployer` をそのまま返す）
    async fn fallback_signer(
        &self,
        chain: &dyn ChainClient,
        deployer: Address,
    ) -> Result<Address, ChainError>;

    /// ログ用の名前
    fn name(&self) -> &'static str;
}
