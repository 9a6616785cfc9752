//! DeploymentRegistry port - ネットワークごとの既知のデプロイメント
//!
//! # 実装
//! - **StaticDeploymentRegistry**: 設定ファイルから構築（impls::static_registry）

use crate::domain::NetworkDeployment;

/// DeploymentRegistry は論理ネットワーク名から既知のアドレスを返す
///
/// 見つからない場合は `None`（エラーにするかどうかは呼び出し側が決める）
pub trait DeploymentRegistry: Send + Sync {
    /// エイリアス（例: "ethereum"）から正式なネットワーク名を解決
    fn network_name_by_alias(&self, alias: &str) -> Option<String>;

    fn latest_deployment(&self, network: &str) -> Option<NetworkDeployment>;

    /// プラグイン用 ENS ドメイン（例: "plugin.dao.eth"）
    fn plugin_ens_domain(&self, network: &str) -> Option<String>;
}
