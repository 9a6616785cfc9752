//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryChain**: 開発・テスト用のチェーン
//! - **StaticDeploymentRegistry**: 設定ファイル由来のデプロイメント情報
//! - **JsonFileProposalSink**: 提案データの JSON 書き出し
//! - **DeployerOnly / ImpersonateManagementDao**: 署名者の選択
//!
//! # 本番用実装
//! RPC に接続する ChainClient は別クレートに配置します。

pub mod file_sink;
pub mod inmem_chain;
pub mod signer;
pub mod static_registry;

// 主要な型を再エクスポート
pub use self::file_sink::JsonFileProposalSink;
pub use self::inmem_chain::{ChainWrite, InMemoryChain, InMemoryChainBuilder};
pub use self::signer::{DeployerOnly, ImpersonateManagementDao};
pub use self::static_registry::StaticDeploymentRegistry;
