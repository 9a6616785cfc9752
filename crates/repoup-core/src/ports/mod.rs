//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（チェーン RPC, デプロイメント情報, ファイル）への
//! インターフェースを提供し、実装の詳細を隠蔽します。

pub mod chain;
pub mod proposal_sink;
pub mod registry;
pub mod signer;

// 主要な trait を再エクスポート
pub use self::chain::{ChainClient, ChainError, CreateVersionCall};
pub use self::proposal_sink::{ProposalSink, SinkError};
pub use self::registry::DeploymentRegistry;
pub use self::signer::SignerStrategy;
