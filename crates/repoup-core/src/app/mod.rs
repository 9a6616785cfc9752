//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **UpgradeDecisionProcedure**: スキップ / 直接アップグレード / 提案 の判定
//! - **UpgradeRunner**: ネットワーク解決からアップグレード実行までの一連の流れ
//! - **publish**: ビルドの公開と VersionCreated イベントの取得

pub mod procedure;
pub mod publish;
pub mod runner;

// 主要な型を再エクスポート
pub use self::procedure::{UpgradeDecisionProcedure, UpgradeRequest};
pub use self::publish::{publish_build, version_history};
pub use self::runner::{ReInitBuilder, ResolvedRepo, UpgradeOutcome, UpgradeRunner};
