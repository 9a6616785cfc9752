//! ProposalSink port - ガバナンス提案データの保存先
//!
//! # 実装
//! - **JsonFileProposalSink**: JSON ファイルに書き出す（impls::file_sink）

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::ProposalData;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize proposal data: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// ProposalSink は提案データを永続化し、保存先を返す
#[async_trait]
pub trait ProposalSink: Send + Sync {
    async fn persist(&self, network: &str, data: &ProposalData) -> Result<String, SinkError>;
}
