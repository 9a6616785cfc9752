//! JsonFileProposalSink - 提案データを JSON ファイルに書き出す
//!
//! ファイル名は `upgradeRepoProposalData-<network>.json`。
//! 管理 DAO のメンバーがこのファイルから提案を作成します。

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::ProposalData;
use crate::ports::{ProposalSink, SinkError};

pub struct JsonFileProposalSink {
    dir: PathBuf,
}

impl JsonFileProposalSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, network: &str) -> PathBuf {
        self.dir
            .join(format!("upgradeRepoProposalData-{network}.json"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ProposalSink for JsonFileProposalSink {
    async fn persist(&self, network: &str, data: &ProposalData) -> Result<String, SinkError> {
        let path = self.path_for(network);
        let json = serde_json::to_string_pretty(data)?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|source| SinkError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ProposalAction, ReInitData, UpgradeTarget};
    use alloy_primitives::Address;

    fn data() -> ProposalData {
        let target = UpgradeTarget::new(Address::repeat_byte(1), Address::repeat_byte(2));
        ProposalData::repo_upgrade(
            "admin.plugin.dao.eth",
            ProposalAction::upgrade(target, &ReInitData::empty()),
        )
    }

    #[tokio::test]
    async fn writes_pretty_json_per_network() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileProposalSink::new(dir.path());

        let location = sink.persist("sepolia", &data()).await.unwrap();

        assert!(location.ends_with("upgradeRepoProposalData-sepolia.json"));
        let text = std::fs::read_to_string(sink.path_for("sepolia")).unwrap();
        let parsed: ProposalData = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, data());
        assert!(text.contains('\n'));
    }

    #[tokio::test]
    async fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileProposalSink::new(dir.path().join("missing"));

        let err = sink.persist("sepolia", &data()).await.unwrap_err();
        assert!(matches!(err, SinkError::Io { .. }));
    }
}
