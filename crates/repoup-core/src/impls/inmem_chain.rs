//! InMemoryChain - 開発・テスト用のチェーン
//!
//! # 学習ポイント
//! - tokio::sync::Mutex による状態の共有
//! - Builder による初期状態の組み立て
//! - 書き込みジャーナルによるテストでの検証（「書き込みが発生しないこと」など）
//!
//! コントラクトのロジックは最小限です。プロキシは実装アドレスと
//! protocolVersion だけを持ち、権限チェックは `isGranted` と同じテーブルを使います。

use std::collections::{HashMap, HashSet};

use alloy_primitives::{Address, B256, Bytes, U256, keccak256};
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    EventWithBlockNumber, PermissionGrant, PermissionId, ProtocolVersion, RepoEvent, TxReceipt,
    VersionCreated, VersionReading,
};
use crate::ports::{ChainClient, ChainError, CreateVersionCall};

/// 送信されたトランザクションの記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainWrite {
    UpgradeTo {
        signer: Address,
        proxy: Address,
        implementation: Address,
    },
    UpgradeToAndCall {
        signer: Address,
        proxy: Address,
        implementation: Address,
        data: Bytes,
    },
    CreateVersion {
        signer: Address,
        repo: Address,
        release: u8,
        build: u16,
    },
}

#[derive(Debug, Clone, Default)]
struct ContractState {
    /// `None` はゲッターを持たない古いコントラクト
    version: Option<ProtocolVersion>,
    /// プロキシの場合の実装アドレス
    implementation: Option<Address>,
    latest_builds: HashMap<u8, u16>,
    version_history: Vec<EventWithBlockNumber<VersionCreated>>,
}

struct ChainState {
    deployer: Address,
    signers: HashSet<Address>,
    balances: HashMap<Address, U256>,
    contracts: HashMap<Address, ContractState>,
    grants: HashSet<PermissionGrant>,
    ens_records: HashMap<(Address, B256), Address>,
    block_number: u64,
    emit_events: bool,
    writes: Vec<ChainWrite>,
    impersonated: Vec<Address>,
}

impl ChainState {
    fn ensure_signer(&self, signer: Address) -> Result<(), ChainError> {
        if self.signers.contains(&signer) {
            Ok(())
        } else {
            Err(ChainError::UnknownSigner(signer))
        }
    }

    fn ensure_granted(
        &self,
        where_: Address,
        who: Address,
        permission: PermissionId,
    ) -> Result<(), ChainError> {
        if self.grants.contains(&PermissionGrant::new(where_, who, permission)) {
            Ok(())
        } else {
            Err(ChainError::Reverted(format!(
                "DaoUnauthorized(where: {where_}, who: {who}, permission: {permission})"
            )))
        }
    }

    fn contract_mut(&mut self, address: Address) -> Result<&mut ContractState, ChainError> {
        self.contracts
            .get_mut(&address)
            .ok_or(ChainError::UnknownContract(address))
    }

    fn mine(&mut self, write: ChainWrite, events: Vec<RepoEvent>) -> TxReceipt {
        self.block_number += 1;
        let tx_hash = keccak256(self.block_number.to_be_bytes());
        self.writes.push(write);
        TxReceipt {
            tx_hash,
            block_number: self.block_number,
            events: if self.emit_events { events } else { Vec::new() },
        }
    }

    fn upgrade(
        &mut self,
        signer: Address,
        proxy: Address,
        implementation: Address,
    ) -> Result<(), ChainError> {
        self.ensure_signer(signer)?;
        self.ensure_granted(proxy, signer, PermissionId::upgrade_repo())?;
        let new_version = self
            .contracts
            .get(&implementation)
            .ok_or(ChainError::UnknownContract(implementation))?
            .version;
        let proxy_state = self.contract_mut(proxy)?;
        proxy_state.implementation = Some(implementation);
        proxy_state.version = new_version;
        Ok(())
    }
}

/// InMemoryChain は ChainClient のインメモリ実装
///
/// # 使用例
/// ```ignore
/// let chain = InMemoryChain::builder(deployer)
///     .contract(repo, Some(ProtocolVersion::new(1, 0, 0)))
///     .contract(base, Some(ProtocolVersion::new(1, 3, 0)))
///     .grant(repo, deployer, PermissionId::upgrade_repo())
///     .build();
/// ```
pub struct InMemoryChain {
    state: Mutex<ChainState>,
}

impl InMemoryChain {
    pub fn builder(deployer: Address) -> InMemoryChainBuilder {
        InMemoryChainBuilder::new(deployer)
    }

    /// 送信済みトランザクション
    pub async fn writes(&self) -> Vec<ChainWrite> {
        self.state.lock().await.writes.clone()
    }

    /// なりすましたアカウント
    pub async fn impersonated(&self) -> Vec<Address> {
        self.state.lock().await.impersonated.clone()
    }

    pub async fn balance_of(&self, account: Address) -> U256 {
        self.state
            .lock()
            .await
            .balances
            .get(&account)
            .copied()
            .unwrap_or_default()
    }

    pub async fn implementation_of(&self, proxy: Address) -> Option<Address> {
        self.state
            .lock()
            .await
            .contracts
            .get(&proxy)
            .and_then(|c| c.implementation)
    }

    pub async fn grant(&self, where_: Address, who: Address, permission: PermissionId) {
        self.state
            .lock()
            .await
            .grants
            .insert(PermissionGrant::new(where_, who, permission));
    }

    /// false にするとレシートにイベントが含まれなくなる（イベント欠落の再現用）
    pub async fn set_emit_events(&self, emit: bool) {
        self.state.lock().await.emit_events = emit;
    }
}

#[async_trait]
impl ChainClient for InMemoryChain {
    async fn default_signer(&self) -> Result<Address, ChainError> {
        Ok(self.state.lock().await.deployer)
    }

    async fn protocol_version(&self, contract: Address) -> Result<VersionReading, ChainError> {
        let state = self.state.lock().await;
        let contract_state = state
            .contracts
            .get(&contract)
            .ok_or(ChainError::UnknownContract(contract))?;
        Ok(match contract_state.version {
            Some(version) => VersionReading::Reported(version),
            None => VersionReading::Unversioned,
        })
    }

    async fn is_granted(&self, grant: PermissionGrant) -> Result<bool, ChainError> {
        let state = self.state.lock().await;
        if !state.contracts.contains_key(&grant.where_) {
            return Err(ChainError::UnknownContract(grant.where_));
        }
        Ok(state.grants.contains(&grant))
    }

    async fn impersonate(&self, account: Address, balance: U256) -> Result<(), ChainError> {
        let mut state = self.state.lock().await;
        state.signers.insert(account);
        state.balances.insert(account, balance);
        state.impersonated.push(account);
        Ok(())
    }

    async fn resolve_ens(&self, registrar: Address, node: B256) -> Result<Option<Address>, ChainError> {
        let state = self.state.lock().await;
        if !state.contracts.contains_key(&registrar) {
            return Err(ChainError::UnknownContract(registrar));
        }
        Ok(state.ens_records.get(&(registrar, node)).copied())
    }

    async fn upgrade_to(
        &self,
        signer: Address,
        proxy: Address,
        implementation: Address,
    ) -> Result<TxReceipt, ChainError> {
        let mut state = self.state.lock().await;
        state.upgrade(signer, proxy, implementation)?;
        Ok(state.mine(
            ChainWrite::UpgradeTo {
                signer,
                proxy,
                implementation,
            },
            vec![RepoEvent::Upgraded { implementation }],
        ))
    }

    async fn upgrade_to_and_call(
        &self,
        signer: Address,
        proxy: Address,
        implementation: Address,
        data: Bytes,
    ) -> Result<TxReceipt, ChainError> {
        let mut state = self.state.lock().await;
        state.upgrade(signer, proxy, implementation)?;
        Ok(state.mine(
            ChainWrite::UpgradeToAndCall {
                signer,
                proxy,
                implementation,
                data,
            },
            vec![RepoEvent::Upgraded { implementation }],
        ))
    }

    async fn create_version(
        &self,
        signer: Address,
        repo: Address,
        call: CreateVersionCall,
    ) -> Result<TxReceipt, ChainError> {
        let mut state = self.state.lock().await;
        state.ensure_signer(signer)?;
        state.ensure_granted(repo, signer, PermissionId::maintainer())?;
        if call.release == 0 {
            return Err(ChainError::Reverted("ReleaseZeroNotAllowed()".to_string()));
        }

        let block_number = state.block_number + 1;
        let repo_state = state.contract_mut(repo)?;
        let build = repo_state.latest_builds.get(&call.release).copied().unwrap_or(0) + 1;
        let first_build = build == 1;
        repo_state.latest_builds.insert(call.release, build);

        let created = VersionCreated {
            release: call.release,
            build,
            plugin_setup: call.plugin_setup,
            build_metadata: call.build_metadata,
        };
        repo_state.version_history.push(EventWithBlockNumber {
            event: created.clone(),
            block_number,
        });

        let mut events = vec![RepoEvent::VersionCreated(created)];
        if first_build || !call.release_metadata.is_empty() {
            events.push(RepoEvent::ReleaseMetadataUpdated {
                release: call.release,
                metadata: call.release_metadata,
            });
        }
        Ok(state.mine(
            ChainWrite::CreateVersion {
                signer,
                repo,
                release: call.release,
                build,
            },
            events,
        ))
    }

    async fn version_created_events(
        &self,
        repo: Address,
    ) -> Result<Vec<EventWithBlockNumber<VersionCreated>>, ChainError> {
        let state = self.state.lock().await;
        let repo_state = state
            .contracts
            .get(&repo)
            .ok_or(ChainError::UnknownContract(repo))?;
        Ok(repo_state.version_history.clone())
    }
}

/// InMemoryChainBuilder は InMemoryChain の初期状態を組み立てる
pub struct InMemoryChainBuilder {
    state: ChainState,
}

impl InMemoryChainBuilder {
    fn new(deployer: Address) -> Self {
        Self {
            state: ChainState {
                deployer,
                signers: HashSet::from([deployer]),
                balances: HashMap::new(),
                contracts: HashMap::new(),
                grants: HashSet::new(),
                ens_records: HashMap::new(),
                block_number: 0,
                emit_events: true,
                writes: Vec::new(),
                impersonated: Vec::new(),
            },
        }
    }

    /// コントラクトを配置（`version` が None なら protocolVersion() を持たない）
    pub fn contract(mut self, address: Address, version: Option<ProtocolVersion>) -> Self {
        self.state.contracts.insert(
            address,
            ContractState {
                version,
                ..ContractState::default()
            },
        );
        self
    }

    /// `implementation` を指すプロキシを配置（バージョンは実装のものを使う）
    pub fn proxy(mut self, address: Address, implementation: Address) -> Self {
        let version = self
            .state
            .contracts
            .get(&implementation)
            .and_then(|c| c.version);
        self.state.contracts.insert(
            address,
            ContractState {
                version,
                implementation: Some(implementation),
                ..ContractState::default()
            },
        );
        self
    }

    pub fn grant(mut self, where_: Address, who: Address, permission: PermissionId) -> Self {
        self.state
            .grants
            .insert(PermissionGrant::new(where_, who, permission));
        self
    }

    pub fn ens_record(mut self, registrar: Address, node: B256, target: Address) -> Self {
        self.state.ens_records.insert((registrar, node), target);
        self
    }

    pub fn build(self) -> InMemoryChain {
        InMemoryChain {
            state: Mutex::new(self.state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use alloy_primitives::address;

    const DEPLOYER: Address = address!("d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0");
    const REPO: Address = address!("0101010101010101010101010101010101010101");
    const OLD_IMPL: Address = address!("0202020202020202020202020202020202020202");
    const NEW_IMPL: Address = address!("0303030303030303030303030303030303030303");

    fn chain() -> InMemoryChain {
        InMemoryChain::builder(DEPLOYER)
            .contract(OLD_IMPL, None)
            .contract(NEW_IMPL, Some(ProtocolVersion::new(1, 3, 0)))
            .proxy(REPO, OLD_IMPL)
            .build()
    }

    #[tokio::test]
    async fn proxy_without_getter_is_unversioned() {
        let chain = chain();
        assert_eq!(
            chain.protocol_version(REPO).await.unwrap(),
            VersionReading::Unversioned
        );
        assert_eq!(
            chain.protocol_version(Address::ZERO).await,
            Err(ChainError::UnknownContract(Address::ZERO))
        );
    }

    #[tokio::test]
    async fn upgrade_requires_permission() {
        let chain = chain();
        let err = chain.upgrade_to(DEPLOYER, REPO, NEW_IMPL).await.unwrap_err();
        assert!(matches!(err, ChainError::Reverted(_)));
        assert!(chain.writes().await.is_empty());

        chain.grant(REPO, DEPLOYER, PermissionId::upgrade_repo()).await;
        let receipt = chain.upgrade_to(DEPLOYER, REPO, NEW_IMPL).await.unwrap();

        assert_eq!(receipt.block_number, 1);
        assert_eq!(chain.implementation_of(REPO).await, Some(NEW_IMPL));
        assert_eq!(
            chain.protocol_version(REPO).await.unwrap(),
            VersionReading::Reported(ProtocolVersion::new(1, 3, 0))
        );
    }

    #[tokio::test]
    async fn unknown_signer_cannot_send() {
        let chain = chain();
        let stranger = Address::repeat_byte(0xee);
        chain.grant(REPO, stranger, PermissionId::upgrade_repo()).await;

        let err = chain.upgrade_to(stranger, REPO, NEW_IMPL).await.unwrap_err();
        assert_eq!(err, ChainError::UnknownSigner(stranger));

        chain.impersonate(stranger, U256::from(1u64)).await.unwrap();
        chain.upgrade_to(stranger, REPO, NEW_IMPL).await.unwrap();
        assert_eq!(chain.balance_of(stranger).await, U256::from(1u64));
    }

    #[tokio::test]
    async fn create_version_increments_builds() {
        let chain = chain();
        chain.grant(REPO, DEPLOYER, PermissionId::maintainer()).await;
        let call = CreateVersionCall {
            release: 1,
            plugin_setup: Address::repeat_byte(0x5e),
            build_metadata: Bytes::from_static(b"build"),
            release_metadata: Bytes::from_static(b"release"),
        };

        let first = chain.create_version(DEPLOYER, REPO, call.clone()).await.unwrap();
        let second = chain.create_version(DEPLOYER, REPO, call).await.unwrap();

        assert_eq!(first.version_created().unwrap().build, 1);
        assert_eq!(second.version_created().unwrap().build, 2);
        assert_eq!(chain.version_created_events(REPO).await.unwrap().len(), 2);
    }
}
