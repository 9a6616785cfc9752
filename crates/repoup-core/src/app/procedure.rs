//! UpgradeDecisionProcedure - スキップ / 直接アップグレード / 提案 の判定
//!
//! # 判定の流れ
//! 1. バージョンゲート（ダウングレードは致命的エラー、同一ならスキップ）
//! 2. デプロイヤーが権限を持っていればデプロイヤーで実行
//! 3. 持っていなければ SignerStrategy が代替署名者を決める
//! 4. 決まった署名者の権限を再確認し、DirectUpgrade か StageProposal を返す
//!
//! チェーンへの書き込みは行いません（impersonation によるノード設定のみ）。
//! 実行は UpgradeRunner の責務です。

use std::sync::Arc;

use alloy_primitives::Address;

use crate::domain::{
    PermissionGrant, PermissionId, ProposalAction, ProtocolVersion, ReInitData, UpgradeAction,
    UpgradeError, UpgradeStep, UpgradeTarget,
};
use crate::ports::{ChainClient, SignerStrategy};

/// 1 回の判定に必要な入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeRequest {
    pub target: UpgradeTarget,
    /// デプロイ済みプロキシのバージョン（未対応なら LEGACY に変換済み）
    pub current: ProtocolVersion,
    /// 新しい実装のバージョン
    pub latest: ProtocolVersion,
    pub reinit: ReInitData,
}

pub struct UpgradeDecisionProcedure {
    chain: Arc<dyn ChainClient>,
    signer_strategy: Arc<dyn SignerStrategy>,
    permission: PermissionId,
}

impl UpgradeDecisionProcedure {
    pub fn new(chain: Arc<dyn ChainClient>, signer_strategy: Arc<dyn SignerStrategy>) -> Self {
        Self {
            chain,
            signer_strategy,
            permission: PermissionId::upgrade_repo(),
        }
    }

    pub async fn decide(&self, request: &UpgradeRequest) -> Result<UpgradeAction, UpgradeError> {
        if request.current.upgrade_step(request.latest)? == UpgradeStep::UpToDate {
            tracing::info!(version = %request.latest, proxy = %request.target.proxy, "already at target version");
            return Ok(UpgradeAction::Skip {
                version: request.latest,
            });
        }

        let signer = self.resolve_signer(request.target.proxy).await?;

        if self.holds_upgrade_permission(request.target.proxy, signer).await? {
            tracing::info!(%signer, "signer holds the upgrade permission");
            return Ok(UpgradeAction::DirectUpgrade {
                signer,
                target: request.target,
                reinit: request.reinit.non_empty().cloned(),
            });
        }

        tracing::info!(%signer, "no available signer may upgrade, staging a proposal");
        Ok(UpgradeAction::StageProposal(ProposalAction::upgrade(
            request.target,
            &request.reinit,
        )))
    }

    async fn resolve_signer(&self, proxy: Address) -> Result<Address, UpgradeError> {
        let deployer = self.chain.default_signer().await?;
        if self.holds_upgrade_permission(proxy, deployer).await? {
            return Ok(deployer);
        }
        tracing::debug!(
            %deployer,
            strategy = self.signer_strategy.name(),
            "deployer lacks the upgrade permission"
        );
        Ok(self
            .signer_strategy
            .fallback_signer(self.chain.as_ref(), deployer)
            .await?)
    }

    async fn holds_upgrade_permission(
        &self,
        proxy: Address,
        who: Address,
    ) -> Result<bool, UpgradeError> {
        Ok(self
            .chain
            .is_granted(PermissionGrant::new(proxy, who, self.permission))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{ChainWrite, DeployerOnly, ImpersonateManagementDao, InMemoryChain};
    use alloy_primitives::address;
    use proptest::prelude::*;

    const DEPLOYER: Address = address!("d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0");
    const DAO: Address = address!("dadadadadadadadadadadadadadadadadadadada");
    const REPO: Address = address!("0101010101010101010101010101010101010101");
    const BASE: Address = address!("0202020202020202020202020202020202020202");

    struct Fixture {
        chain: Arc<InMemoryChain>,
    }

    impl Fixture {
        fn new(deployer_may_upgrade: bool, dao_may_upgrade: bool) -> Self {
            let mut builder = InMemoryChain::builder(DEPLOYER)
                .contract(REPO, Some(ProtocolVersion::new(1, 0, 0)))
                .contract(BASE, Some(ProtocolVersion::new(1, 0, 1)));
            if deployer_may_upgrade {
                builder = builder.grant(REPO, DEPLOYER, PermissionId::upgrade_repo());
            }
            if dao_may_upgrade {
                builder = builder.grant(REPO, DAO, PermissionId::upgrade_repo());
            }
            Self {
                chain: Arc::new(builder.build()),
            }
        }

        fn procedure(&self, production_like: bool) -> UpgradeDecisionProcedure {
            let strategy: Arc<dyn SignerStrategy> = if production_like {
                Arc::new(DeployerOnly)
            } else {
                Arc::new(ImpersonateManagementDao::new(DAO))
            };
            UpgradeDecisionProcedure::new(self.chain.clone(), strategy)
        }

        async fn writes(&self) -> Vec<ChainWrite> {
            self.chain.writes().await
        }
    }

    fn request(reinit: ReInitData) -> UpgradeRequest {
        UpgradeRequest {
            target: UpgradeTarget::new(REPO, BASE),
            current: ProtocolVersion::new(1, 0, 0),
            latest: ProtocolVersion::new(1, 0, 1),
            reinit,
        }
    }

    #[tokio::test]
    async fn authorized_deployer_upgrades_directly() {
        let fixture = Fixture::new(true, false);

        let action = fixture
            .procedure(true)
            .decide(&request(ReInitData::empty()))
            .await
            .unwrap();

        assert_eq!(
            action,
            UpgradeAction::DirectUpgrade {
                signer: DEPLOYER,
                target: UpgradeTarget::new(REPO, BASE),
                reinit: None,
            }
        );
        assert!(fixture.chain.impersonated().await.is_empty());
        assert!(fixture.writes().await.is_empty());
    }

    #[tokio::test]
    async fn local_run_impersonates_dao_with_permission() {
        let fixture = Fixture::new(false, true);

        let action = fixture
            .procedure(false)
            .decide(&request(ReInitData::empty()))
            .await
            .unwrap();

        assert!(matches!(action, UpgradeAction::DirectUpgrade { signer, .. } if signer == DAO));
        assert_eq!(fixture.chain.impersonated().await, vec![DAO]);
    }

    #[tokio::test]
    async fn local_run_stages_proposal_when_dao_lacks_permission() {
        let fixture = Fixture::new(false, false);

        let action = fixture
            .procedure(false)
            .decide(&request(ReInitData::empty()))
            .await
            .unwrap();

        let UpgradeAction::StageProposal(proposal) = action else {
            panic!("expected a staged proposal, got {action:?}");
        };
        assert_eq!(proposal.to, REPO);
        assert_eq!(proposal.call.new_implementation(), BASE);
        assert!(fixture.writes().await.is_empty());
    }

    #[tokio::test]
    async fn production_run_never_impersonates() {
        // the DAO could upgrade, but a live network must not substitute signers
        let fixture = Fixture::new(false, true);

        let action = fixture
            .procedure(true)
            .decide(&request(ReInitData::empty()))
            .await
            .unwrap();

        assert!(matches!(action, UpgradeAction::StageProposal(_)));
        assert!(fixture.chain.impersonated().await.is_empty());
    }

    #[tokio::test]
    async fn reinit_payload_is_carried_by_direct_upgrade() {
        let fixture = Fixture::new(true, false);
        let reinit = ReInitData::from(vec![0xca, 0xfe]);

        let action = fixture
            .procedure(true)
            .decide(&request(reinit.clone()))
            .await
            .unwrap();

        assert!(matches!(
            action,
            UpgradeAction::DirectUpgrade { reinit: Some(ref data), .. } if *data == reinit
        ));
    }

    #[tokio::test]
    async fn reinit_payload_is_carried_by_proposal() {
        let fixture = Fixture::new(false, false);
        let reinit = ReInitData::from(vec![0xca, 0xfe]);

        let action = fixture
            .procedure(true)
            .decide(&request(reinit.clone()))
            .await
            .unwrap();

        let UpgradeAction::StageProposal(proposal) = action else {
            panic!("expected a staged proposal, got {action:?}");
        };
        assert_eq!(
            proposal.call,
            crate::domain::ProxyCall::UpgradeToAndCall {
                new_implementation: BASE,
                data: reinit.as_bytes().clone(),
                payable_amount: 0,
            }
        );
    }

    #[tokio::test]
    async fn downgrade_is_rejected_before_any_query() {
        let fixture = Fixture::new(true, true);
        let mut req = request(ReInitData::empty());
        std::mem::swap(&mut req.current, &mut req.latest);

        let err = fixture.procedure(false).decide(&req).await.unwrap_err();

        assert!(matches!(err, UpgradeError::DowngradeRejected { .. }));
        assert!(fixture.chain.impersonated().await.is_empty());
        assert!(fixture.writes().await.is_empty());
    }

    fn versions() -> impl Strategy<Value = (ProtocolVersion, ProtocolVersion)> {
        (any::<[u8; 3]>(), any::<[u8; 3]>())
            .prop_map(|(a, b)| (ProtocolVersion::from(a), ProtocolVersion::from(b)))
    }

    proptest! {
        #[test]
        fn gate_outcomes_never_write((a, b) in versions()) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let fixture = Fixture::new(true, true);
            let req = UpgradeRequest { current: a, latest: b, ..request(ReInitData::empty()) };

            let result = rt.block_on(fixture.procedure(false).decide(&req));

            match a.cmp(&b) {
                std::cmp::Ordering::Greater => {
                    let rejected = matches!(result, Err(UpgradeError::DowngradeRejected { .. }));
                    prop_assert!(rejected);
                }
                std::cmp::Ordering::Equal => {
                    prop_assert_eq!(result.unwrap(), UpgradeAction::Skip { version: a });
                }
                std::cmp::Ordering::Less => {
                    let direct = matches!(result, Ok(UpgradeAction::DirectUpgrade { .. }));
                    prop_assert!(direct);
                }
            }
            prop_assert!(rt.block_on(fixture.writes()).is_empty());
        }
    }
}
