//! UpgradeRunner - プラグインリポジトリのアップグレードを 1 回実行する
//!
//! # 流れ
//! 1. 本番ネットワーク名を解決（未知なら UnsupportedNetwork）
//! 2. 最新デプロイメントを取得（なければ MissingDeployment）
//! 3. ENS からプラグインリポジトリを探す（なければ MissingDeployment）
//! 4. 両方の protocolVersion を読む
//! 5. UpgradeDecisionProcedure で判定し、結果を実行する

use std::sync::Arc;

use alloy_primitives::{Address, B256};
use serde::Serialize;

use super::procedure::{UpgradeDecisionProcedure, UpgradeRequest};
use crate::domain::ens::{namehash, plugin_repo_domain};
use crate::domain::{
    Environment, MissingDeployment, NetworkDeployment, ProposalData, ProtocolVersion, ReInitData,
    UpgradeAction, UpgradeError, UpgradeStep, UpgradeTarget,
};
use crate::impls::{DeployerOnly, ImpersonateManagementDao};
use crate::ports::{ChainClient, DeploymentRegistry, ProposalSink, SignerStrategy};

/// 解決済みのプラグインリポジトリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRepo {
    pub network: String,
    pub ens_domain: String,
    pub repo: Address,
    pub deployment: NetworkDeployment,
}

/// 実行結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UpgradeOutcome {
    Skipped {
        version: ProtocolVersion,
    },
    Upgraded {
        repo: Address,
        implementation: Address,
        signer: Address,
        from: ProtocolVersion,
        to: ProtocolVersion,
        tx_hash: B256,
    },
    ProposalStaged {
        repo: Address,
        location: String,
    },
}

/// ReInitData の作り方（現在のバージョンから決まる）
pub type ReInitBuilder = Box<dyn Fn(ProtocolVersion) -> ReInitData + Send + Sync>;

pub struct UpgradeRunner {
    env: Environment,
    ens_subdomain: String,
    chain: Arc<dyn ChainClient>,
    registry: Arc<dyn DeploymentRegistry>,
    sink: Arc<dyn ProposalSink>,
    reinit: ReInitBuilder,
}

impl UpgradeRunner {
    pub fn new(
        env: Environment,
        ens_subdomain: impl Into<String>,
        chain: Arc<dyn ChainClient>,
        registry: Arc<dyn DeploymentRegistry>,
        sink: Arc<dyn ProposalSink>,
    ) -> Self {
        Self {
            env,
            ens_subdomain: ens_subdomain.into(),
            chain,
            registry,
            sink,
            reinit: Box::new(|_: ProtocolVersion| ReInitData::empty()),
        }
    }

    pub fn with_reinit(mut self, reinit: ReInitBuilder) -> Self {
        self.reinit = reinit;
        self
    }

    /// 環境に応じた SignerStrategy（ローカルのみ impersonation）
    pub fn signer_strategy(&self, deployment: &NetworkDeployment) -> Arc<dyn SignerStrategy> {
        if self.env.is_production_like() {
            Arc::new(DeployerOnly)
        } else {
            Arc::new(ImpersonateManagementDao::new(
                deployment.management_dao_proxy,
            ))
        }
    }

    /// ネットワーク・デプロイメント・リポジトリを解決
    pub async fn resolve(&self) -> Result<ResolvedRepo, UpgradeError> {
        let alias = self.env.production_network_name();
        let network = self
            .registry
            .network_name_by_alias(alias)
            .ok_or_else(|| UpgradeError::UnsupportedNetwork(alias.to_string()))?;
        let deployment = self.registry.latest_deployment(&network).ok_or_else(|| {
            MissingDeployment::NetworkDeployments {
                network: network.clone(),
            }
        })?;
        let plugin_ens_domain = self
            .registry
            .plugin_ens_domain(&network)
            .ok_or_else(|| UpgradeError::UnsupportedNetwork(network.clone()))?;

        let ens_domain = plugin_repo_domain(&self.ens_subdomain, &plugin_ens_domain);
        let repo = self
            .chain
            .resolve_ens(
                deployment.plugin_ens_subdomain_registrar_proxy,
                namehash(&ens_domain),
            )
            .await?
            .ok_or_else(|| MissingDeployment::PluginRepo {
                ens_domain: ens_domain.clone(),
            })?;

        Ok(ResolvedRepo {
            network,
            ens_domain,
            repo,
            deployment,
        })
    }

    /// (current, latest) を読む。current が未対応なら LEGACY
    async fn read_versions(
        &self,
        resolved: &ResolvedRepo,
    ) -> Result<(ProtocolVersion, ProtocolVersion), UpgradeError> {
        let current = self.chain.protocol_version(resolved.repo).await?;
        if current.reported().is_none() {
            tracing::warn!(
                repo = %resolved.repo,
                "plugin repo does not report a protocol version, assuming {}",
                ProtocolVersion::LEGACY
            );
        }
        let base = resolved.deployment.plugin_repo_base;
        let latest = self
            .chain
            .protocol_version(base)
            .await?
            .reported()
            .ok_or(UpgradeError::UnversionedImplementation(base))?;
        Ok((current.or_legacy(), latest))
    }

    /// 既にアップグレード済みなら true。ダウングレードになる場合はエラー
    pub async fn should_skip(&self) -> Result<bool, UpgradeError> {
        let resolved = self.resolve().await?;
        let (current, latest) = self.read_versions(&resolved).await?;
        let skip = current.upgrade_step(latest)? == UpgradeStep::UpToDate;
        if skip {
            tracing::info!(
                "PluginRepo '{}' ({}) has already been upgraded to the current protocol version {latest}, skipping",
                resolved.ens_domain,
                resolved.repo
            );
        }
        Ok(skip)
    }

    pub async fn run(&self) -> Result<UpgradeOutcome, UpgradeError> {
        let resolved = self.resolve().await?;
        tracing::info!(
            "upgrading plugin repo '{}' ({})",
            resolved.ens_domain,
            resolved.repo
        );

        let (current, latest) = self.read_versions(&resolved).await?;
        tracing::info!("upgrading from protocol version {current} to {latest}");

        let request = UpgradeRequest {
            target: UpgradeTarget::new(resolved.repo, resolved.deployment.plugin_repo_base),
            current,
            latest,
            reinit: (self.reinit)(current),
        };
        let procedure = UpgradeDecisionProcedure::new(
            self.chain.clone(),
            self.signer_strategy(&resolved.deployment),
        );

        match procedure.decide(&request).await? {
            UpgradeAction::Skip { version } => Ok(UpgradeOutcome::Skipped { version }),
            UpgradeAction::DirectUpgrade {
                signer,
                target,
                reinit,
            } => {
                let receipt = match reinit {
                    Some(data) => {
                        self.chain
                            .upgrade_to_and_call(
                                signer,
                                target.proxy,
                                target.new_implementation,
                                data.as_bytes().clone(),
                            )
                            .await?
                    }
                    None => {
                        self.chain
                            .upgrade_to(signer, target.proxy, target.new_implementation)
                            .await?
                    }
                };
                tracing::info!(
                    tx_hash = %receipt.tx_hash,
                    block = receipt.block_number,
                    "upgraded plugin repo to {}",
                    target.new_implementation
                );
                Ok(UpgradeOutcome::Upgraded {
                    repo: target.proxy,
                    implementation: target.new_implementation,
                    signer,
                    from: current,
                    to: latest,
                    tx_hash: receipt.tx_hash,
                })
            }
            UpgradeAction::StageProposal(action) => {
                let data = ProposalData::repo_upgrade(&resolved.ens_domain, action);
                let location = self.sink.persist(self.env.network(), &data).await?;
                tracing::info!(
                    "saved proposal data to '{location}'; create a proposal on the management DAO calling 'upgradeTo' or 'upgradeToAndCall' on {} ({})",
                    resolved.ens_domain,
                    resolved.repo
                );
                Ok(UpgradeOutcome::ProposalStaged {
                    repo: resolved.repo,
                    location,
                })
            }
        }
    }
}
