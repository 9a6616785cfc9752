//! SignerStrategy の実装

use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use crate::ports::{ChainClient, ChainError, SignerStrategy};

/// なりすましアカウントに設定する残高（1 ether）
pub const IMPERSONATION_BALANCE_WEI: u128 = 1_000_000_000_000_000_000;

/// 本番用: 代替の署名者は使わない
#[derive(Debug, Clone, Copy, Default)]
pub struct DeployerOnly;

#[async_trait]
impl SignerStrategy for DeployerOnly {
    async fn fallback_signer(
        &self,
        _chain: &dyn ChainClient,
        deployer: Address,
    ) -> Result<Address, ChainError> {
        Ok(deployer)
    }

    fn name(&self) -> &'static str {
        "deployer-only"
    }
}

/// ローカル用: 管理 DAO になりすまし、ガス代として 1 ether を持たせる
#[derive(Debug, Clone, Copy)]
pub struct ImpersonateManagementDao {
    management_dao: Address,
}

impl ImpersonateManagementDao {
    pub fn new(management_dao: Address) -> Self {
        Self { management_dao }
    }
}

#[async_trait]
impl SignerStrategy for ImpersonateManagementDao {
    async fn fallback_signer(
        &self,
        chain: &dyn ChainClient,
        _deployer: Address,
    ) -> Result<Address, ChainError> {
        chain
            .impersonate(self.management_dao, U256::from(IMPERSONATION_BALANCE_WEI))
            .await?;
        tracing::info!(signer = %self.management_dao, "impersonating management DAO");
        Ok(self.management_dao)
    }

    fn name(&self) -> &'static str {
        "impersonate-management-dao"
    }
}
