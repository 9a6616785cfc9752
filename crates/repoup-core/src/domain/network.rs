//! Network model: where the script runs and which production network it
//! targets.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Networks that run against a local node and allow impersonation.
pub const LOCAL_NETWORKS: [&str; 4] = ["localhost", "hardhat", "coverage", "zkLocalTestnet"];

/// Production network used by local runs when none is configured.
pub const DEFAULT_PRODUCTION_NETWORK: &str = "sepolia";

/// The network the deployment script is executed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    network: String,
    production_network: Option<String>,
}

impl Environment {
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            production_network: None,
        }
    }

    /// Production network that a local run should mirror.
    pub fn with_production_network(mut self, name: impl Into<String>) -> Self {
        self.production_network = Some(name.into());
        self
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn is_local(&self) -> bool {
        LOCAL_NETWORKS.contains(&self.network.as_str())
    }

    /// Anything that is not a local node is treated as a live deployment.
    pub fn is_production_like(&self) -> bool {
        !self.is_local()
    }

    /// Name (or alias) of the production network whose deployments apply.
    ///
    /// Live runs use their own network. Local runs use the configured
    /// production network and fall back to [`DEFAULT_PRODUCTION_NETWORK`].
    pub fn production_network_name(&self) -> &str {
        if !self.is_local() {
            return &self.network;
        }
        match &self.production_network {
            Some(name) => name,
            None => {
                tracing::warn!(
                    "no production network configured, defaulting to '{DEFAULT_PRODUCTION_NETWORK}'"
                );
                DEFAULT_PRODUCTION_NETWORK
            }
        }
    }
}

/// Latest known OSx framework addresses on one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDeployment {
    /// Latest `PluginRepo` implementation, the upgrade target.
    pub plugin_repo_base: Address,
    pub plugin_ens_subdomain_registrar_proxy: Address,
    pub management_dao_proxy: Address,
}
