//! StaticDeploymentRegistry - 設定から構築するデプロイメント情報

use std::collections::HashMap;

use crate::config::NetworkConfig;
use crate::domain::NetworkDeployment;
use crate::ports::DeploymentRegistry;

#[derive(Debug, Clone)]
struct Entry {
    plugin_ens_domain: String,
    deployment: Option<NetworkDeployment>,
}

/// StaticDeploymentRegistry は固定のネットワーク表を持つ
///
/// - 正式名は常に自分自身のエイリアス
/// - デプロイメントが未登録のネットワークは `latest_deployment` が None
#[derive(Debug, Clone, Default)]
pub struct StaticDeploymentRegistry {
    aliases: HashMap<String, String>,
    networks: HashMap<String, Entry>,
}

impl StaticDeploymentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_network(
        mut self,
        name: &str,
        aliases: &[&str],
        plugin_ens_domain: &str,
        deployment: Option<NetworkDeployment>,
    ) -> Self {
        self.aliases.insert(name.to_string(), name.to_string());
        for alias in aliases {
            self.aliases.insert(alias.to_string(), name.to_string());
        }
        self.networks.insert(
            name.to_string(),
            Entry {
                plugin_ens_domain: plugin_ens_domain.to_string(),
                deployment,
            },
        );
        self
    }

    pub fn from_config(networks: &[NetworkConfig]) -> Self {
        networks.iter().fold(Self::new(), |registry, network| {
            let aliases: Vec<&str> = network.aliases.iter().map(String::as_str).collect();
            registry.with_network(
                &network.name,
                &aliases,
                &network.plugin_ens_domain,
                network.deployment,
            )
        })
    }
}

impl DeploymentRegistry for StaticDeploymentRegistry {
    fn network_name_by_alias(&self, alias: &str) -> Option<String> {
        self.aliases.get(alias).cloned()
    }

    fn latest_deployment(&self, network: &str) -> Option<NetworkDeployment> {
        self.networks.get(network).and_then(|entry| entry.deployment)
    }

    fn plugin_ens_domain(&self, network: &str) -> Option<String> {
        self.networks
            .get(network)
            .map(|entry| entry.plugin_ens_domain.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    fn deployment() -> NetworkDeployment {
        NetworkDeployment {
            plugin_repo_base: Address::repeat_byte(1),
            plugin_ens_subdomain_registrar_proxy: Address::repeat_byte(2),
            management_dao_proxy: Address::repeat_byte(3),
        }
    }

    #[test]
    fn resolves_aliases_and_canonical_names() {
        let registry = StaticDeploymentRegistry::new().with_network(
            "mainnet",
            &["ethereum"],
            "plugin.dao.eth",
            Some(deployment()),
        );

        assert_eq!(registry.network_name_by_alias("ethereum").as_deref(), Some("mainnet"));
        assert_eq!(registry.network_name_by_alias("mainnet").as_deref(), Some("mainnet"));
        assert_eq!(registry.network_name_by_alias("goerli"), None);
        assert_eq!(registry.latest_deployment("mainnet"), Some(deployment()));
        assert_eq!(registry.plugin_ens_domain("mainnet").as_deref(), Some("plugin.dao.eth"));
    }

    #[test]
    fn known_network_without_deployment() {
        let registry =
            StaticDeploymentRegistry::new().with_network("holesky", &[], "plugin.dao.eth", None);
        assert_eq!(registry.network_name_by_alias("holesky").as_deref(), Some("holesky"));
        assert_eq!(registry.latest_deployment("holesky"), None);
    }
}
