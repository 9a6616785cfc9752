//! Runner configuration (TOML).
//!
//! ```toml
//! network = "hardhat"
//! production_network = "sepolia"
//! ens_subdomain = "admin"
//! proposal_dir = "."
//!
//! [reinit]
//! init_data = "0x"
//!
//! [[networks]]
//! name = "sepolia"
//! aliases = ["ethereumSepolia"]
//! plugin_ens_domain = "plugin.dao.eth"
//!
//! [networks.deployment]
//! plugin_repo_base = "0x..."
//! plugin_ens_subdomain_registrar_proxy = "0x..."
//! management_dao_proxy = "0x..."
//! ```

use std::path::{Path, PathBuf};

use alloy_primitives::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Environment, NetworkDeployment, ProtocolVersion, ReInitData};

/// Environment variable that overrides `production_network`.
pub const NETWORK_NAME_ENV: &str = "NETWORK_NAME";

/// ENS subdomain of the Admin plugin repo.
pub const DEFAULT_ENS_SUBDOMAIN: &str = "admin";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub plugin_ens_domain: String,
    #[serde(default)]
    pub deployment: Option<NetworkDeployment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReInitConfig {
    /// Arguments passed to `initializeFrom` on the new implementation.
    #[serde(default)]
    pub init_data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Network the script runs on (`hardhat`, `sepolia`, ...).
    pub network: String,
    #[serde(default)]
    pub production_network: Option<String>,
    #[serde(default = "default_ens_subdomain")]
    pub ens_subdomain: String,
    #[serde(default = "default_proposal_dir")]
    pub proposal_dir: PathBuf,
    /// Without this table no re-initialization call is made.
    #[serde(default)]
    pub reinit: Option<ReInitConfig>,
    #[serde(default)]
    pub networks: Vec<NetworkConfig>,
}

fn default_ens_subdomain() -> String {
    DEFAULT_ENS_SUBDOMAIN.to_string()
}

fn default_proposal_dir() -> PathBuf {
    PathBuf::from(".")
}

impl RunnerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `NETWORK_NAME` from `lookup` (usually `std::env::var`).
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup(NETWORK_NAME_ENV).filter(|name| !name.is_empty()) {
            self.production_network = Some(name);
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.is_empty() {
            return Err(ConfigError::Validation("`network` must not be empty".into()));
        }
        if self.ens_subdomain.is_empty() {
            return Err(ConfigError::Validation(
                "`ens_subdomain` must not be empty".into(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for network in &self.networks {
            if !seen.insert(network.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "network '{}' is listed twice",
                    network.name
                )));
            }
        }
        Ok(())
    }

    pub fn environment(&self) -> Environment {
        let env = Environment::new(&self.network);
        match &self.production_network {
            Some(name) => env.with_production_network(name),
            None => env,
        }
    }

    /// Re-initialization payload for an upgrade away from `current`.
    pub fn reinit_data(&self, current: ProtocolVersion) -> ReInitData {
        match &self.reinit {
            Some(reinit) => ReInitData::initialize_from(current, reinit.init_data.clone()),
            None => ReInitData::empty(),
        }
    }
}
