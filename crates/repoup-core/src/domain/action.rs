//! Upgrade actions: what the decision procedure tells the runner to do.
//!
//! `StageProposal` carries a [`ProposalAction`] whose JSON shape is the one
//! the management DAO tooling reads when a member turns it into a proposal.

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{SolCall, sol};
use serde::{Deserialize, Serialize};

use super::version::ProtocolVersion;

sol! {
    interface IPluginRepoUpgrade {
        function upgradeTo(address newImplementation) external;

        function upgradeToAndCall(address newImplementation, bytes memory data) external payable;

        function initializeFrom(uint8[3] calldata previousProtocolVersion, bytes calldata initData) external;
    }
}

/// A deployed proxy and the implementation it should point to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeTarget {
    pub proxy: Address,
    pub new_implementation: Address,
}

impl UpgradeTarget {
    pub fn new(proxy: Address, new_implementation: Address) -> Self {
        Self {
            proxy,
            new_implementation,
        }
    }
}

/// Payload for the post-upgrade initialization call. Empty means none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReInitData(Bytes);

impl ReInitData {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Calldata for `initializeFrom(previousProtocolVersion, initData)` on the new implementation.
    pub fn initialize_from(previous: ProtocolVersion, init_data: Bytes) -> Self {
        let call = IPluginRepoUpgrade::initializeFromCall {
            previousProtocolVersion: previous.as_array(),
            initData: init_data,
        };
        Self(Bytes::from(call.abi_encode()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &Bytes {
        &self.0
    }

    /// `None` for an empty payload.
    pub fn non_empty(&self) -> Option<&ReInitData> {
        (!self.is_empty()).then_some(self)
    }
}

impl From<Bytes> for ReInitData {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<Vec<u8>> for ReInitData {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

/// The call a proposal should make on the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProxyCall {
    UpgradeTo {
        #[serde(rename = "NewImplementation")]
        new_implementation: Address,
    },
    UpgradeToAndCall {
        #[serde(rename = "NewImplementation")]
        new_implementation: Address,
        #[serde(rename = "Data")]
        data: Bytes,
        #[serde(rename = "PayableAmount")]
        payable_amount: u64,
    },
}

impl ProxyCall {
    pub fn new_implementation(&self) -> Address {
        match self {
            ProxyCall::UpgradeTo { new_implementation }
            | ProxyCall::UpgradeToAndCall {
                new_implementation, ..
            } => *new_implementation,
        }
    }

    /// ABI calldata, for proposal tooling that wants raw bytes instead of the JSON form.
    pub fn calldata(&self) -> Bytes {
        let encoded = match self {
            ProxyCall::UpgradeTo { new_implementation } => IPluginRepoUpgrade::upgradeToCall {
                newImplementation: *new_implementation,
            }
            .abi_encode(),
            ProxyCall::UpgradeToAndCall {
                new_implementation,
                data,
                ..
            } => IPluginRepoUpgrade::upgradeToAndCallCall {
                newImplementation: *new_implementation,
                data: data.clone(),
            }
            .abi_encode(),
        };
        Bytes::from(encoded)
    }
}

/// Serializable action description for a governance proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalAction {
    pub to: Address,
    #[serde(flatten)]
    pub call: ProxyCall,
}

impl ProposalAction {
    pub fn upgrade(target: UpgradeTarget, reinit: &ReInitData) -> Self {
        let call = match reinit.non_empty() {
            None => ProxyCall::UpgradeTo {
                new_implementation: target.new_implementation,
            },
            Some(reinit) => ProxyCall::UpgradeToAndCall {
                new_implementation: target.new_implementation,
                data: reinit.as_bytes().clone(),
                payable_amount: 0,
            },
        };
        Self {
            to: target.proxy,
            call,
        }
    }
}

/// File contents handed to a management DAO member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalData {
    pub proposal_title: String,
    pub proposal_summary: String,
    pub proposal_description: String,
    pub actions: Vec<ProposalAction>,
}

impl ProposalData {
    pub fn repo_upgrade(ens_domain: &str, action: ProposalAction) -> Self {
        Self {
            proposal_title: format!("Upgrade the '{ens_domain}' plugin repo"),
            proposal_summary: format!(
                "Upgrades the '{ens_domain}' plugin repo at '{}' to the implementation at '{}'.",
                action.to,
                action.call.new_implementation()
            ),
            proposal_description: "Describe the changes to the 'PluginRepo' implementation."
                .to_string(),
            actions: vec![action],
        }
    }
}

/// Output of the decision procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeAction {
    /// Already at the target version; nothing to write.
    Skip { version: ProtocolVersion },

    /// `signer` holds the upgrade permission and sends the upgrade itself.
    DirectUpgrade {
        signer: Address,
        target: UpgradeTarget,
        reinit: Option<ReInitData>,
    },

    /// Nobody available may upgrade; hand the action to governance.
    StageProposal(ProposalAction),
}
