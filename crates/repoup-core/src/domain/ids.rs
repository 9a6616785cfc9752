//! Subgraph entity identifiers.
//!
//! インデクサが on-chain イベントをグラフに格納するときの決定的な ID。
//! 同じ入力からは常に同じ ID が得られます（content-addressable）。
//!
//! - DAO: アドレスの小文字 hex
//! - PluginInstallation: `keccak256(abi.encode(dao, plugin))`
//! - PluginPreparation: `<installation id>_<setup id>`
//! - PluginVersion: `<repo>_<release>_<build>`

use alloy_primitives::{Address, B256, keccak256};
use alloy_sol_types::SolValue;

/// DAO entity ID: lowercase `0x` hex of the DAO address.
pub fn dao_id(dao: Address) -> String {
    format!("{dao:#x}")
}

/// PluginInstallation entity ID.
///
/// `(address, address)` は静的タプルなので 64 バイトにエンコードされます。
pub fn plugin_installation_id(dao: Address, plugin: Address) -> B256 {
    keccak256((dao, plugin).abi_encode())
}

/// PluginPreparation entity ID.
pub fn plugin_preparation_id(dao: Address, plugin: Address, setup_id: B256) -> String {
    let installation_id = plugin_installation_id(dao, plugin);
    format!("{installation_id:#x}_{setup_id:#x}")
}

/// PluginVersion entity ID.
pub fn plugin_version_id(plugin_repo: &str, release: u8, build: u16) -> String {
    format!("{plugin_repo}_{release}_{build}")
}
