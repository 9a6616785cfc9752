//! ENS name hashing (EIP-137).

use alloy_primitives::{B256, keccak256};

/// `namehash(name)`; the empty name hashes to the zero node.
pub fn namehash(name: &str) -> B256 {
    if name.is_empty() {
        return B256::ZERO;
    }
    name.rsplit('.').fold(B256::ZERO, |node, label| {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(node.as_slice());
        buf[32..].copy_from_slice(keccak256(label.as_bytes()).as_slice());
        keccak256(buf)
    })
}

/// ENS domain of a plugin repo: `<subdomain>.<plugin ens domain>`.
pub fn plugin_repo_domain(subdomain: &str, plugin_ens_domain: &str) -> String {
    format!("{subdomain}.{plugin_ens_domain}")
}
