//! Publishing builds to a plugin repo and reading its version history.

use alloy_primitives::{Address, Bytes};

use crate::domain::{EventWithBlockNumber, UpgradeError, VersionCreated};
use crate::ports::{ChainClient, CreateVersionCall};

/// Publish a new build for `release` and return the `VersionCreated` event it emitted.
///
/// # Errors
/// `UpgradeError::EventLookupFailure` when the mined receipt carries no
/// `VersionCreated` event. The transaction is not resent.
pub async fn publish_build(
    chain: &dyn ChainClient,
    repo: Address,
    release: u8,
    plugin_setup: Address,
    build_metadata: Bytes,
    release_metadata: Bytes,
) -> Result<VersionCreated, UpgradeError> {
    let signer = chain.default_signer().await?;
    let receipt = chain
        .create_version(
            signer,
            repo,
            CreateVersionCall {
                release,
                plugin_setup,
                build_metadata,
                release_metadata,
            },
        )
        .await?;
    tracing::info!(tx_hash = %receipt.tx_hash, "creating build for release {release}");

    let created = receipt
        .version_created()
        .cloned()
        .ok_or(UpgradeError::EventLookupFailure {
            event: VersionCreated::NAME,
            tx_hash: receipt.tx_hash,
        })?;
    tracing::info!(
        release = created.release,
        build = created.build,
        plugin_setup = %created.plugin_setup,
        "created build {} for release {}",
        created.build,
        created.release
    );
    Ok(created)
}

/// All `VersionCreated` events of `repo`, oldest first.
pub async fn version_history(
    chain: &dyn ChainClient,
    repo: Address,
) -> Result<Vec<EventWithBlockNumber<VersionCreated>>, UpgradeError> {
    let mut events = chain.version_created_events(repo).await?;
    events.sort_by_key(|e| e.block_number);
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PermissionId, ProtocolVersion};
    use crate::impls::InMemoryChain;
    use alloy_primitives::address;

    const DEPLOYER: Address = address!("d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0");
    const REPO: Address = address!("0101010101010101010101010101010101010101");
    const SETUP: Address = address!("5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e");

    fn chain() -> InMemoryChain {
        InMemoryChain::builder(DEPLOYER)
            .contract(REPO, Some(ProtocolVersion::new(1, 3, 0)))
            .grant(REPO, DEPLOYER, PermissionId::maintainer())
            .build()
    }

    #[tokio::test]
    async fn publishing_returns_the_created_build() {
        let chain = chain();

        let created = publish_build(
            &chain,
            REPO,
            1,
            SETUP,
            Bytes::from_static(b"ipfs://build"),
            Bytes::from_static(b"ipfs://release"),
        )
        .await
        .unwrap();

        assert_eq!(created.release, 1);
        assert_eq!(created.build, 1);
        assert_eq!(created.plugin_setup, SETUP);
        assert_eq!(created.build_metadata, Bytes::from_static(b"ipfs://build"));
    }

    #[tokio::test]
    async fn missing_event_is_event_lookup_failure() {
        let chain = chain();
        chain.set_emit_events(false).await;

        let err = publish_build(&chain, REPO, 1, SETUP, Bytes::new(), Bytes::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            UpgradeError::EventLookupFailure { event: "VersionCreated", .. }
        ));
        // the build exists on chain even though the receipt lacked the event
        assert_eq!(version_history(&chain, REPO).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn history_lists_builds_in_block_order() {
        let chain = chain();
        for _ in 0..3 {
            publish_build(&chain, REPO, 1, SETUP, Bytes::new(), Bytes::new())
                .await
                .unwrap();
        }

        let history = version_history(&chain, REPO).await.unwrap();

        let builds: Vec<u16> = history.iter().map(|e| e.event.build).collect();
        assert_eq!(builds, vec![1, 2, 3]);
        assert!(history.windows(2).all(|w| w[0].block_number < w[1].block_number));
    }

    #[tokio::test]
    async fn publishing_without_maintainer_permission_fails() {
        let chain = InMemoryChain::builder(DEPLOYER)
            .contract(REPO, Some(ProtocolVersion::new(1, 3, 0)))
            .build();

        let err = publish_build(&chain, REPO, 1, SETUP, Bytes::new(), Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, UpgradeError::Chain(_)));
    }
}
