use std::path::PathBuf;
use std::sync::Arc;

use alloy_primitives::{Address, B256, address};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};

use repoup_core::app::UpgradeRunner;
use repoup_core::config::RunnerConfig;
use repoup_core::domain::ens::{namehash, plugin_repo_domain};
use repoup_core::domain::{PermissionId, ProtocolVersion, UpgradeStep, ids};
use repoup_core::impls::{InMemoryChain, JsonFileProposalSink, StaticDeploymentRegistry};
use repoup_core::ports::DeploymentRegistry;

/// Plugin repo upgrade tooling.
#[derive(Parser)]
#[command(name = "repoup")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the upgrade against an in-memory chain seeded from the config.
    Simulate {
        /// Path to the runner config (TOML).
        #[arg(short, long)]
        config: PathBuf,

        /// Protocol version of the deployed repo; omit for a repo without the getter.
        #[arg(long)]
        repo_version: Option<ProtocolVersion>,

        /// Protocol version of the latest implementation.
        #[arg(long, default_value = "1.3.0")]
        latest_version: ProtocolVersion,

        /// Who holds the upgrade permission on the repo.
        #[arg(long, value_enum, default_value_t = Upgrader::Deployer)]
        upgrader: Upgrader,

        /// Only run the skip pre-check.
        #[arg(long)]
        check: bool,
    },

    /// Apply the version gate to two protocol versions.
    Gate {
        current: ProtocolVersion,
        target: ProtocolVersion,
    },

    /// Derive subgraph entity IDs.
    #[command(subcommand)]
    Ids(IdCommands),
}

#[derive(Subcommand)]
enum IdCommands {
    Dao {
        dao: Address,
    },
    Installation {
        dao: Address,
        plugin: Address,
    },
    Preparation {
        dao: Address,
        plugin: Address,
        setup_id: B256,
    },
    Version {
        repo: String,
        release: u8,
        build: u16,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Upgrader {
    Deployer,
    ManagementDao,
    Nobody,
}

const SIM_DEPLOYER: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");
const SIM_REPO: Address = address!("00000000000000000000000000000000000a0001");
const SIM_REPO_IMPL: Address = address!("00000000000000000000000000000000000a0002");

async fn simulate(
    config: RunnerConfig,
    repo_version: Option<ProtocolVersion>,
    latest_version: ProtocolVersion,
    upgrader: Upgrader,
    check: bool,
) -> Result<()> {
    let registry = StaticDeploymentRegistry::from_config(&config.networks);
    let env = config.environment();

    // seed the chain with what the runner is going to look up
    let alias = env.production_network_name();
    let network = registry
        .network_name_by_alias(alias)
        .with_context(|| format!("unsupported network: {alias}"))?;
    let deployment = registry
        .latest_deployment(&network)
        .with_context(|| format!("deployments are not available on network {network}"))?;
    let plugin_ens_domain = registry
        .plugin_ens_domain(&network)
        .with_context(|| format!("no plugin ENS domain for network {network}"))?;
    let ens_domain = plugin_repo_domain(&config.ens_subdomain, &plugin_ens_domain);

    let mut builder = InMemoryChain::builder(SIM_DEPLOYER)
        .contract(SIM_REPO_IMPL, repo_version)
        .contract(deployment.plugin_repo_base, Some(latest_version))
        .contract(deployment.plugin_ens_subdomain_registrar_proxy, None)
        .contract(deployment.management_dao_proxy, None)
        .proxy(SIM_REPO, SIM_REPO_IMPL)
        .ens_record(
            deployment.plugin_ens_subdomain_registrar_proxy,
            namehash(&ens_domain),
            SIM_REPO,
        );
    builder = match upgrader {
        Upgrader::Deployer => builder.grant(SIM_REPO, SIM_DEPLOYER, PermissionId::upgrade_repo()),
        Upgrader::ManagementDao => builder.grant(
            SIM_REPO,
            deployment.management_dao_proxy,
            PermissionId::upgrade_repo(),
        ),
        Upgrader::Nobody => builder,
    };
    let chain = Arc::new(builder.build());

    let runner = UpgradeRunner::new(
        env,
        config.ens_subdomain.clone(),
        chain.clone(),
        Arc::new(registry),
        Arc::new(JsonFileProposalSink::new(&config.proposal_dir)),
    );
    let runner = match config.reinit.clone() {
        Some(_) => {
            let config = config.clone();
            runner.with_reinit(Box::new(move |current: ProtocolVersion| config.reinit_data(current)))
        }
        None => runner,
    };

    if check {
        let skip = runner.should_skip().await?;
        println!("{}", serde_json::json!({ "skip": skip }));
        return Ok(());
    }

    let outcome = runner.run().await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    tracing::debug!(writes = ?chain.writes().await, "simulation finished");
    Ok(())
}

fn gate(current: ProtocolVersion, target: ProtocolVersion) -> Result<()> {
    match current.upgrade_step(target)? {
        UpgradeStep::UpToDate => println!("{current} is up to date"),
        UpgradeStep::Upgrade { from, to } => println!("upgrade {from} -> {to}"),
    }
    Ok(())
}

fn derive_id(command: IdCommands) -> String {
    match command {
        IdCommands::Dao { dao } => ids::dao_id(dao),
        IdCommands::Installation { dao, plugin } => {
            format!("{:#x}", ids::plugin_installation_id(dao, plugin))
        }
        IdCommands::Preparation {
            dao,
            plugin,
            setup_id,
        } => ids::plugin_preparation_id(dao, plugin, setup_id),
        IdCommands::Version {
            repo,
            release,
            build,
        } => ids::plugin_version_id(&repo, release, build),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            config,
            repo_version,
            latest_version,
            upgrader,
            check,
        } => {
            let config = RunnerConfig::load(&config)?
                .with_env_overrides(|key| std::env::var(key).ok());
            if config.networks.is_empty() {
                bail!("config lists no networks");
            }
            simulate(config, repo_version, latest_version, upgrader, check).await
        }
        Commands::Gate { current, target } => gate(current, target),
        Commands::Ids(command) => {
            println!("{}", derive_id(command));
            Ok(())
        }
    }
}
