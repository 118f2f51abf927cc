//! EigenDA event indexer CLI.
//!
//! Fetches on-chain event logs from the EigenDA contract suite and
//! projects them into queryable JSON entities on disk.
//!
//! # Usage
//!
//! ```bash
//! # Sync mainnet using default public RPCs
//! eigenda-indexer sync --data-dir ./data
//!
//! # Sync a specific network
//! eigenda-indexer sync --data-dir ./data --network holesky
//!
//! # Sync with a custom RPC endpoint
//! eigenda-indexer sync --data-dir ./data --network holesky --rpc https://my-rpc.example.com
//!
//! # Include testnets and use a config file for extra addresses
//! eigenda-indexer sync --data-dir ./data --include-testnets --config config.toml
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use eigenda_indexer::{chains, config::Config, sync};

/// EigenDA on-chain event indexer.
#[derive(Debug, Parser)]
#[command(name = "eigenda-indexer", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch new events and project them into entity documents.
    Sync {
        /// Output directory for network data (e.g. `./data`).
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Sync only a specific network by name (`mainnet`, `holesky`, ...).
        /// If omitted, all mainnet networks are synced.
        #[arg(long)]
        network: Option<String>,

        /// Override the RPC endpoint for the target network.
        /// Only valid when `--network` is also specified.
        #[arg(long)]
        rpc: Option<String>,

        /// Path to a TOML config with RPC lists and address overrides.
        #[arg(long, default_value = "config.toml")]
        config: PathBuf,

        /// Include testnet networks in the sync.
        #[arg(long)]
        include_testnets: bool,
    },

    /// List all known network deployments.
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Sync {
            data_dir,
            network,
            rpc,
            config,
            include_testnets,
        } => cmd_sync(data_dir, network, rpc, config, include_testnets).await,
        Command::List => {
            cmd_list();
            Ok(())
        }
    }
}

/// Execute the `sync` subcommand.
async fn cmd_sync(
    data_dir: PathBuf,
    network_filter: Option<String>,
    rpc_override: Option<String>,
    config_path: PathBuf,
    include_testnets: bool,
) -> Result<()> {
    // Validate args: --rpc requires --network.
    if rpc_override.is_some() && network_filter.is_none() {
        bail!("--rpc requires --network to be specified");
    }

    let mut config = Config::load(&config_path)?;

    let targets: Vec<&chains::ChainSpec> = if let Some(name) = network_filter {
        let spec =
            chains::by_name(&name).with_context(|| format!("unknown network {name:?}"))?;
        if let Some(rpc) = rpc_override {
            config.networks.entry(name).or_default().rpcs = vec![rpc];
        }
        vec![spec]
    } else {
        chains::ALL
            .iter()
            .filter(|c| include_testnets || !c.is_testnet)
            .collect()
    };

    tracing::info!(
        networks = targets.len(),
        data_dir = %data_dir.display(),
        "starting sync"
    );

    let mut success = 0u32;
    let mut failed = 0u32;

    for spec in &targets {
        match sync::sync_network(spec, &config, &data_dir).await {
            Ok(()) => {
                success += 1;
                tracing::info!(network = spec.name, "sync complete");
            }
            Err(e) => {
                failed += 1;
                tracing::error!(network = spec.name, error = %e, "sync failed");
            }
        }
    }

    tracing::info!(success, failed, "sync finished");

    if failed > 0 {
        bail!("{failed} network(s) failed to sync");
    }

    Ok(())
}

/// Execute the `list` subcommand.
#[allow(clippy::print_stdout)]
fn cmd_list() {
    println!(
        "{:<12} {:<10} {:<8} {:<14} RPC",
        "Network", "Chain ID", "Type", "Start Block"
    );
    println!("{}", "-".repeat(90));

    for spec in chains::ALL {
        let net_type = if spec.is_testnet { "test" } else { "main" };
        println!(
            "{:<12} {:<10} {:<8} {:<14} {}",
            spec.name, spec.chain_id, net_type, spec.start_block, spec.default_rpc,
        );
    }
}
