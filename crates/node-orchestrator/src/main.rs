//! # Clique-Net Orchestrator
//!
//! ```text
//! cn-orchestrator up --file net1.toml
//! cn-orchestrator add-node --network net1 --file signer2.toml
//! cn-orchestrator remove-node --network net1 --node signer2
//! cn-orchestrator status --network net1
//! cn-orchestrator down --network net1 --purge
//! ```
//!
//! Networks provisioned earlier are picked up from the data root on every
//! invocation, so later commands can name them (or fall back to the first
//! one registered).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use cn_04_container_runtime::DockerCli;
use cn_05_node_rpc::HttpRpcTransport;
use devnet_telemetry::{gather_metrics, init_telemetry, TelemetryConfig};
use node_orchestrator::{
    read_node_definition, ControlPlane, NetworkReport, NodeLifecycleOrchestrator,
    OrchestratorConfig,
};

/// Private Besu/Clique network orchestrator
#[derive(Parser, Debug)]
#[command(name = "cn-orchestrator")]
#[command(about = "Provision and manage private Besu/Clique test networks")]
struct Args {
    /// Orchestrator config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start (or resume) the network in a definition file
    Up {
        /// Network definition (.toml or .json)
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Add a node to a running network
    AddNode {
        #[arg(short, long)]
        network: Option<String>,
        /// Node definition (.toml or .json)
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Vote out (for signers) and remove a node
    RemoveNode {
        #[arg(short, long)]
        network: Option<String>,
        #[arg(long)]
        node: String,
    },
    /// Remove a network's containers
    Down {
        #[arg(short, long)]
        network: Option<String>,
        /// Also delete keys, genesis and address mappings
        #[arg(long)]
        purge: bool,
    },
    /// Container state and chain progress as JSON
    Status {
        #[arg(short, long)]
        network: Option<String>,
    },
    /// Prometheus metrics after a status refresh of every network
    Metrics,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut telemetry = TelemetryConfig::from_env();
    if args.verbose {
        telemetry = telemetry.with_log_level("debug");
    }
    init_telemetry(telemetry).context("Failed to initialize telemetry")?;

    let config = OrchestratorConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    info!(
        data_root = %config.data_root.display(),
        image = %config.besu_image,
        "Clique-Net orchestrator"
    );

    let runtime = Arc::new(DockerCli::new(config.docker_binary.clone()));
    let transport = Arc::new(HttpRpcTransport::new().context("Failed to build RPC client")?);
    let plane = ControlPlane::new(NodeLifecycleOrchestrator::new(config, runtime, transport));
    plane.load_persisted()?;

    match args.command {
        Command::Up { file } => {
            let report = plane
                .provision_file(&file)
                .await
                .with_context(|| format!("Failed to start network from {}", file.display()))?;
            print_report(&report);
        }
        Command::AddNode { network, file } => {
            let node = read_node_definition(&file)?;
            let report = plane.add_node(network.as_deref(), node).await?;
            println!(
                "{} {} {} {}",
                report.name,
                report.role,
                report.ip,
                report.state()
            );
        }
        Command::RemoveNode { network, node } => {
            let outcome = plane.remove_node(network.as_deref(), &node).await?;
            match outcome {
                Some(outcome) => println!("{} removed ({:?})", node, outcome),
                None => println!("{} removed", node),
            }
        }
        Command::Down { network, purge } => {
            plane.teardown(network.as_deref(), purge).await?;
        }
        Command::Status { network } => {
            let status = plane.status(network.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Metrics => {
            for name in plane.registry().names() {
                plane.status(Some(&name)).await?;
            }
            print!("{}", gather_metrics()?);
        }
    }

    Ok(())
}

fn print_report(report: &NetworkReport) {
    println!("network  {}", report.network);
    println!("bootnode {}", report.bootnode_enode);
    for node in &report.nodes {
        let address = node.address.map(|a| a.to_string()).unwrap_or_default();
        println!(
            "  {:<16} {:<8} {:<15} {:<42} {}{}",
            node.name,
            node.role,
            node.ip,
            address,
            node.state(),
            if node.reused { " (reused)" } else { "" }
        );
    }
}
