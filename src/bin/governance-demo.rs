//! Governance demo CLI.
//!
//! Creates a realm, a governance and a proposal, votes on it and prints the
//! proposal back. Without `SOLANA_PRIVATE_KEY` it runs in demo mode and sends
//! nothing.
//!
//! Usage:
//!   cargo run --bin governance-demo -- --cluster devnet --vote approve

use clap::Parser;
use tracing::{error, info};

use governance_demo::adapters::solana::{secret_from_env, RpcClient};
use governance_demo::config::Args;
use governance_demo::{logging, ProposalOrchestrator, VERSION};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    if let Err(e) = logging::init(&args.log_file, &args.log_level) {
        eprintln!("Failed to initialise logging: {}", e);
    }

    if let Err(e) = run(args).await {
        error!("Fatal error in main execution: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    info!("governance-demo v{}", VERSION);

    let config = args.into_config()?;
    let client = RpcClient::new(config.cluster.rpc_url())
        .with_confirmation_polling(
            config.max_confirmation_polls,
            governance_demo::adapters::solana::CONFIRMATION_POLL_INTERVAL,
        );

    let mut orchestrator = ProposalOrchestrator::new(client, config);
    let secret = secret_from_env();
    let summary = orchestrator.run(secret.as_deref().map(String::as_str)).await;

    if let Some(proposal) = summary.proposal {
        info!("Proposal address: {}", proposal);
    }
    info!(
        "Confirmed transactions: {}",
        orchestrator.signatures().len()
    );
    Ok(())
}
