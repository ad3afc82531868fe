//! # governance-demo
//!
//! Walks an on-chain governance program through its basic lifecycle:
//! create a realm, create a governance inside it, open a proposal, vote on
//! it and read the proposal back.
//!
//! ## Features
//!
//! - **Demo Mode**: Without a signer every step is logged and skipped
//! - **Dependency Chain**: signer → realm → governance → proposal, each step
//!   runs only when its prerequisites exist
//! - **Local Failures**: A failed step is logged; the run continues
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use governance_demo::adapters::solana::{secret_from_env, RpcClient};
//! use governance_demo::config::{Cluster, DemoConfig};
//! use governance_demo::runtime::ProposalOrchestrator;
//!
//! # async fn demo() -> governance_demo::Result<()> {
//! let config = DemoConfig::new(Cluster::Devnet)?;
//! let client = RpcClient::new(config.cluster.rpc_url());
//! let mut orchestrator = ProposalOrchestrator::new(client, config);
//!
//! let secret = secret_from_env();
//! let summary = orchestrator.run(secret.as_deref().map(String::as_str)).await;
//! assert_eq!(summary.is_demo_mode(), secret.is_none());
//! # Ok(())
//! # }
//! ```
//!
//! ## Security
//!
//! - Secret key bytes are zeroized on drop
//! - The private key is read from the environment only, never logged

pub mod adapters;
pub mod config;
pub mod error;
pub mod governance;
pub mod logging;
pub mod runtime;

pub use adapters::LedgerClient;
pub use config::{Cluster, DemoConfig, VoteKind};
pub use error::{GovernanceDemoError, Result};
pub use runtime::{DemoSummary, ProposalOrchestrator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
