//! Solana cluster adapter module.
//!
//! Key material, legacy transaction encoding and the JSON-RPC client used to
//! reach the governance program.

mod wallet;
mod transaction;
#[cfg(feature = "solana-devnet")]
mod rpc_client;

pub use wallet::{secret_from_env, Keypair, Pubkey, Signature, ENV_PRIVATE_KEY};
pub use transaction::{
    AccountMeta, CompiledInstruction, Instruction, Message, MessageHeader, Transaction,
    PACKET_DATA_SIZE,
};
#[cfg(feature = "solana-devnet")]
pub use rpc_client::{CommitmentLevel, RpcClient};

use std::time::Duration;

/// Devnet RPC endpoint
pub const DEVNET_RPC_URL: &str = "https://api.devnet.solana.com";

/// Testnet RPC endpoint
pub const TESTNET_RPC_URL: &str = "https://api.testnet.solana.com";

/// Mainnet-beta RPC endpoint
pub const MAINNET_BETA_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Local test validator RPC endpoint
pub const LOCALNET_RPC_URL: &str = "http://127.0.0.1:8899";

/// Lamports per SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Status checks before a submitted transaction is reported as unconfirmed
pub const MAX_CONFIRMATION_POLLS: u32 = 30;

/// Delay between status checks
pub const CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Render lamports as a SOL amount.
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}
