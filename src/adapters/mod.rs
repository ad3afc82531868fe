//! Ledger adapter traits for governance transaction submission.
//!
//! Provides a single interface between the orchestrator and the network so
//! the demo flow can run against a live cluster or an in-memory stand-in.

use async_trait::async_trait;

use crate::error::Result;

pub mod solana;

use solana::{Instruction, Keypair, Pubkey, Signature};

/// Remote ledger capability consumed by the orchestrator.
///
/// Implementors own transport concerns (blockhashes, signing order,
/// confirmation). Every call is awaited before the next one is issued.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Balance of `owner` in lamports.
    async fn get_balance(&self, owner: &Pubkey) -> Result<u64>;

    /// Build, sign, submit and confirm a transaction.
    ///
    /// `payer` pays fees and signs first; `signers` are the additional
    /// keypairs the instructions require.
    ///
    /// # Returns
    /// The fee payer signature of the confirmed transaction
    async fn send_and_confirm(
        &self,
        instructions: &[Instruction],
        payer: &Keypair,
        signers: &[&Keypair],
    ) -> Result<Signature>;

    /// Raw data of `address`, or `None` when the account does not exist.
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>>;
}
