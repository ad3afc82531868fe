//! Error types for governance demo operations.
//!
//! Provides strongly-typed errors for key loading, RPC transport and account
//! decoding using `thiserror`.

use thiserror::Error;

/// Errors that can occur while driving the governance program.
#[derive(Debug, Error)]
pub enum GovernanceDemoError {
    /// Invalid input parameters (malformed keys, bad configuration)
    #[error("Invalid input: {reason}")]
    InvalidInput {
        reason: String,
    },
    /// Network/RPC transport error
    #[error("Network error: {reason}")]
    NetworkError {
        reason: String,
    },
    /// JSON-RPC error object returned by the node
    #[error("RPC error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
    },
    /// Fee payer cannot cover transaction fees
    #[error("Insufficient balance for transactions: {balance} lamports available, {required} required")]
    InsufficientBalance {
        balance: u64,
        required: u64,
    },
    /// Account or response data could not be decoded
    #[error("Decode error: {reason}")]
    Decode {
        reason: String,
    },
    /// Requested account does not exist on the cluster
    #[error("Account not found: {address}")]
    AccountNotFound {
        address: String,
    },
    /// Transaction was not confirmed within the polling window
    #[error("Transaction {signature} not confirmed after {attempts} status checks")]
    ConfirmationTimeout {
        signature: String,
        attempts: u32,
    },
    /// Transaction landed but the program rejected it
    #[error("Transaction {signature} failed: {reason}")]
    TransactionFailed {
        signature: String,
        reason: String,
    },
    /// File I/O Error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for governance demo operations.
pub type Result<T> = core::result::Result<T, GovernanceDemoError>;
