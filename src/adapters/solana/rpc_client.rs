//! JSON-RPC client for a Solana cluster.
//!
//! Speaks the HTTP JSON-RPC API directly: balances, blockhashes, transaction
//! submission with status polling, and raw account reads. Every query uses
//! the configured commitment (`confirmed` by default).

#![cfg(feature = "solana-devnet")]

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::adapters::LedgerClient;
use crate::error::{GovernanceDemoError, Result};
use super::transaction::{Instruction, Message, Transaction};
use super::wallet::{Keypair, Pubkey, Signature};
use super::{CONFIRMATION_POLL_INTERVAL, MAX_CONFIRMATION_POLLS};

/// Commitment level attached to RPC queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CommitmentLevel {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl CommitmentLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
        }
    }

    /// Whether a reported `confirmationStatus` satisfies this level.
    fn is_reached_by(&self, status: &str) -> bool {
        let rank = |s: &str| match s {
            "processed" => 0,
            "confirmed" => 1,
            "finalized" => 2,
            _ => -1,
        };
        rank(status) >= rank(self.as_str())
    }
}

#[derive(Deserialize)]
struct RpcEnvelope {
    result: Option<Value>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Deserialize)]
struct BlockhashValue {
    blockhash: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureStatus {
    confirmation_status: Option<String>,
    err: Option<Value>,
}

#[derive(Deserialize)]
struct AccountValue {
    data: (String, String),
}

/// HTTP JSON-RPC client.
pub struct RpcClient {
    http_client: reqwest::Client,
    rpc_url: String,
    commitment: CommitmentLevel,
    max_confirmation_polls: u32,
    poll_interval: Duration,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Create a client for `rpc_url` with `confirmed` commitment.
    pub fn new(rpc_url: &str) -> Self {
        Self::new_with_commitment(rpc_url, CommitmentLevel::Confirmed)
    }

    pub fn new_with_commitment(rpc_url: &str, commitment: CommitmentLevel) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            rpc_url: rpc_url.to_string(),
            commitment,
            max_confirmation_polls: MAX_CONFIRMATION_POLLS,
            poll_interval: CONFIRMATION_POLL_INTERVAL,
            next_id: AtomicU64::new(1),
        }
    }

    /// Override the confirmation polling window.
    pub fn with_confirmation_polling(mut self, max_polls: u32, interval: Duration) -> Self {
        self.max_confirmation_polls = max_polls.max(1);
        self.poll_interval = interval;
        self
    }

    fn commitment_config(&self) -> Value {
        serde_json::json!({ "commitment": self.commitment.as_str() })
    }

    /// Issue one JSON-RPC request and decode its `result`.
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });

        debug!(method, url = %self.rpc_url, "rpc request");

        let response = self.http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| GovernanceDemoError::NetworkError {
                reason: format!("{} request failed: {}", method, e),
            })?;

        let envelope: RpcEnvelope = response.json().await.map_err(|e| {
            GovernanceDemoError::NetworkError {
                reason: format!("Failed to parse {} response: {}", method, e),
            }
        })?;

        if let Some(error) = envelope.error {
            return Err(GovernanceDemoError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        let result = envelope.result.ok_or_else(|| GovernanceDemoError::NetworkError {
            reason: format!("Invalid {} response: missing result", method),
        })?;

        serde_json::from_value(result).map_err(|e| GovernanceDemoError::Decode {
            reason: format!("Unexpected {} result: {}", method, e),
        })
    }

    /// Get current SOL balance for a wallet, in lamports.
    pub async fn get_balance(&self, wallet: &Pubkey) -> Result<u64> {
        let res: WithContext<u64> = self
            .call("getBalance", serde_json::json!([wallet.to_string(), self.commitment_config()]))
            .await?;
        Ok(res.value)
    }

    pub async fn get_latest_blockhash(&self) -> Result<[u8; 32]> {
        let res: WithContext<BlockhashValue> = self
            .call("getLatestBlockhash", serde_json::json!([self.commitment_config()]))
            .await?;

        let bytes = bs58::decode(&res.value.blockhash).into_vec().map_err(|e| {
            GovernanceDemoError::Decode {
                reason: format!("Invalid blockhash: {}", e),
            }
        })?;
        bytes.try_into().map_err(|_| GovernanceDemoError::Decode {
            reason: "Blockhash must be 32 bytes".to_string(),
        })
    }

    /// Submit a signed transaction without waiting for confirmation.
    pub async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(transaction.serialize()?);
        let sig_str: String = self
            .call(
                "sendTransaction",
                serde_json::json!([encoded, {
                    "encoding": "base64",
                    "preflightCommitment": self.commitment.as_str(),
                }]),
            )
            .await?;

        Signature::from_str(&sig_str)
    }

    /// Confirm a transaction by polling for status.
    pub async fn confirm_transaction(&self, signature: &Signature) -> Result<()> {
        let params = serde_json::json!([[signature.to_string()]]);

        for attempt in 0..self.max_confirmation_polls {
            let res: WithContext<Vec<Option<SignatureStatus>>> =
                self.call("getSignatureStatuses", params.clone()).await?;

            if let Some(Some(status)) = res.value.into_iter().next() {
                if let Some(err) = status.err.filter(|e| !e.is_null()) {
                    return Err(GovernanceDemoError::TransactionFailed {
                        signature: signature.to_string(),
                        reason: err.to_string(),
                    });
                }
                if status
                    .confirmation_status
                    .as_deref()
                    .is_some_and(|s| self.commitment.is_reached_by(s))
                {
                    return Ok(());
                }
            }

            if attempt + 1 < self.max_confirmation_polls {
                tokio::time::sleep(self.poll_interval).await;
            }
        }

        Err(GovernanceDemoError::ConfirmationTimeout {
            signature: signature.to_string(),
            attempts: self.max_confirmation_polls,
        })
    }

    /// Raw account data, or `None` when the account does not exist.
    pub async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        let res: WithContext<Option<AccountValue>> = self
            .call(
                "getAccountInfo",
                serde_json::json!([address.to_string(), {
                    "encoding": "base64",
                    "commitment": self.commitment.as_str(),
                }]),
            )
            .await?;

        let Some(account) = res.value else {
            return Ok(None);
        };

        let (data, encoding) = account.data;
        if encoding != "base64" {
            return Err(GovernanceDemoError::Decode {
                reason: format!("Unexpected account encoding: {}", encoding),
            });
        }

        base64::engine::general_purpose::STANDARD
            .decode(data)
            .map(Some)
            .map_err(|e| GovernanceDemoError::Decode {
                reason: format!("Invalid account data: {}", e),
            })
    }
}

#[async_trait]
impl LedgerClient for RpcClient {
    async fn get_balance(&self, owner: &Pubkey) -> Result<u64> {
        RpcClient::get_balance(self, owner).await
    }

    async fn send_and_confirm(
        &self,
        instructions: &[Instruction],
        payer: &Keypair,
        signers: &[&Keypair],
    ) -> Result<Signature> {
        let blockhash = self.get_latest_blockhash().await?;
        let message = Message::new(instructions, &payer.pubkey(), blockhash)?;

        let mut all_signers: Vec<&Keypair> = Vec::with_capacity(signers.len() + 1);
        all_signers.push(payer);
        all_signers.extend_from_slice(signers);
        let transaction = Transaction::new_signed(message, &all_signers)?;

        let signature = self.send_transaction(&transaction).await?;
        debug!(%signature, "transaction submitted, awaiting confirmation");
        self.confirm_transaction(&signature).await?;
        Ok(signature)
    }

    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        RpcClient::get_account_data(self, address).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = RpcClient::new("https://api.devnet.solana.com");
        assert_eq!(client.rpc_url, "https://api.devnet.solana.com");
        assert_eq!(client.commitment, CommitmentLevel::Confirmed);
    }

    #[test]
    fn test_commitment_ordering() {
        let confirmed = CommitmentLevel::Confirmed;
        assert!(!confirmed.is_reached_by("processed"));
        assert!(confirmed.is_reached_by("confirmed"));
        assert!(confirmed.is_reached_by("finalized"));
        assert!(!CommitmentLevel::Finalized.is_reached_by("confirmed"));
    }

    #[test]
    fn test_polling_floor() {
        let client = RpcClient::new("http://localhost:8899")
            .with_confirmation_polling(0, Duration::from_millis(1));
        assert_eq!(client.max_confirmation_polls, 1);
    }
}
