//! Key material for the governance demo.
//!
//! Keypairs use the 64-byte Solana layout (secret key followed by public key)
//! and are zeroized on drop.

use std::env;

use borsh::{BorshDeserialize, BorshSerialize};
use ed25519_dalek::{Signer, SigningKey};
use zeroize::Zeroizing;

use crate::error::{GovernanceDemoError, Result};

/// Environment variable for the signer private key (base58 encoded)
pub const ENV_PRIVATE_KEY: &str = "SOLANA_PRIVATE_KEY";

/// Ed25519 public key (32 bytes)
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize,
)]
pub struct Pubkey(pub [u8; 32]);

impl Pubkey {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn from_str(s: &str) -> Result<Self> {
        let bytes = bs58::decode(s).into_vec().map_err(|e| {
            GovernanceDemoError::InvalidInput {
                reason: format!("Invalid pubkey: {}", e),
            }
        })?;

        let arr: [u8; 32] = bytes.try_into().map_err(|_| GovernanceDemoError::InvalidInput {
            reason: "Pubkey must be 32 bytes".to_string(),
        })?;
        Ok(Self(arr))
    }
}

impl core::fmt::Display for Pubkey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", bs58::encode(&self.0).into_string())
    }
}

impl From<[u8; 32]> for Pubkey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Ed25519 keypair used to sign transactions.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a fresh keypair from the OS random source.
    pub fn new() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut rand::rngs::OsRng),
        }
    }

    /// Build a keypair from its 64-byte `secret || public` encoding.
    ///
    /// The public half must match the one derived from the secret.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 64 {
            return Err(GovernanceDemoError::InvalidInput {
                reason: format!("Keypair must be 64 bytes, got {}", bytes.len()),
            });
        }

        let mut raw = Zeroizing::new([0u8; 64]);
        raw.copy_from_slice(bytes);

        let signing_key = SigningKey::from_keypair_bytes(&raw).map_err(|e| {
            GovernanceDemoError::InvalidInput {
                reason: format!("Invalid keypair bytes: {}", e),
            }
        })?;

        Ok(Self { signing_key })
    }

    /// Parse a base58-encoded private key into a Keypair.
    pub fn from_base58(key: &str) -> Result<Self> {
        let bytes = Zeroizing::new(bs58::decode(key.trim()).into_vec().map_err(|e| {
            GovernanceDemoError::InvalidInput {
                reason: format!("Invalid base58 key: {}", e),
            }
        })?);

        Self::from_bytes(&bytes)
    }

    /// 64-byte `secret || public` encoding.
    pub fn to_bytes(&self) -> Zeroizing<[u8; 64]> {
        Zeroizing::new(self.signing_key.to_keypair_bytes())
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(&self.to_bytes()[..]).into_string()
    }

    pub fn pubkey(&self) -> Pubkey {
        Pubkey(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }
}

impl Default for Keypair {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Keypair").field("pubkey", &self.pubkey()).finish_non_exhaustive()
    }
}

/// Ed25519 transaction signature
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    pub fn new(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn from_str(s: &str) -> Result<Self> {
        let bytes = bs58::decode(s).into_vec().map_err(|e| {
            GovernanceDemoError::InvalidInput {
                reason: format!("Invalid signature: {}", e),
            }
        })?;

        let arr: [u8; 64] = bytes.try_into().map_err(|_| GovernanceDemoError::InvalidInput {
            reason: "Signature must be 64 bytes".to_string(),
        })?;
        Ok(Self(arr))
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self([0u8; 64])
    }
}

impl core::fmt::Display for Signature {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", bs58::encode(&self.0).into_string())
    }
}

/// Read the signer secret from the environment.
///
/// Unset and blank values both yield `None`.
pub fn secret_from_env() -> Option<Zeroizing<String>> {
    env::var(ENV_PRIVATE_KEY)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(Zeroizing::new)
}
