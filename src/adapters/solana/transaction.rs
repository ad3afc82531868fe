//! Legacy transaction encoding.
//!
//! Compiles instructions into a legacy message (header, account keys,
//! recent blockhash, compiled instructions), signs it and serializes the
//! wire format accepted by `sendTransaction`.

use std::collections::BTreeMap;

use crate::error::{GovernanceDemoError, Result};
use super::wallet::{Keypair, Pubkey, Signature};

/// Largest serialized transaction a cluster accepts
pub const PACKET_DATA_SIZE: usize = 1232;

/// Account reference inside an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    pub fn new(pubkey: Pubkey, is_signer: bool) -> Self {
        Self { pubkey, is_signer, is_writable: true }
    }

    pub fn new_readonly(pubkey: Pubkey, is_signer: bool) -> Self {
        Self { pubkey, is_signer, is_writable: false }
    }
}

/// A single program invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

/// Legacy message with deduplicated, ordered account keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    pub account_keys: Vec<Pubkey>,
    pub recent_blockhash: [u8; 32],
    pub instructions: Vec<CompiledInstruction>,
}

#[derive(Clone, Copy, Default)]
struct KeyFlags {
    signer: bool,
    writable: bool,
    first_seen: usize,
}

impl Message {
    /// Compile instructions with `payer` as the first (writable, signing) key.
    ///
    /// Keys are ordered: writable signers, readonly signers, writable
    /// non-signers, readonly non-signers. Program ids are readonly non-signers
    /// unless they also appear with stronger flags.
    pub fn new(instructions: &[Instruction], payer: &Pubkey, recent_blockhash: [u8; 32]) -> Result<Self> {
        let mut flags: BTreeMap<Pubkey, KeyFlags> = BTreeMap::new();
        let mut order = 0usize;
        let mut touch = |key: Pubkey, signer: bool, writable: bool| {
            let entry = flags.entry(key).or_insert_with(|| {
                order += 1;
                KeyFlags { signer: false, writable: false, first_seen: order }
            });
            entry.signer |= signer;
            entry.writable |= writable;
        };

        touch(*payer, true, true);
        for ix in instructions {
            for meta in &ix.accounts {
                touch(meta.pubkey, meta.is_signer, meta.is_writable);
            }
            touch(ix.program_id, false, false);
        }

        let mut keys: Vec<(Pubkey, KeyFlags)> = flags.into_iter().collect();
        keys.sort_by_key(|(key, f)| {
            let class = match (f.signer, f.writable) {
                (true, true) => 0u8,
                (true, false) => 1,
                (false, true) => 2,
                (false, false) => 3,
            };
            // payer always leads
            let payer_rank = if key == payer { 0u8 } else { 1 };
            (payer_rank, class, f.first_seen)
        });

        if keys.len() > u8::MAX as usize {
            return Err(GovernanceDemoError::InvalidInput {
                reason: format!("Too many accounts in message: {}", keys.len()),
            });
        }

        let header = MessageHeader {
            num_required_signatures: keys.iter().filter(|(_, f)| f.signer).count() as u8,
            num_readonly_signed_accounts: keys.iter().filter(|(_, f)| f.signer && !f.writable).count() as u8,
            num_readonly_unsigned_accounts: keys.iter().filter(|(_, f)| !f.signer && !f.writable).count() as u8,
        };
        let account_keys: Vec<Pubkey> = keys.into_iter().map(|(k, _)| k).collect();

        let index_of = |key: &Pubkey| -> u8 {
            // every key was inserted above
            account_keys.iter().position(|k| k == key).unwrap_or_default() as u8
        };

        let compiled = instructions
            .iter()
            .map(|ix| CompiledInstruction {
                program_id_index: index_of(&ix.program_id),
                accounts: ix.accounts.iter().map(|m| index_of(&m.pubkey)).collect(),
                data: ix.data.clone(),
            })
            .collect();

        Ok(Self {
            header,
            account_keys,
            recent_blockhash,
            instructions: compiled,
        })
    }

    /// Signer keys in signature order.
    pub fn signer_keys(&self) -> &[Pubkey] {
        &self.account_keys[..self.header.num_required_signatures as usize]
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(256);
        out.push(self.header.num_required_signatures);
        out.push(self.header.num_readonly_signed_accounts);
        out.push(self.header.num_readonly_unsigned_accounts);

        encode_len(&mut out, self.account_keys.len())?;
        for key in &self.account_keys {
            out.extend_from_slice(key.as_bytes());
        }

        out.extend_from_slice(&self.recent_blockhash);

        encode_len(&mut out, self.instructions.len())?;
        for ix in &self.instructions {
            out.push(ix.program_id_index);
            encode_len(&mut out, ix.accounts.len())?;
            out.extend_from_slice(&ix.accounts);
            encode_len(&mut out, ix.data.len())?;
            out.extend_from_slice(&ix.data);
        }
        Ok(out)
    }
}

/// Signed transaction ready for submission.
#[derive(Clone, Debug)]
pub struct Transaction {
    pub signatures: Vec<Signature>,
    pub message: Message,
}

impl Transaction {
    /// Sign `message` with every required signer.
    ///
    /// Fails when a required signer is missing from `signers` or the
    /// result would not fit in [`PACKET_DATA_SIZE`].
    pub fn new_signed(message: Message, signers: &[&Keypair]) -> Result<Self> {
        let bytes = message.serialize()?;
        let signatures = message
            .signer_keys()
            .iter()
            .map(|key| {
                signers
                    .iter()
                    .find(|kp| kp.pubkey() == *key)
                    .map(|kp| kp.sign(&bytes))
                    .ok_or_else(|| GovernanceDemoError::InvalidInput {
                        reason: format!("Missing signer for {}", key),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let transaction = Self { signatures, message };
        transaction.serialize()?;
        Ok(transaction)
    }

    /// Wire format; rejects anything larger than [`PACKET_DATA_SIZE`].
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(64 * self.signatures.len() + 256);
        encode_len(&mut out, self.signatures.len())?;
        for sig in &self.signatures {
            out.extend_from_slice(sig.as_bytes());
        }
        out.extend_from_slice(&self.message.serialize()?);

        if out.len() > PACKET_DATA_SIZE {
            return Err(GovernanceDemoError::InvalidInput {
                reason: format!(
                    "Transaction is {} bytes, limit is {}",
                    out.len(),
                    PACKET_DATA_SIZE
                ),
            });
        }
        Ok(out)
    }
}

/// Compact-u16 length prefix.
fn encode_len(out: &mut Vec<u8>, len: usize) -> Result<()> {
    let mut rem = u16::try_from(len).map_err(|_| GovernanceDemoError::InvalidInput {
        reason: format!("Length {} does not fit a compact-u16 prefix", len),
    })?;
    loop {
        let mut byte = (rem & 0x7f) as u8;
        rem >>= 7;
        if rem == 0 {
            out.push(byte);
            break;
        }
        byte |= 0x80;
        out.push(byte);
    }
    Ok(())
}
