//! Proposal account layout.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::adapters::solana::Pubkey;
use crate::error::{GovernanceDemoError, Result};
use super::instruction::{VoteThreshold, VoteType};

/// Leading account-type byte of a V2 proposal account.
pub const PROPOSAL_V2_ACCOUNT_TYPE: u8 = 14;

/// Lifecycle state of a proposal, enforced by the program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum ProposalState {
    Draft,
    SigningOff,
    Voting,
    Succeeded,
    Executing,
    Completed,
    Cancelled,
    Defeated,
    ExecutingWithErrors,
    Vetoed,
}

impl core::fmt::Display for ProposalState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Self::Draft => "Draft",
            Self::SigningOff => "SigningOff",
            Self::Voting => "Voting",
            Self::Succeeded => "Succeeded",
            Self::Executing => "Executing",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Defeated => "Defeated",
            Self::ExecutingWithErrors => "ExecutingWithErrors",
            Self::Vetoed => "Vetoed",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum OptionVoteResult {
    None,
    Succeeded,
    Defeated,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ProposalOption {
    pub label: String,
    pub vote_weight: u64,
    pub vote_result: OptionVoteResult,
    pub transactions_executed_count: u16,
    pub transactions_count: u16,
    pub transactions_next_index: u16,
}

/// V2 proposal account as stored by the program.
///
/// Decoding ignores any bytes after `veto_vote_weight`.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ProposalV2 {
    pub account_type: u8,
    pub governance: Pubkey,
    pub governing_token_mint: Pubkey,
    pub state: ProposalState,
    pub token_owner_record: Pubkey,
    pub signatories_count: u8,
    pub signatories_signed_off_count: u8,
    pub vote_type: VoteType,
    pub options: Vec<ProposalOption>,
    pub deny_vote_weight: Option<u64>,
    pub reserved1: u8,
    pub abstain_vote_weight: Option<u64>,
    pub start_voting_at: Option<i64>,
    pub draft_at: i64,
    pub signing_off_at: Option<i64>,
    pub voting_at: Option<i64>,
    pub voting_at_slot: Option<u64>,
    pub voting_completed_at: Option<i64>,
    pub executing_at: Option<i64>,
    pub closed_at: Option<i64>,
    pub execution_flags: u8,
    pub max_vote_weight: Option<u64>,
    pub max_voting_time: Option<u32>,
    pub vote_threshold: Option<VoteThreshold>,
    pub reserved: [u8; 64],
    pub name: String,
    pub description_link: String,
    pub veto_vote_weight: u64,
}

impl ProposalV2 {
    /// Decode raw account data.
    pub fn unpack(data: &[u8]) -> Result<Self> {
        match data.first() {
            Some(&PROPOSAL_V2_ACCOUNT_TYPE) => {}
            Some(other) => {
                return Err(GovernanceDemoError::Decode {
                    reason: format!("Account type {} is not a V2 proposal", other),
                });
            }
            None => {
                return Err(GovernanceDemoError::Decode {
                    reason: "Empty proposal account".to_string(),
                });
            }
        }

        let mut cursor = data;
        Self::deserialize(&mut cursor).map_err(|e| GovernanceDemoError::Decode {
            reason: format!("Malformed proposal account: {}", e),
        })
    }
}

/// Proposal fields surfaced to the operator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalDetails {
    pub address: Pubkey,
    pub name: String,
    pub description: String,
    pub state: ProposalState,
    pub governance: Pubkey,
    pub draft_at: i64,
    /// Unix seconds voting opened, if it has
    pub voting_at: Option<i64>,
    pub deny_vote_weight: Option<u64>,
    pub options: Vec<(String, u64)>,
}

impl ProposalDetails {
    pub fn from_account(address: Pubkey, proposal: ProposalV2) -> Self {
        Self {
            address,
            name: proposal.name,
            description: proposal.description_link,
            state: proposal.state,
            governance: proposal.governance,
            draft_at: proposal.draft_at,
            voting_at: proposal.voting_at,
            deny_vote_weight: proposal.deny_vote_weight,
            options: proposal
                .options
                .into_iter()
                .map(|o| (o.label, o.vote_weight))
                .collect(),
        }
    }

    /// Voting start as an RFC 3339 string, or "not started".
    pub fn voting_start(&self) -> String {
        self.voting_at
            .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
            .unwrap_or_else(|| "not started".to_string())
    }
}
