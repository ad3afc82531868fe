//! Client bindings for the on-chain governance program.
//!
//! The program owns realms, governances, proposals and vote tallies; this
//! module only encodes requests to it and decodes the proposal account.

pub mod instruction;
pub mod state;

pub use instruction::{
    cast_vote, create_governance, create_proposal, create_realm, CastVoteAccounts,
    CreateGovernanceAccounts, CreateProposalAccounts, CreateRealmAccounts, GovernanceConfig,
    ProposalContent, RealmConfigArgs, Vote, VoteThreshold,
};
pub use state::{ProposalDetails, ProposalState, ProposalV2};

use crate::adapters::solana::Pubkey;
use crate::adapters::LedgerClient;
use crate::error::{GovernanceDemoError, Result};

/// Governance program deployed on devnet and mainnet-beta
pub const GOVERNANCE_PROGRAM_ID: &str = "GovER5Lthms3bLBqWub97yVrMmEogzX7xNjdXpPPCVZw";

/// SPL token program
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// System program (all-zero address)
pub fn system_program_id() -> Pubkey {
    Pubkey::new([0u8; 32])
}

pub fn token_program_id() -> Result<Pubkey> {
    Pubkey::from_str(TOKEN_PROGRAM_ID)
}

pub fn default_program_id() -> Result<Pubkey> {
    Pubkey::from_str(GOVERNANCE_PROGRAM_ID)
}

/// Fetch and decode the proposal stored at `address`.
pub async fn fetch_proposal<C>(client: &C, address: &Pubkey) -> Result<ProposalDetails>
where
    C: LedgerClient + ?Sized,
{
    let data = client
        .get_account_data(address)
        .await?
        .ok_or_else(|| GovernanceDemoError::AccountNotFound {
            address: address.to_string(),
        })?;

    let proposal = ProposalV2::unpack(&data)?;
    Ok(ProposalDetails::from_account(*address, proposal))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_ids_parse() {
        assert!(default_program_id().is_ok());
        let token = token_program_id().unwrap();
        assert_eq!(token.to_string(), TOKEN_PROGRAM_ID);
        assert_eq!(system_program_id().to_string(), "11111111111111111111111111111111");
    }
}
