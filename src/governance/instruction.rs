//! Instruction builders for the governance program.
//!
//! Each builder borsh-encodes its arguments behind the program's one-byte
//! instruction index and lists the accounts the program expects. Realm,
//! governance and proposal accounts are freshly generated keypairs and must
//! sign the transaction that creates them.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::adapters::solana::{AccountMeta, Instruction, Pubkey};
use crate::error::{GovernanceDemoError, Result};
use super::{system_program_id, token_program_id};

/// Instruction indices understood by the program.
pub mod index {
    pub const CREATE_REALM: u8 = 0;
    pub const CREATE_GOVERNANCE: u8 = 4;
    pub const CREATE_PROPOSAL: u8 = 6;
    pub const CAST_VOTE: u8 = 13;
}

/// Denominator of `MintMaxVoterWeightSource::SupplyFraction` (100%).
pub const FULL_SUPPLY_FRACTION: u64 = 10_000_000_000;

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum MintMaxVoterWeightSource {
    /// Fraction of the mint supply, scaled by `FULL_SUPPLY_FRACTION`
    SupplyFraction(u64),
    Absolute(u64),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum GoverningTokenType {
    #[default]
    Liquid,
    Membership,
    Dormant,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct GoverningTokenConfigArgs {
    pub use_voter_weight_addin: bool,
    pub use_max_voter_weight_addin: bool,
    pub token_type: GoverningTokenType,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct RealmConfigArgs {
    pub use_council_mint: bool,
    pub min_community_weight_to_create_governance: u64,
    pub community_mint_max_voter_weight_source: MintMaxVoterWeightSource,
    pub community_token_config_args: GoverningTokenConfigArgs,
    pub council_token_config_args: GoverningTokenConfigArgs,
}

impl RealmConfigArgs {
    /// Community-only realm where the full mint supply counts as max weight.
    pub fn community(min_community_weight_to_create_governance: u64) -> Self {
        Self {
            use_council_mint: false,
            min_community_weight_to_create_governance,
            community_mint_max_voter_weight_source: MintMaxVoterWeightSource::SupplyFraction(
                FULL_SUPPLY_FRACTION,
            ),
            community_token_config_args: GoverningTokenConfigArgs::default(),
            council_token_config_args: GoverningTokenConfigArgs::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum VoteThreshold {
    YesVotePercentage(u8),
    QuorumPercentage(u8),
    Disabled,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum VoteTipping {
    Strict,
    Early,
    Disabled,
}

/// Voting rules attached to a governance account.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct GovernanceConfig {
    pub community_vote_threshold: VoteThreshold,
    pub min_community_weight_to_create_proposal: u64,
    /// Seconds between a proposal passing and its transactions executing
    pub transactions_hold_up_time: u32,
    /// Seconds a proposal stays open for voting
    pub voting_base_time: u32,
    pub community_vote_tipping: VoteTipping,
    pub council_vote_threshold: VoteThreshold,
    pub council_veto_vote_threshold: VoteThreshold,
    pub min_council_weight_to_create_proposal: u64,
    pub council_vote_tipping: VoteTipping,
    pub community_veto_vote_threshold: VoteThreshold,
    pub voting_cool_off_time: u32,
    pub deposit_exempt_proposal_count: u8,
}

impl GovernanceConfig {
    /// Community-only rules: `yes_pct` of the vote passes a proposal, the
    /// council cannot vote or veto.
    pub fn community_yes_threshold(
        yes_pct: u8,
        min_community_weight_to_create_proposal: u64,
        voting_base_time: u32,
    ) -> Self {
        Self {
            community_vote_threshold: VoteThreshold::YesVotePercentage(yes_pct),
            min_community_weight_to_create_proposal,
            transactions_hold_up_time: 0,
            voting_base_time,
            community_vote_tipping: VoteTipping::Strict,
            council_vote_threshold: VoteThreshold::Disabled,
            council_veto_vote_threshold: VoteThreshold::Disabled,
            min_council_weight_to_create_proposal: u64::MAX,
            council_vote_tipping: VoteTipping::Disabled,
            community_veto_vote_threshold: VoteThreshold::Disabled,
            voting_cool_off_time: 0,
            deposit_exempt_proposal_count: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum MultiChoiceType {
    FullWeight,
    Weighted,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum VoteType {
    SingleChoice,
    MultiChoice {
        choice_type: MultiChoiceType,
        min_voter_options: u8,
        max_voter_options: u8,
        max_winning_options: u8,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct VoteChoice {
    pub rank: u8,
    pub weight_percentage: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum Vote {
    Approve(Vec<VoteChoice>),
    Deny,
    Abstain,
    Veto,
}

impl Vote {
    /// Full-weight approval of the single option.
    pub fn approve() -> Self {
        Vote::Approve(vec![VoteChoice { rank: 0, weight_percentage: 100 }])
    }
}

#[derive(BorshSerialize)]
struct CreateRealmArgs<'a> {
    name: &'a str,
    config_args: &'a RealmConfigArgs,
}

#[derive(BorshSerialize)]
struct CreateProposalArgs<'a> {
    name: &'a str,
    description_link: &'a str,
    vote_type: &'a VoteType,
    options: &'a [String],
    use_deny_option: bool,
    proposal_seed: &'a Pubkey,
}

fn encode<T: BorshSerialize>(index: u8, args: &T) -> Result<Vec<u8>> {
    let mut data = vec![index];
    borsh::to_writer(&mut data, args).map_err(|e| GovernanceDemoError::InvalidInput {
        reason: format!("Failed to encode instruction {}: {}", index, e),
    })?;
    Ok(data)
}

/// Accounts for [`create_realm`].
pub struct CreateRealmAccounts<'a> {
    pub realm: &'a Pubkey,
    pub realm_authority: &'a Pubkey,
    pub community_mint: &'a Pubkey,
    pub payer: &'a Pubkey,
}

/// Create a realm named `name` governed by `community_mint`.
///
/// # Accounts expected
///
/// 0. `[writable, signer]` realm
/// 1. `[]` realm authority
/// 2. `[]` community token mint
/// 3. `[writable, signer]` payer
/// 4. `[]` system program
/// 5. `[]` token program
pub fn create_realm(
    program_id: &Pubkey,
    accounts: CreateRealmAccounts<'_>,
    name: &str,
    config_args: &RealmConfigArgs,
) -> Result<Instruction> {
    if name.trim().is_empty() {
        return Err(GovernanceDemoError::InvalidInput {
            reason: "Realm name must not be empty".to_string(),
        });
    }

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*accounts.realm, true),
            AccountMeta::new_readonly(*accounts.realm_authority, false),
            AccountMeta::new_readonly(*accounts.community_mint, false),
            AccountMeta::new(*accounts.payer, true),
            AccountMeta::new_readonly(system_program_id(), false),
            AccountMeta::new_readonly(token_program_id()?, false),
        ],
        data: encode(index::CREATE_REALM, &CreateRealmArgs { name, config_args })?,
    })
}

/// Accounts for [`create_governance`].
pub struct CreateGovernanceAccounts<'a> {
    pub realm: &'a Pubkey,
    pub governance: &'a Pubkey,
    pub token_owner_record: &'a Pubkey,
    pub payer: &'a Pubkey,
    pub governance_authority: &'a Pubkey,
}

/// Create a governance inside `realm` with the given voting rules.
///
/// # Accounts expected
///
/// 0. `[]` realm
/// 1. `[writable, signer]` governance
/// 2. `[]` creator's token owner record
/// 3. `[writable, signer]` payer
/// 4. `[]` system program
/// 5. `[signer]` governance authority
pub fn create_governance(
    program_id: &Pubkey,
    accounts: CreateGovernanceAccounts<'_>,
    config: &GovernanceConfig,
) -> Result<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*accounts.realm, false),
            AccountMeta::new(*accounts.governance, true),
            AccountMeta::new_readonly(*accounts.token_owner_record, false),
            AccountMeta::new(*accounts.payer, true),
            AccountMeta::new_readonly(system_program_id(), false),
            AccountMeta::new_readonly(*accounts.governance_authority, true),
        ],
        data: encode(index::CREATE_GOVERNANCE, config)?,
    })
}

/// Accounts for [`create_proposal`].
pub struct CreateProposalAccounts<'a> {
    pub realm: &'a Pubkey,
    pub proposal: &'a Pubkey,
    pub governance: &'a Pubkey,
    pub proposal_owner_record: &'a Pubkey,
    pub governing_token_mint: &'a Pubkey,
    pub governance_authority: &'a Pubkey,
    pub payer: &'a Pubkey,
}

/// Proposal contents for [`create_proposal`].
pub struct ProposalContent<'a> {
    pub name: &'a str,
    pub description_link: &'a str,
    pub vote_type: VoteType,
    pub options: Vec<String>,
    pub use_deny_option: bool,
}

impl<'a> ProposalContent<'a> {
    /// Single-choice yes/no proposal.
    pub fn yes_no(name: &'a str, description_link: &'a str) -> Self {
        Self {
            name,
            description_link,
            vote_type: VoteType::SingleChoice,
            options: vec!["Approve".to_string()],
            use_deny_option: true,
        }
    }
}

/// Create a proposal in Draft state under `governance`.
///
/// # Accounts expected
///
/// 0. `[]` realm
/// 1. `[writable, signer]` proposal
/// 2. `[writable]` governance
/// 3. `[writable]` proposal owner's token owner record
/// 4. `[writable]` governing token mint
/// 5. `[signer]` governance authority
/// 6. `[writable, signer]` payer
/// 7. `[]` system program
pub fn create_proposal(
    program_id: &Pubkey,
    accounts: CreateProposalAccounts<'_>,
    content: &ProposalContent<'_>,
) -> Result<Instruction> {
    if content.name.trim().is_empty() {
        return Err(GovernanceDemoError::InvalidInput {
            reason: "Proposal name must not be empty".to_string(),
        });
    }
    if content.options.is_empty() {
        return Err(GovernanceDemoError::InvalidInput {
            reason: "Proposal needs at least one option".to_string(),
        });
    }

    let args = CreateProposalArgs {
        name: content.name,
        description_link: content.description_link,
        vote_type: &content.vote_type,
        options: &content.options,
        use_deny_option: content.use_deny_option,
        proposal_seed: accounts.proposal,
    };

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*accounts.realm, false),
            AccountMeta::new(*accounts.proposal, true),
            AccountMeta::new(*accounts.governance, false),
            AccountMeta::new(*accounts.proposal_owner_record, false),
            AccountMeta::new(*accounts.governing_token_mint, false),
            AccountMeta::new_readonly(*accounts.governance_authority, true),
            AccountMeta::new(*accounts.payer, true),
            AccountMeta::new_readonly(system_program_id(), false),
        ],
        data: encode(index::CREATE_PROPOSAL, &args)?,
    })
}

/// Accounts for [`cast_vote`].
pub struct CastVoteAccounts<'a> {
    pub realm: &'a Pubkey,
    pub governance: &'a Pubkey,
    pub proposal: &'a Pubkey,
    pub proposal_owner_record: &'a Pubkey,
    pub voter_token_owner_record: &'a Pubkey,
    pub governance_authority: &'a Pubkey,
    pub governing_token_mint: &'a Pubkey,
    pub payer: &'a Pubkey,
}

/// Cast `vote` on `proposal`.
///
/// # Accounts expected
///
/// 0. `[]` realm
/// 1. `[writable]` governance
/// 2. `[writable]` proposal
/// 3. `[writable]` proposal owner's token owner record
/// 4. `[writable]` voter's token owner record
/// 5. `[signer]` governance authority
/// 6. `[]` governing token mint
/// 7. `[writable, signer]` payer
/// 8. `[]` system program
pub fn cast_vote(
    program_id: &Pubkey,
    accounts: CastVoteAccounts<'_>,
    vote: &Vote,
) -> Result<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*accounts.realm, false),
            AccountMeta::new(*accounts.governance, false),
            AccountMeta::new(*accounts.proposal, false),
            AccountMeta::new(*accounts.proposal_owner_record, false),
            AccountMeta::new(*accounts.voter_token_owner_record, false),
            AccountMeta::new_readonly(*accounts.governance_authority, true),
            AccountMeta::new_readonly(*accounts.governing_token_mint, false),
            AccountMeta::new(*accounts.payer, true),
            AccountMeta::new_readonly(system_program_id(), false),
        ],
        data: encode(index::CAST_VOTE, vote)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program() -> Pubkey {
        Pubkey::new([0x47; 32])
    }

    #[test]
    fn test_create_realm_encoding() {
        let realm = Pubkey::new([1; 32]);
        let payer = Pubkey::new([2; 32]);
        let mint = Pubkey::new([3; 32]);
        let config = RealmConfigArgs::community(0);

        let ix = create_realm(
            &program(),
            CreateRealmAccounts { realm: &realm, realm_authority: &payer, community_mint: &mint, payer: &payer },
            "DemoRealm",
            &config,
        )
        .unwrap();

        assert_eq!(ix.data[0], index::CREATE_REALM);
        // borsh string: u32 length then bytes
        assert_eq!(&ix.data[1..5], &9u32.to_le_bytes());
        assert_eq!(&ix.data[5..14], b"DemoRealm");
        assert_eq!(RealmConfigArgs::try_from_slice(&ix.data[14..]).unwrap(), config);

        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert_eq!(ix.accounts[3].pubkey, payer);
        assert_eq!(ix.accounts[4].pubkey, system_program_id());
    }

    #[test]
    fn test_create_realm_rejects_blank_name() {
        let k = Pubkey::new([1; 32]);
        let res = create_realm(
            &program(),
            CreateRealmAccounts { realm: &k, realm_authority: &k, community_mint: &k, payer: &k },
            "  ",
            &RealmConfigArgs::community(0),
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_governance_config_threshold_roundtrip() {
        let realm = Pubkey::new([1; 32]);
        let governance = Pubkey::new([4; 32]);
        let payer = Pubkey::new([2; 32]);
        let config = GovernanceConfig::community_yes_threshold(60, 0, 3 * 24 * 3600);

        let ix = create_governance(
            &program(),
            CreateGovernanceAccounts {
                realm: &realm,
                governance: &governance,
                token_owner_record: &payer,
                payer: &payer,
                governance_authority: &payer,
            },
            &config,
        )
        .unwrap();

        assert_eq!(ix.data[0], index::CREATE_GOVERNANCE);
        // YesVotePercentage variant then the percentage
        assert_eq!(&ix.data[1..3], &[0, 60]);
        let decoded = GovernanceConfig::try_from_slice(&ix.data[1..]).unwrap();
        assert_eq!(decoded.community_vote_threshold, VoteThreshold::YesVotePercentage(60));
        assert_eq!(decoded.min_community_weight_to_create_proposal, 0);
    }

    #[test]
    fn test_create_proposal_requires_options() {
        let k = Pubkey::new([1; 32]);
        let mut content = ProposalContent::yes_no("Fund", "https://example.org/p/1");
        content.options.clear();

        let res = create_proposal(
            &program(),
            CreateProposalAccounts {
                realm: &k,
                proposal: &k,
                governance: &k,
                proposal_owner_record: &k,
                governing_token_mint: &k,
                governance_authority: &k,
                payer: &k,
            },
            &content,
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_create_proposal_uses_proposal_as_seed() {
        let realm = Pubkey::new([1; 32]);
        let proposal = Pubkey::new([5; 32]);
        let other = Pubkey::new([6; 32]);
        let content = ProposalContent::yes_no("Fund", "desc");

        let ix = create_proposal(
            &program(),
            CreateProposalAccounts {
                realm: &realm,
                proposal: &proposal,
                governance: &other,
                proposal_owner_record: &other,
                governing_token_mint: &other,
                governance_authority: &other,
                payer: &other,
            },
            &content,
        )
        .unwrap();

        assert_eq!(ix.data[0], index::CREATE_PROPOSAL);
        assert_eq!(&ix.data[ix.data.len() - 32..], proposal.as_bytes());
        assert!(ix.accounts[1].is_signer);
    }

    #[test]
    fn test_cast_vote_variants() {
        let k = Pubkey::new([1; 32]);
        let accounts = || CastVoteAccounts {
            realm: &k,
            governance: &k,
            proposal: &k,
            proposal_owner_record: &k,
            voter_token_owner_record: &k,
            governance_authority: &k,
            governing_token_mint: &k,
            payer: &k,
        };

        let approve = cast_vote(&program(), accounts(), &Vote::approve()).unwrap();
        assert_eq!(approve.data, vec![index::CAST_VOTE, 0, 1, 0, 0, 0, 0, 100]);

        let deny = cast_vote(&program(), accounts(), &Vote::Deny).unwrap();
        assert_eq!(deny.data, vec![index::CAST_VOTE, 1]);
    }
}
