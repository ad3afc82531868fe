//! Demo configuration.
//!
//! Command-line flags with environment fallbacks, validated into a
//! [`DemoConfig`] before any network traffic.

use std::path::PathBuf;

use clap::Parser;

use crate::adapters::solana::{
    Pubkey, DEVNET_RPC_URL, LAMPORTS_PER_SOL, LOCALNET_RPC_URL, MAINNET_BETA_RPC_URL,
    TESTNET_RPC_URL,
};
use crate::error::{GovernanceDemoError, Result};
use crate::governance::{self, GovernanceConfig, RealmConfigArgs};

/// Default log file, appended to on every run
pub const DEFAULT_LOG_FILE: &str = "governance_proposal.log";

pub const DEFAULT_REALM_NAME: &str = "OntoraAIRealm";
pub const DEFAULT_PROPOSAL_NAME: &str = "Ontora AI Funding Proposal";
pub const DEFAULT_PROPOSAL_DESCRIPTION: &str =
    "Allocate 1000 tokens to fund Ontora AI development initiatives.";

/// Minimum fee payer balance: 0.01 SOL
pub const DEFAULT_MIN_BALANCE_LAMPORTS: u64 = LAMPORTS_PER_SOL / 100;

/// Ledger cluster selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cluster {
    Devnet,
    Testnet,
    MainnetBeta,
    Localnet,
    Custom(String),
}

impl Cluster {
    /// Parse a named cluster or an explicit `http(s)://` URL.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim() {
            "devnet" => Ok(Self::Devnet),
            "testnet" => Ok(Self::Testnet),
            "mainnet-beta" | "mainnet" => Ok(Self::MainnetBeta),
            "localnet" | "localhost" => Ok(Self::Localnet),
            url if url.starts_with("http://") || url.starts_with("https://") => {
                Ok(Self::Custom(url.to_string()))
            }
            other => Err(GovernanceDemoError::InvalidInput {
                reason: format!(
                    "Unknown cluster '{}'. Valid: devnet, testnet, mainnet-beta, localnet, or an http(s) URL",
                    other
                ),
            }),
        }
    }

    pub fn rpc_url(&self) -> &str {
        match self {
            Self::Devnet => DEVNET_RPC_URL,
            Self::Testnet => TESTNET_RPC_URL,
            Self::MainnetBeta => MAINNET_BETA_RPC_URL,
            Self::Localnet => LOCALNET_RPC_URL,
            Self::Custom(url) => url,
        }
    }
}

impl core::fmt::Display for Cluster {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Devnet => write!(f, "devnet"),
            Self::Testnet => write!(f, "testnet"),
            Self::MainnetBeta => write!(f, "mainnet-beta"),
            Self::Localnet => write!(f, "localnet"),
            Self::Custom(url) => write!(f, "{}", url),
        }
    }
}

/// Which way the demo votes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum VoteKind {
    Approve,
    Deny,
}

impl VoteKind {
    pub fn to_vote(self) -> governance::Vote {
        match self {
            Self::Approve => governance::Vote::approve(),
            Self::Deny => governance::Vote::Deny,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Approve => "Yes",
            Self::Deny => "No",
        }
    }
}

/// Voting rules used for the governance the demo creates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GovernanceSettings {
    /// Percentage of yes votes needed to pass (1..=100)
    pub yes_vote_threshold_pct: u8,
    pub min_community_weight_to_create_governance: u64,
    pub min_community_weight_to_create_proposal: u64,
    pub voting_base_time_secs: u32,
}

impl Default for GovernanceSettings {
    fn default() -> Self {
        Self {
            yes_vote_threshold_pct: 60,
            min_community_weight_to_create_governance: 0,
            min_community_weight_to_create_proposal: 0,
            voting_base_time_secs: 3 * 24 * 60 * 60,
        }
    }
}

impl GovernanceSettings {
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.yes_vote_threshold_pct) {
            return Err(GovernanceDemoError::InvalidInput {
                reason: format!(
                    "Yes-vote threshold must be between 1 and 100, got {}",
                    self.yes_vote_threshold_pct
                ),
            });
        }
        if self.voting_base_time_secs == 0 {
            return Err(GovernanceDemoError::InvalidInput {
                reason: "Voting time must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn realm_config(&self) -> RealmConfigArgs {
        RealmConfigArgs::community(self.min_community_weight_to_create_governance)
    }

    pub fn governance_config(&self) -> GovernanceConfig {
        GovernanceConfig::community_yes_threshold(
            self.yes_vote_threshold_pct,
            self.min_community_weight_to_create_proposal,
            self.voting_base_time_secs,
        )
    }
}

/// Fully validated demo configuration.
#[derive(Clone, Debug)]
pub struct DemoConfig {
    pub cluster: Cluster,
    pub program_id: Pubkey,
    pub log_file: PathBuf,
    pub realm_name: String,
    pub proposal_name: String,
    pub proposal_description: String,
    pub vote: VoteKind,
    pub min_balance_lamports: u64,
    pub max_confirmation_polls: u32,
    pub governance: GovernanceSettings,
}

impl DemoConfig {
    /// Defaults for `cluster`, matching the stock demo run.
    pub fn new(cluster: Cluster) -> Result<Self> {
        Ok(Self {
            cluster,
            program_id: governance::default_program_id()?,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            realm_name: DEFAULT_REALM_NAME.to_string(),
            proposal_name: DEFAULT_PROPOSAL_NAME.to_string(),
            proposal_description: DEFAULT_PROPOSAL_DESCRIPTION.to_string(),
            vote: VoteKind::Approve,
            min_balance_lamports: DEFAULT_MIN_BALANCE_LAMPORTS,
            max_confirmation_polls: crate::adapters::solana::MAX_CONFIRMATION_POLLS,
            governance: GovernanceSettings::default(),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.realm_name.trim().is_empty() {
            return Err(GovernanceDemoError::InvalidInput {
                reason: "Realm name must not be empty".to_string(),
            });
        }
        if self.proposal_name.trim().is_empty() {
            return Err(GovernanceDemoError::InvalidInput {
                reason: "Proposal name must not be empty".to_string(),
            });
        }
        if self.max_confirmation_polls == 0 {
            return Err(GovernanceDemoError::InvalidInput {
                reason: "Confirmation polls must be at least 1".to_string(),
            });
        }
        self.governance.validate()
    }
}

/// Command-line arguments for the governance demo.
#[derive(Parser, Debug, Clone)]
#[command(name = "governance-demo")]
#[command(about = "Create a realm, governance and proposal, then vote on it")]
pub struct Args {
    /// Cluster name (devnet, testnet, mainnet-beta, localnet) or RPC URL
    #[arg(long, env = "SOLANA_CLUSTER", default_value = "devnet")]
    pub cluster: String,

    /// Governance program id
    #[arg(long, env = "GOVERNANCE_PROGRAM_ID", default_value = governance::GOVERNANCE_PROGRAM_ID)]
    pub program_id: String,

    /// File the run log is appended to
    #[arg(long, env = "GOVERNANCE_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Log filter directive
    #[arg(long, env = "GOVERNANCE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, default_value = DEFAULT_REALM_NAME)]
    pub realm_name: String,

    #[arg(long, default_value = DEFAULT_PROPOSAL_NAME)]
    pub proposal_name: String,

    #[arg(long, default_value = DEFAULT_PROPOSAL_DESCRIPTION)]
    pub proposal_description: String,

    /// Vote cast on the new proposal
    #[arg(long, value_enum, default_value_t = VoteKind::Approve)]
    pub vote: VoteKind,

    /// Percentage of yes votes needed to pass
    #[arg(long, env = "GOVERNANCE_YES_THRESHOLD", default_value_t = 60)]
    pub yes_threshold: u8,

    /// Minimum community weight to create a governance
    #[arg(long, default_value_t = 0)]
    pub min_weight_to_create_governance: u64,

    /// Minimum community weight to create a proposal
    #[arg(long, default_value_t = 0)]
    pub min_weight_to_create_proposal: u64,

    /// Voting window in seconds
    #[arg(long, default_value_t = 3 * 24 * 60 * 60)]
    pub voting_time_secs: u32,

    /// Fee payer balance required before any transaction is sent
    #[arg(long, env = "GOVERNANCE_MIN_BALANCE_LAMPORTS", default_value_t = DEFAULT_MIN_BALANCE_LAMPORTS)]
    pub min_balance_lamports: u64,

    /// Status checks before a transaction counts as unconfirmed
    #[arg(long, default_value_t = crate::adapters::solana::MAX_CONFIRMATION_POLLS)]
    pub confirmation_polls: u32,
}

impl Args {
    /// Validate and convert into a [`DemoConfig`].
    pub fn into_config(self) -> Result<DemoConfig> {
        let config = DemoConfig {
            cluster: Cluster::parse(&self.cluster)?,
            program_id: Pubkey::from_str(&self.program_id)?,
            log_file: self.log_file,
            realm_name: self.realm_name,
            proposal_name: self.proposal_name,
            proposal_description: self.proposal_description,
            vote: self.vote,
            min_balance_lamports: self.min_balance_lamports,
            max_confirmation_polls: self.confirmation_polls,
            governance: GovernanceSettings {
                yes_vote_threshold_pct: self.yes_threshold,
                min_community_weight_to_create_governance: self.min_weight_to_create_governance,
                min_community_weight_to_create_proposal: self.min_weight_to_create_proposal,
                voting_base_time_secs: self.voting_time_secs,
            },
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_parse() {
        assert_eq!(Cluster::parse("devnet").unwrap(), Cluster::Devnet);
        assert_eq!(Cluster::parse("mainnet-beta").unwrap().rpc_url(), MAINNET_BETA_RPC_URL);
        assert_eq!(
            Cluster::parse("http://10.0.0.2:8899").unwrap(),
            Cluster::Custom("http://10.0.0.2:8899".to_string())
        );
        assert!(Cluster::parse("moonnet").is_err());
    }

    #[test]
    fn test_default_args_produce_demo_config() {
        let args = Args::parse_from(["governance-demo"]);
        let config = args.into_config().unwrap();

        assert_eq!(config.cluster, Cluster::Devnet);
        assert_eq!(config.cluster.rpc_url(), DEVNET_RPC_URL);
        assert_eq!(config.governance, GovernanceSettings::default());
        assert_eq!(config.min_balance_lamports, 10_000_000);
        assert_eq!(config.vote, VoteKind::Approve);
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let args = Args::parse_from(["governance-demo", "--yes-threshold", "0"]);
        assert!(args.into_config().is_err());

        let args = Args::parse_from(["governance-demo", "--yes-threshold", "101"]);
        assert!(args.into_config().is_err());
    }

    #[test]
    fn test_vote_flag() {
        let args = Args::parse_from(["governance-demo", "--vote", "deny"]);
        let config = args.into_config().unwrap();
        assert_eq!(config.vote, VoteKind::Deny);
        assert_eq!(config.vote.to_vote(), governance::Vote::Deny);
    }

    #[test]
    fn test_governance_config_carries_settings() {
        let settings = GovernanceSettings {
            yes_vote_threshold_pct: 75,
            min_community_weight_to_create_proposal: 5,
            ..GovernanceSettings::default()
        };
        let cfg = settings.governance_config();
        assert_eq!(cfg.community_vote_threshold, governance::VoteThreshold::YesVotePercentage(75));
        assert_eq!(cfg.min_community_weight_to_create_proposal, 5);
    }

    #[test]
    fn test_bad_program_id_rejected() {
        let args = Args::parse_from(["governance-demo", "--program-id", "xyz"]);
        assert!(args.into_config().is_err());
    }
}
