//! Step-by-step governance walkthrough.
//!
//! Each operation checks that the references it depends on exist, performs a
//! single remote call and records the outcome. A missing prerequisite turns
//! the operation into a logged no-op; a remote failure is logged and leaves
//! the state as it was, so later steps still run (and skip).

use tracing::{error, info, warn};

use crate::adapters::solana::{lamports_to_sol, secret_from_env, Keypair, Pubkey, Signature};
use crate::adapters::LedgerClient;
use crate::config::{DemoConfig, VoteKind};
use crate::error::{GovernanceDemoError, Result};
use crate::governance::{
    self, CastVoteAccounts, CreateGovernanceAccounts, CreateProposalAccounts,
    CreateRealmAccounts, ProposalContent, ProposalDetails,
};

/// Demo steps, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    LoadSigner,
    CreateRealm,
    CreateGovernance,
    CreateProposal,
    CastVote,
    FetchProposal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Succeeded,
    /// Prerequisite missing; no remote call was made
    Skipped,
    Failed(String),
}

/// Audit log entry for step tracking.
#[derive(Clone, Debug)]
pub struct AuditEntry {
    pub timestamp_ms: i64,
    pub step: Step,
    pub outcome: StepOutcome,
    pub signature: Option<Signature>,
}

/// References accumulated along signer → realm → governance → proposal.
#[derive(Debug, Default)]
pub struct DemoState {
    pub signer: Option<Keypair>,
    pub community_mint: Option<Pubkey>,
    pub realm: Option<Pubkey>,
    pub governance: Option<Pubkey>,
    pub proposal: Option<Pubkey>,
}

/// What a full run produced.
#[derive(Clone, Debug, Default)]
pub struct DemoSummary {
    pub signer_loaded: bool,
    pub realm: Option<Pubkey>,
    pub governance: Option<Pubkey>,
    pub proposal: Option<Pubkey>,
    pub vote_signature: Option<Signature>,
    pub proposal_details: Option<ProposalDetails>,
}

impl DemoSummary {
    /// True when no signer was available and nothing was submitted.
    pub fn is_demo_mode(&self) -> bool {
        !self.signer_loaded
    }
}

/// Drives the governance program one step at a time.
pub struct ProposalOrchestrator<C> {
    client: C,
    config: DemoConfig,
    state: DemoState,
    audit_log: Vec<AuditEntry>,
}

impl<C: LedgerClient> ProposalOrchestrator<C> {
    pub fn new(client: C, config: DemoConfig) -> Self {
        info!("Orchestrator initialized with connection to {} ({})", config.cluster, config.cluster.rpc_url());
        Self {
            client,
            config,
            state: DemoState::default(),
            audit_log: Vec::new(),
        }
    }

    /// Load the signer from `SOLANA_PRIVATE_KEY`.
    pub async fn load_signer_from_env(&mut self) -> bool {
        let secret = secret_from_env();
        self.load_signer(secret.as_deref().map(String::as_str)).await
    }

    /// Decode `secret`, then require the configured minimum balance.
    ///
    /// `None` selects demo mode. On any failure the signer stays unset.
    pub async fn load_signer(&mut self, secret: Option<&str>) -> bool {
        let Some(secret) = secret else {
            info!("No private key provided in environment. Running in demo mode (no real transactions).");
            self.record(Step::LoadSigner, StepOutcome::Skipped, None);
            return false;
        };

        match self.try_load_signer(secret).await {
            Ok(keypair) => {
                self.state.signer = Some(keypair);
                self.record(Step::LoadSigner, StepOutcome::Succeeded, None);
                true
            }
            Err(e) => {
                error!("Error loading payer wallet: {}", e);
                self.state.signer = None;
                self.record(Step::LoadSigner, StepOutcome::Failed(e.to_string()), None);
                false
            }
        }
    }

    async fn try_load_signer(&self, secret: &str) -> Result<Keypair> {
        let keypair = Keypair::from_base58(secret)?;
        info!("Payer wallet loaded successfully: {}", keypair.pubkey());

        let balance = self.client.get_balance(&keypair.pubkey()).await?;
        info!("Payer balance: {} SOL", lamports_to_sol(balance));

        if balance < self.config.min_balance_lamports {
            return Err(GovernanceDemoError::InsufficientBalance {
                balance,
                required: self.config.min_balance_lamports,
            });
        }
        Ok(keypair)
    }

    /// Create a realm named `name` with a freshly generated community mint.
    pub async fn create_realm(&mut self, name: &str) -> Option<Pubkey> {
        let Some(payer) = self.state.signer.as_ref() else {
            info!("No payer wallet set. Skipping realm creation (demo mode).");
            self.record(Step::CreateRealm, StepOutcome::Skipped, None);
            return None;
        };

        info!("Creating governance realm...");
        match self.try_create_realm(payer, name).await {
            Ok((realm, community_mint, signature)) => {
                info!("Realm created successfully. Tx: {}", signature);
                self.state.realm = Some(realm);
                self.state.community_mint = Some(community_mint);
                self.record(Step::CreateRealm, StepOutcome::Succeeded, Some(signature));
                Some(realm)
            }
            Err(e) => {
                error!("Error creating realm: {}", e);
                self.record(Step::CreateRealm, StepOutcome::Failed(e.to_string()), None);
                None
            }
        }
    }

    async fn try_create_realm(&self, payer: &Keypair, name: &str) -> Result<(Pubkey, Pubkey, Signature)> {
        let community_mint = Keypair::new();
        info!("Community mint created: {}", community_mint.pubkey());

        let realm = Keypair::new();
        let payer_key = payer.pubkey();
        let ix = governance::create_realm(
            &self.config.program_id,
            CreateRealmAccounts {
                realm: &realm.pubkey(),
                realm_authority: &payer_key,
                community_mint: &community_mint.pubkey(),
                payer: &payer_key,
            },
            name,
            &self.config.governance.realm_config(),
        )?;

        let signature = self.client.send_and_confirm(&[ix], payer, &[&realm]).await?;
        Ok((realm.pubkey(), community_mint.pubkey(), signature))
    }

    /// Create a governance in the current realm using the configured rules.
    pub async fn create_governance(&mut self) -> Option<Pubkey> {
        let (Some(payer), Some(realm)) = (self.state.signer.as_ref(), self.state.realm) else {
            info!("No payer wallet or realm set. Skipping governance creation (demo mode).");
            self.record(Step::CreateGovernance, StepOutcome::Skipped, None);
            return None;
        };

        info!("Creating governance...");
        match self.try_create_governance(payer, &realm).await {
            Ok((governance, signature)) => {
                info!("Governance created successfully. Tx: {}", signature);
                self.state.governance = Some(governance);
                self.record(Step::CreateGovernance, StepOutcome::Succeeded, Some(signature));
                Some(governance)
            }
            Err(e) => {
                error!("Error creating governance: {}", e);
                self.record(Step::CreateGovernance, StepOutcome::Failed(e.to_string()), None);
                None
            }
        }
    }

    async fn try_create_governance(&self, payer: &Keypair, realm: &Pubkey) -> Result<(Pubkey, Signature)> {
        let governance = Keypair::new();
        let payer_key = payer.pubkey();
        let settings = &self.config.governance;
        info!(
            "Governance rules: {}% yes votes to pass, voting time {}s",
            settings.yes_vote_threshold_pct, settings.voting_base_time_secs
        );

        let ix = governance::create_governance(
            &self.config.program_id,
            CreateGovernanceAccounts {
                realm,
                governance: &governance.pubkey(),
                // token owner record simplified as the payer
                token_owner_record: &payer_key,
                payer: &payer_key,
                governance_authority: &payer_key,
            },
            &settings.governance_config(),
        )?;

        let signature = self.client.send_and_confirm(&[ix], payer, &[&governance]).await?;
        Ok((governance.pubkey(), signature))
    }

    /// Create a Draft proposal under the current governance.
    pub async fn create_proposal(&mut self, name: &str, description: &str) -> Option<Pubkey> {
        let (Some(payer), Some(realm), Some(governance), Some(mint)) = (
            self.state.signer.as_ref(),
            self.state.realm,
            self.state.governance,
            self.state.community_mint,
        ) else {
            info!("No payer wallet, realm, or governance set. Skipping proposal creation (demo mode).");
            self.record(Step::CreateProposal, StepOutcome::Skipped, None);
            return None;
        };

        info!("Creating proposal...");
        match self.try_create_proposal(payer, &realm, &governance, &mint, name, description).await {
            Ok((proposal, signature)) => {
                info!("Proposal created successfully. Tx: {}", signature);
                self.state.proposal = Some(proposal);
                self.record(Step::CreateProposal, StepOutcome::Succeeded, Some(signature));
                Some(proposal)
            }
            Err(e) => {
                error!("Error creating proposal: {}", e);
                self.record(Step::CreateProposal, StepOutcome::Failed(e.to_string()), None);
                None
            }
        }
    }

    async fn try_create_proposal(
        &self,
        payer: &Keypair,
        realm: &Pubkey,
        governance: &Pubkey,
        mint: &Pubkey,
        name: &str,
        description: &str,
    ) -> Result<(Pubkey, Signature)> {
        let proposal = Keypair::new();
        let payer_key = payer.pubkey();

        let ix = governance::create_proposal(
            &self.config.program_id,
            CreateProposalAccounts {
                realm,
                proposal: &proposal.pubkey(),
                governance,
                proposal_owner_record: &payer_key,
                governing_token_mint: mint,
                governance_authority: &payer_key,
                payer: &payer_key,
            },
            &ProposalContent::yes_no(name, description),
        )?;

        let signature = self.client.send_and_confirm(&[ix], payer, &[&proposal]).await?;
        Ok((proposal.pubkey(), signature))
    }

    /// Vote on the current proposal.
    pub async fn cast_vote(&mut self, vote: VoteKind) -> Option<Signature> {
        let (Some(payer), Some(realm), Some(governance), Some(proposal), Some(mint)) = (
            self.state.signer.as_ref(),
            self.state.realm,
            self.state.governance,
            self.state.proposal,
            self.state.community_mint,
        ) else {
            info!("No payer wallet, realm, governance, or proposal set. Skipping voting (demo mode).");
            self.record(Step::CastVote, StepOutcome::Skipped, None);
            return None;
        };

        info!("Casting vote...");
        let result = self.try_cast_vote(payer, &realm, &governance, &proposal, &mint, vote).await;

        match result {
            Ok(signature) => {
                info!("Vote cast successfully ({}). Tx: {}", vote.label(), signature);
                self.record(Step::CastVote, StepOutcome::Succeeded, Some(signature));
                Some(signature)
            }
            Err(e) => {
                error!("Error casting vote: {}", e);
                self.record(Step::CastVote, StepOutcome::Failed(e.to_string()), None);
                None
            }
        }
    }

    async fn try_cast_vote(
        &self,
        payer: &Keypair,
        realm: &Pubkey,
        governance: &Pubkey,
        proposal: &Pubkey,
        mint: &Pubkey,
        vote: VoteKind,
    ) -> Result<Signature> {
        let payer_key = payer.pubkey();
        let ix = governance::cast_vote(
            &self.config.program_id,
            CastVoteAccounts {
                realm,
                governance,
                proposal,
                proposal_owner_record: &payer_key,
                voter_token_owner_record: &payer_key,
                governance_authority: &payer_key,
                governing_token_mint: mint,
                payer: &payer_key,
            },
            &vote.to_vote(),
        )?;

        self.client.send_and_confirm(&[ix], payer, &[]).await
    }

    /// Fetch the current proposal and log its fields.
    pub async fn get_proposal_details(&mut self) -> Option<ProposalDetails> {
        let Some(proposal) = self.state.proposal else {
            info!("No proposal set. Skipping details fetch (demo mode).");
            self.record(Step::FetchProposal, StepOutcome::Skipped, None);
            return None;
        };

        match governance::fetch_proposal(&self.client, &proposal).await {
            Ok(details) => {
                info!("Proposal Details:");
                info!("  Name: {}", details.name);
                info!("  Description: {}", details.description);
                info!("  State: {}", details.state);
                info!("  Voting Start: {}", details.voting_start());
                self.record(Step::FetchProposal, StepOutcome::Succeeded, None);
                Some(details)
            }
            Err(e) => {
                error!("Error fetching proposal details: {}", e);
                self.record(Step::FetchProposal, StepOutcome::Failed(e.to_string()), None);
                None
            }
        }
    }

    /// Run every step in order with the configured names and vote.
    pub async fn run(&mut self, secret: Option<&str>) -> DemoSummary {
        info!("Starting Solana Governance Proposal Demo...");

        let signer_loaded = self.load_signer(secret).await;
        if !signer_loaded {
            warn!(
                "Demo mode: No real transactions will be sent. Set {} in environment for real operations.",
                crate::adapters::solana::ENV_PRIVATE_KEY
            );
        }

        let realm_name = self.config.realm_name.clone();
        let proposal_name = self.config.proposal_name.clone();
        let description = self.config.proposal_description.clone();
        let vote = self.config.vote;

        let realm = self.create_realm(&realm_name).await;
        let governance = self.create_governance().await;
        let proposal = self.create_proposal(&proposal_name, &description).await;
        let vote_signature = self.cast_vote(vote).await;
        let proposal_details = self.get_proposal_details().await;

        info!("Governance Proposal Demo completed.");

        DemoSummary {
            signer_loaded,
            realm,
            governance,
            proposal,
            vote_signature,
            proposal_details,
        }
    }

    fn record(&mut self, step: Step, outcome: StepOutcome, signature: Option<Signature>) {
        self.audit_log.push(AuditEntry {
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            step,
            outcome,
            signature,
        });
    }

    pub fn state(&self) -> &DemoState {
        &self.state
    }

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Get the audit log.
    pub fn audit_log(&self) -> &[AuditEntry] {
        &self.audit_log
    }

    /// Signatures of every confirmed transaction, in order.
    pub fn signatures(&self) -> Vec<Signature> {
        self.audit_log.iter().filter_map(|e| e.signature).collect()
    }
}
