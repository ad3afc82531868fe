pub mod orchestrator;

pub use orchestrator::{
    AuditEntry, DemoState, DemoSummary, ProposalOrchestrator, Step, StepOutcome,
};
