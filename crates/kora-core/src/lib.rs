//! # Kora Core
//!
//! Shared foundation for the Kora talent marketplace and staking wallet:
//! identifiers, domain records, and the error taxonomy used across every
//! crate in the workspace.
//!
//! ## Domain at a glance
//!
//! | Record | Created by | Mutated by | Deleted |
//! |--------------|---------------------|---------------------------|---------|
//! | Stake | successful delegation | reward accrual, unstaking | never |
//! | Orchestrator | directory refresh | — (immutable per session) | never |
//! | Opportunity | sponsor | status flip by owner | owner |
//! | Submission | talent (once per opportunity) | review by sponsor | never |

pub mod error;
pub mod types;

pub use error::{KoraError, Result};
pub use types::{
    Opportunity, OpportunityId, OpportunityKind, OpportunityStatus, Orchestrator,
    OrchestratorAddress, Stake, StakeId, StakeStatus, Submission, SubmissionId, SubmissionStatus,
    UserId, WalletAddress,
};
