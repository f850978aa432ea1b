//! Core type definitions for Kora
//!
//! Identifiers are UUID-backed newtypes; on-chain addresses are 20-byte
//! EVM-style newtypes with hex parse/display. Domain records are plain
//! serde structs; every status field is a closed enum with its legal
//! transitions expressed as methods.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Parse error for 20-byte hex addresses
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum AddressParseError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    #[error("expected 20 bytes, got {0}")]
    WrongLength(usize),
}

fn parse_address_bytes(s: &str) -> Result<[u8; 20], AddressParseError> {
    let hex_str = s.strip_prefix("0x").unwrap_or(s);
    let bytes =
        hex::decode(hex_str).map_err(|_| AddressParseError::InvalidHex(s.to_string()))?;
    if bytes.len() != 20 {
        return Err(AddressParseError::WrongLength(bytes.len()));
    }
    let mut out = [0u8; 20];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// WalletAddress - a user's signing wallet on the staking chain
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WalletAddress {
    addr: [u8; 20],
}

impl WalletAddress {
    pub fn new(addr: [u8; 20]) -> Self {
        Self { addr }
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.addr
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.addr))
    }

    pub fn from_hex(s: &str) -> Result<Self, AddressParseError> {
        Ok(Self {
            addr: parse_address_bytes(s)?,
        })
    }

    /// Zero address (unfunded/unset)
    pub const ZERO: Self = Self { addr: [0u8; 20] };
}

impl fmt::Debug for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WalletAddress({})", self.to_hex())
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// OrchestratorAddress - identity of a staking counterparty
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct OrchestratorAddress {
    addr: [u8; 20],
}

impl OrchestratorAddress {
    pub fn new(addr: [u8; 20]) -> Self {
        Self { addr }
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.addr
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.addr))
    }

    pub fn from_hex(s: &str) -> Result<Self, AddressParseError> {
        Ok(Self {
            addr: parse_address_bytes(s)?,
        })
    }
}

impl fmt::Debug for OrchestratorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OrchestratorAddress({})", self.to_hex())
    }
}

impl fmt::Display for OrchestratorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, PartialOrd, Ord,
        )]
        pub struct $name(Uuid);

        impl $name {
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Identifier for a stake record
    StakeId
);
uuid_id!(
    /// Identifier for an opportunity (bounty, grant, or RFP)
    OpportunityId
);
uuid_id!(
    /// Identifier for a talent submission
    SubmissionId
);
uuid_id!(
    /// Identifier for a user profile
    UserId
);

/// Lifecycle of a stake record
///
/// Stakes are never deleted; status only moves forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StakeStatus {
    Active,
    Unstaking,
    Withdrawn,
}

impl StakeStatus {
    /// Whether `next` is a legal forward transition from `self`
    pub fn can_transition_to(&self, next: StakeStatus) -> bool {
        matches!(
            (self, next),
            (StakeStatus::Active, StakeStatus::Unstaking)
                | (StakeStatus::Active, StakeStatus::Withdrawn)
                | (StakeStatus::Unstaking, StakeStatus::Withdrawn)
        )
    }
}

/// A user's delegated stake with an orchestrator
///
/// Principal and earnings are kept in the user's display currency;
/// reward accrual is written by the chain side, never computed here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stake {
    /// Record identifier
    pub id: StakeId,

    /// Owning user
    pub user_id: UserId,

    /// Orchestrator the stake is delegated to
    pub orchestrator_address: OrchestratorAddress,

    /// Display name of the orchestrator at delegation time
    pub orchestrator_name: String,

    /// Principal in display currency units
    pub amount: f64,

    /// APY percent at delegation time
    pub apy: f64,

    /// Accumulated earnings in display currency units
    pub earnings: f64,

    /// Lifecycle status
    pub status: StakeStatus,

    /// Delegation timestamp
    pub staked_at: DateTime<Utc>,

    /// Last reward accrual write
    pub last_reward_update: DateTime<Utc>,
}

impl Stake {
    /// Create a fresh active stake record
    pub fn new(
        user_id: UserId,
        orchestrator_address: OrchestratorAddress,
        orchestrator_name: String,
        amount: f64,
        apy: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: StakeId::generate(),
            user_id,
            orchestrator_address,
            orchestrator_name,
            amount,
            apy,
            earnings: 0.0,
            status: StakeStatus::Active,
            staked_at: now,
            last_reward_update: now,
        }
    }
}

/// A staking counterparty with published display attributes
///
/// Read-only reference data: sourced from the directory's live provider
/// when available, otherwise from the fixed fallback list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Orchestrator {
    /// Unique on-chain address
    pub address: OrchestratorAddress,

    /// Display name
    pub name: String,

    /// Published APY percent
    pub apy: f64,

    /// Total stake delegated to this orchestrator, in native token units
    pub total_stake: u128,

    /// Performance score percent (0-100)
    pub performance: f64,

    /// Fee as a fraction (0-1) taken from rewards
    pub fee: f64,

    /// Reward per round in native token units
    pub reward: u128,

    /// Whether the orchestrator is currently active
    pub active: bool,
}

/// Opportunity lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpportunityStatus {
    Active,
    Closed,
}

/// Kind-specific payload of an opportunity
///
/// A discriminated union per kind so downstream matching is exhaustive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OpportunityKind {
    /// One-off task with a fixed reward, in display currency
    Bounty { reward: f64 },
    /// Funding program with a maximum award, in display currency
    Grant { max_amount: f64 },
    /// Request for proposals with an overall budget, in display currency
    Rfp { budget: f64 },
}

impl OpportunityKind {
    /// Short tag used in filters and API payloads
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Bounty { .. } => "bounty",
            Self::Grant { .. } => "grant",
            Self::Rfp { .. } => "rfp",
        }
    }
}

/// An opportunity posted by a sponsor for talent to apply to
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Opportunity {
    /// Record identifier
    pub id: OpportunityId,

    /// Posting sponsor
    pub sponsor_id: UserId,

    /// Title shown in listings
    pub title: String,

    /// Kind and kind-specific amounts
    pub kind: OpportunityKind,

    /// Long-form description
    pub description: String,

    /// Category label (free-form, e.g. "development", "design")
    pub category: String,

    /// Lifecycle status
    pub status: OpportunityStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Opportunity {
    pub fn new(
        sponsor_id: UserId,
        title: String,
        kind: OpportunityKind,
        description: String,
        category: String,
    ) -> Self {
        Self {
            id: OpportunityId::generate(),
            sponsor_id,
            title,
            kind,
            description,
            category,
            status: OpportunityStatus::Active,
            created_at: Utc::now(),
        }
    }
}

/// Review state of a submission
///
/// Pending is the only non-terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SubmissionStatus::Pending)
    }
}

/// A talent's application to an opportunity
///
/// At most one submission exists per (user, opportunity) pair; the
/// storage layer enforces the invariant and signals violations with a
/// structured conflict error.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Submission {
    /// Record identifier
    pub id: SubmissionId,

    /// Opportunity being applied to
    pub opportunity_id: OpportunityId,

    /// Applying user
    pub user_id: UserId,

    /// Project name
    pub project_name: String,

    /// Link to the project
    pub project_url: String,

    /// Application text
    pub description: String,

    /// Review state
    pub status: SubmissionStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(
        opportunity_id: OpportunityId,
        user_id: UserId,
        project_name: String,
        project_url: String,
        description: String,
    ) -> Self {
        Self {
            id: SubmissionId::generate(),
            opportunity_id,
            user_id,
            project_name,
            project_url,
            description,
            status: SubmissionStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_hex_round_trip() {
        let addr = WalletAddress::new([0xab; 20]);
        let parsed = WalletAddress::from_hex(&addr.to_hex()).unwrap();
        assert_eq!(addr, parsed);
    }

    #[test]
    fn test_address_rejects_bad_input() {
        assert!(matches!(
            OrchestratorAddress::from_hex("0x1234"),
            Err(AddressParseError::WrongLength(2))
        ));
        assert!(matches!(
            OrchestratorAddress::from_hex("zz"),
            Err(AddressParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_stake_status_transitions() {
        assert!(StakeStatus::Active.can_transition_to(StakeStatus::Unstaking));
        assert!(StakeStatus::Unstaking.can_transition_to(StakeStatus::Withdrawn));
        assert!(!StakeStatus::Withdrawn.can_transition_to(StakeStatus::Active));
        assert!(!StakeStatus::Unstaking.can_transition_to(StakeStatus::Active));
    }

    #[test]
    fn test_submission_terminal_states() {
        assert!(!SubmissionStatus::Pending.is_terminal());
        assert!(SubmissionStatus::Approved.is_terminal());
        assert!(SubmissionStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_opportunity_kind_tags() {
        assert_eq!(OpportunityKind::Bounty { reward: 100.0 }.tag(), "bounty");
        assert_eq!(OpportunityKind::Grant { max_amount: 1.0 }.tag(), "grant");
        assert_eq!(OpportunityKind::Rfp { budget: 1.0 }.tag(), "rfp");
    }
}
