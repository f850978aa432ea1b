//! # Kora Storage
//!
//! In-process stores, one per table the product persists: stakes,
//! opportunities, submissions, profiles, notifications, referrals, and
//! role requests.
//!
//! Every uniqueness and transition invariant the backing tables enforce
//! is surfaced here as a structured [`kora_core::KoraError`] variant —
//! a conflict is `KoraError::Conflict`, never an error string for the
//! caller to substring-match.

pub mod notifications;
pub mod opportunities;
pub mod profiles;
pub mod referrals;
pub mod stakes;
pub mod submissions;

pub use notifications::{Notification, NotificationStore};
pub use opportunities::{OpportunityFilter, OpportunityStore};
pub use profiles::{Profile, ProfileStore, Role, RoleRequest, RoleRequestStatus, RoleRequestStore};
pub use referrals::{Referral, ReferralStore, POINTS_PER_REFERRAL};
pub use stakes::StakeStore;
pub use submissions::SubmissionStore;
