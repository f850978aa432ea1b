//! # Kora Marketplace
//!
//! The talent-marketplace services: sponsors post opportunities
//! (bounties, grants, RFPs), talent submit applications, sponsors review
//! them, and referrals accrue points.
//!
//! Services are plain structs holding `Arc`s to the stores they touch —
//! dependencies are injected at construction, never reached through
//! ambient singletons, so every service is testable in isolation.

pub mod opportunities;
pub mod referrals;
pub mod roles;
pub mod submissions;

pub use opportunities::OpportunityService;
pub use referrals::ReferralService;
pub use roles::RoleRequestService;
pub use submissions::SubmissionService;
