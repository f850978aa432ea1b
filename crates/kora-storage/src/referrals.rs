//! Referral persistence
//!
//! Each referred user credits the referrer a fixed number of points,
//! at most once per referred user.

use chrono::{DateTime, Utc};
use kora_core::{KoraError, Result, UserId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Points credited per successful referral
pub const POINTS_PER_REFERRAL: u64 = 100;

/// A recorded referral
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Referral {
    pub referrer: UserId,
    pub referred: UserId,
    pub points: u64,
    pub created_at: DateTime<Utc>,
}

/// Store for referrals, keyed by the referred user
#[derive(Default)]
pub struct ReferralStore {
    records: RwLock<HashMap<UserId, Referral>>,
}

impl ReferralStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a referral; a user can only ever be referred once
    pub fn record(&self, referrer: UserId, referred: UserId) -> Result<Referral> {
        if referrer == referred {
            return Err(KoraError::InvalidInput(
                "users cannot refer themselves".to_string(),
            ));
        }

        let mut records = self.records.write();
        if records.contains_key(&referred) {
            return Err(KoraError::Conflict(format!(
                "user {} was already referred",
                referred
            )));
        }

        let referral = Referral {
            referrer,
            referred,
            points: POINTS_PER_REFERRAL,
            created_at: Utc::now(),
        };
        records.insert(referred, referral.clone());
        Ok(referral)
    }

    /// Total points a user has earned from referrals
    pub fn points_for(&self, referrer: &UserId) -> u64 {
        self.records
            .read()
            .values()
            .filter(|r| r.referrer == *referrer)
            .map(|r| r.points)
            .sum()
    }

    pub fn list_by_referrer(&self, referrer: &UserId) -> Vec<Referral> {
        let mut results: Vec<Referral> = self
            .records
            .read()
            .values()
            .filter(|r| r.referrer == *referrer)
            .cloned()
            .collect();
        results.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_accumulate_per_referral() {
        let store = ReferralStore::new();
        let referrer = UserId::generate();
        store.record(referrer, UserId::generate()).unwrap();
        store.record(referrer, UserId::generate()).unwrap();

        assert_eq!(store.points_for(&referrer), 2 * POINTS_PER_REFERRAL);
    }

    #[test]
    fn test_referred_user_only_counts_once() {
        let store = ReferralStore::new();
        let referrer = UserId::generate();
        let referred = UserId::generate();
        store.record(referrer, referred).unwrap();

        let other = UserId::generate();
        assert!(matches!(
            store.record(other, referred),
            Err(KoraError::Conflict(_))
        ));
        assert_eq!(store.points_for(&other), 0);
    }

    #[test]
    fn test_self_referral_rejected() {
        let store = ReferralStore::new();
        let user = UserId::generate();
        assert!(matches!(
            store.record(user, user),
            Err(KoraError::InvalidInput(_))
        ));
    }
}
