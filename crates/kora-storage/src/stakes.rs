//! Stake persistence
//!
//! Stakes are append-only: records are never deleted, and status moves
//! only forward (Active -> Unstaking -> Withdrawn).

use chrono::Utc;
use kora_core::{KoraError, Result, Stake, StakeId, StakeStatus, UserId};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Store for stake records
#[derive(Default)]
pub struct StakeStore {
    records: RwLock<HashMap<StakeId, Stake>>,
}

impl StakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly delegated stake
    pub fn insert(&self, stake: Stake) -> Result<()> {
        let mut records = self.records.write();
        if records.contains_key(&stake.id) {
            return Err(KoraError::Conflict(format!("stake {} already exists", stake.id)));
        }
        records.insert(stake.id, stake);
        Ok(())
    }

    pub fn get(&self, id: &StakeId) -> Result<Stake> {
        self.records
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| KoraError::NotFound {
                entity: "stake",
                id: id.to_string(),
            })
    }

    /// Full reload of a user's stakes, newest first
    pub fn list_by_user(&self, user_id: &UserId) -> Vec<Stake> {
        let mut stakes: Vec<Stake> = self
            .records
            .read()
            .values()
            .filter(|s| s.user_id == *user_id)
            .cloned()
            .collect();
        stakes.sort_by(|a, b| b.staked_at.cmp(&a.staked_at));
        stakes
    }

    /// Move a stake forward in its lifecycle
    pub fn transition(&self, id: &StakeId, next: StakeStatus) -> Result<Stake> {
        let mut records = self.records.write();
        let stake = records.get_mut(id).ok_or_else(|| KoraError::NotFound {
            entity: "stake",
            id: id.to_string(),
        })?;

        if !stake.status.can_transition_to(next) {
            return Err(KoraError::InvalidTransition {
                entity: "stake",
                from: format!("{:?}", stake.status),
                to: format!("{:?}", next),
            });
        }
        stake.status = next;
        Ok(stake.clone())
    }

    /// Record externally accrued earnings
    ///
    /// Accrual is written by the chain side; nothing here computes it.
    pub fn accrue_earnings(&self, id: &StakeId, earnings: f64) -> Result<()> {
        let mut records = self.records.write();
        let stake = records.get_mut(id).ok_or_else(|| KoraError::NotFound {
            entity: "stake",
            id: id.to_string(),
        })?;
        stake.earnings = earnings;
        stake.last_reward_update = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kora_core::OrchestratorAddress;

    fn test_stake(user: UserId) -> Stake {
        Stake::new(
            user,
            OrchestratorAddress::new([1u8; 20]),
            "Test".to_string(),
            1_000.0,
            60.0,
        )
    }

    #[test]
    fn test_insert_and_list_by_user() {
        let store = StakeStore::new();
        let user = UserId::generate();
        store.insert(test_stake(user)).unwrap();
        store.insert(test_stake(user)).unwrap();
        store.insert(test_stake(UserId::generate())).unwrap();

        assert_eq!(store.list_by_user(&user).len(), 2);
    }

    #[test]
    fn test_forward_transitions_only() {
        let store = StakeStore::new();
        let stake = test_stake(UserId::generate());
        let id = stake.id;
        store.insert(stake).unwrap();

        store.transition(&id, StakeStatus::Unstaking).unwrap();
        store.transition(&id, StakeStatus::Withdrawn).unwrap();

        let result = store.transition(&id, StakeStatus::Active);
        assert!(matches!(result, Err(KoraError::InvalidTransition { .. })));
    }

    #[test]
    fn test_accrue_updates_timestamp() {
        let store = StakeStore::new();
        let stake = test_stake(UserId::generate());
        let id = stake.id;
        let before = stake.last_reward_update;
        store.insert(stake).unwrap();

        store.accrue_earnings(&id, 42.5).unwrap();
        let updated = store.get(&id).unwrap();
        assert_eq!(updated.earnings, 42.5);
        assert!(updated.last_reward_update >= before);
    }

    #[test]
    fn test_missing_stake_is_not_found() {
        let store = StakeStore::new();
        assert!(matches!(
            store.get(&StakeId::generate()),
            Err(KoraError::NotFound { entity: "stake", .. })
        ));
    }
}
