//! Profiles and role requests

use chrono::{DateTime, Utc};
use kora_core::{KoraError, Result, UserId, WalletAddress};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Platform role
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Talent,
    Sponsor,
    Admin,
}

/// User profile row
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub username: String,
    pub wallet: Option<WalletAddress>,
    pub role: Role,
    /// Preferred display currency code
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(username: String, role: Role, currency: String) -> Self {
        Self {
            user_id: UserId::generate(),
            username,
            wallet: None,
            role,
            currency,
            created_at: Utc::now(),
        }
    }
}

/// Store for profiles
#[derive(Default)]
pub struct ProfileStore {
    records: RwLock<HashMap<UserId, Profile>>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, profile: Profile) {
        self.records.write().insert(profile.user_id, profile);
    }

    pub fn get(&self, user_id: &UserId) -> Result<Profile> {
        self.records
            .read()
            .get(user_id)
            .cloned()
            .ok_or_else(|| KoraError::NotFound {
                entity: "profile",
                id: user_id.to_string(),
            })
    }

    pub fn set_role(&self, user_id: &UserId, role: Role) -> Result<()> {
        let mut records = self.records.write();
        let profile = records.get_mut(user_id).ok_or_else(|| KoraError::NotFound {
            entity: "profile",
            id: user_id.to_string(),
        })?;
        profile.role = role;
        Ok(())
    }

    pub fn connect_wallet(&self, user_id: &UserId, wallet: WalletAddress) -> Result<()> {
        let mut records = self.records.write();
        let profile = records.get_mut(user_id).ok_or_else(|| KoraError::NotFound {
            entity: "profile",
            id: user_id.to_string(),
        })?;
        profile.wallet = Some(wallet);
        Ok(())
    }
}

/// Review state of a role request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleRequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// A request to be granted a role (typically talent -> sponsor)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoleRequest {
    pub id: Uuid,
    pub user_id: UserId,
    pub requested: Role,
    pub status: RoleRequestStatus,
    pub created_at: DateTime<Utc>,
}

impl RoleRequest {
    pub fn new(user_id: UserId, requested: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            requested,
            status: RoleRequestStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// Store for role requests
#[derive(Default)]
pub struct RoleRequestStore {
    records: RwLock<HashMap<Uuid, RoleRequest>>,
}

impl RoleRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a request; one pending request per user at a time
    pub fn insert(&self, request: RoleRequest) -> Result<()> {
        let mut records = self.records.write();
        let has_pending = records
            .values()
            .any(|r| r.user_id == request.user_id && r.status == RoleRequestStatus::Pending);
        if has_pending {
            return Err(KoraError::Conflict(format!(
                "user {} already has a pending role request",
                request.user_id
            )));
        }
        records.insert(request.id, request);
        Ok(())
    }

    pub fn list_pending(&self) -> Vec<RoleRequest> {
        let mut pending: Vec<RoleRequest> = self
            .records
            .read()
            .values()
            .filter(|r| r.status == RoleRequestStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        pending
    }

    pub fn resolve(&self, id: &Uuid, status: RoleRequestStatus) -> Result<RoleRequest> {
        let mut records = self.records.write();
        let request = records.get_mut(id).ok_or_else(|| KoraError::NotFound {
            entity: "role request",
            id: id.to_string(),
        })?;
        if request.status != RoleRequestStatus::Pending {
            return Err(KoraError::InvalidTransition {
                entity: "role request",
                from: format!("{:?}", request.status),
                to: format!("{:?}", status),
            });
        }
        request.status = status;
        Ok(request.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_role_update() {
        let store = ProfileStore::new();
        let profile = Profile::new("ada".to_string(), Role::Talent, "NGN".to_string());
        let id = profile.user_id;
        store.upsert(profile);

        store.set_role(&id, Role::Sponsor).unwrap();
        assert_eq!(store.get(&id).unwrap().role, Role::Sponsor);
    }

    #[test]
    fn test_one_pending_role_request_per_user() {
        let store = RoleRequestStore::new();
        let user = UserId::generate();
        store.insert(RoleRequest::new(user, Role::Sponsor)).unwrap();

        let result = store.insert(RoleRequest::new(user, Role::Sponsor));
        assert!(matches!(result, Err(KoraError::Conflict(_))));
    }

    #[test]
    fn test_resolved_request_is_terminal() {
        let store = RoleRequestStore::new();
        let request = RoleRequest::new(UserId::generate(), Role::Sponsor);
        let id = request.id;
        store.insert(request).unwrap();

        store.resolve(&id, RoleRequestStatus::Approved).unwrap();
        assert!(store.resolve(&id, RoleRequestStatus::Rejected).is_err());
        assert!(store.list_pending().is_empty());
    }
}
