//! Role request service
//!
//! Talent ask to become sponsors; an admin approves or rejects. On
//! approval the profile's role is updated in the same step.

use kora_core::{KoraError, Result, UserId};
use kora_storage::{
    Notification, NotificationStore, ProfileStore, Role, RoleRequest, RoleRequestStatus,
    RoleRequestStore,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Request/approve/reject flow for role upgrades
pub struct RoleRequestService {
    requests: Arc<RoleRequestStore>,
    profiles: Arc<ProfileStore>,
    notifications: Arc<NotificationStore>,
}

impl RoleRequestService {
    pub fn new(
        requests: Arc<RoleRequestStore>,
        profiles: Arc<ProfileStore>,
        notifications: Arc<NotificationStore>,
    ) -> Self {
        Self {
            requests,
            profiles,
            notifications,
        }
    }

    /// Ask for the sponsor role
    pub fn request_sponsor(&self, user_id: UserId) -> Result<RoleRequest> {
        let profile = self.profiles.get(&user_id)?;
        if matches!(profile.role, Role::Sponsor | Role::Admin) {
            return Err(KoraError::Conflict(format!(
                "user {} already holds the sponsor role",
                user_id
            )));
        }

        let request = RoleRequest::new(user_id, Role::Sponsor);
        self.requests.insert(request.clone())?;
        info!(%user_id, "sponsor role requested");
        Ok(request)
    }

    /// Pending requests, oldest first; admin only
    pub fn list_pending(&self, admin_id: &UserId) -> Result<Vec<RoleRequest>> {
        self.require_admin(admin_id)?;
        Ok(self.requests.list_pending())
    }

    /// Approve a request and grant the role
    pub fn approve(&self, admin_id: &UserId, request_id: &Uuid) -> Result<RoleRequest> {
        self.require_admin(admin_id)?;
        let request = self.requests.resolve(request_id, RoleRequestStatus::Approved)?;
        self.profiles.set_role(&request.user_id, request.requested)?;
        self.notifications.push(Notification::new(
            request.user_id,
            "role_granted",
            format!("Your {:?} role request was approved", request.requested),
        ));
        info!(user_id = %request.user_id, role = ?request.requested, "role request approved");
        Ok(request)
    }

    /// Reject a request; the profile is untouched
    pub fn reject(&self, admin_id: &UserId, request_id: &Uuid) -> Result<RoleRequest> {
        self.require_admin(admin_id)?;
        let request = self.requests.resolve(request_id, RoleRequestStatus::Rejected)?;
        self.notifications.push(Notification::new(
            request.user_id,
            "role_rejected",
            format!("Your {:?} role request was rejected", request.requested),
        ));
        Ok(request)
    }

    fn require_admin(&self, user_id: &UserId) -> Result<()> {
        let profile = self.profiles.get(user_id)?;
        if profile.role != Role::Admin {
            return Err(KoraError::Forbidden(
                "only admins can manage role requests".to_string(),
            ));
        }
        Ok(())
    }
}
