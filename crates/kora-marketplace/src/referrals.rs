//! Referral service

use kora_core::{Result, UserId};
use kora_storage::{Notification, NotificationStore, ProfileStore, Referral, ReferralStore};
use std::sync::Arc;
use tracing::info;

/// Records referrals and reports accumulated points
pub struct ReferralService {
    referrals: Arc<ReferralStore>,
    profiles: Arc<ProfileStore>,
    notifications: Arc<NotificationStore>,
}

impl ReferralService {
    pub fn new(
        referrals: Arc<ReferralStore>,
        profiles: Arc<ProfileStore>,
        notifications: Arc<NotificationStore>,
    ) -> Self {
        Self {
            referrals,
            profiles,
            notifications,
        }
    }

    /// Credit a referral; the referrer is notified of the new points
    pub fn record(&self, referrer: UserId, referred: UserId) -> Result<Referral> {
        // both sides must exist before credit is given
        self.profiles.get(&referrer)?;
        let referred_profile = self.profiles.get(&referred)?;

        let referral = self.referrals.record(referrer, referred)?;
        self.notifications.push(Notification::new(
            referrer,
            "referral_credited",
            format!(
                "{} joined from your referral (+{} points)",
                referred_profile.username, referral.points
            ),
        ));
        info!(%referrer, %referred, points = referral.points, "referral credited");
        Ok(referral)
    }

    pub fn points(&self, referrer: &UserId) -> u64 {
        self.referrals.points_for(referrer)
    }

    pub fn history(&self, referrer: &UserId) -> Vec<Referral> {
        self.referrals.list_by_referrer(referrer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kora_storage::{Profile, Role, POINTS_PER_REFERRAL};

    fn service() -> (ReferralService, Arc<ProfileStore>, Arc<NotificationStore>) {
        let profiles = Arc::new(ProfileStore::new());
        let notifications = Arc::new(NotificationStore::new());
        let service = ReferralService::new(
            Arc::new(ReferralStore::new()),
            profiles.clone(),
            notifications.clone(),
        );
        (service, profiles, notifications)
    }

    fn user(profiles: &ProfileStore, name: &str) -> UserId {
        let profile = Profile::new(name.to_string(), Role::Talent, "USD".to_string());
        let id = profile.user_id;
        profiles.upsert(profile);
        id
    }

    #[test]
    fn test_referral_credits_points_and_notifies() {
        let (service, profiles, notifications) = service();
        let referrer = user(&profiles, "ada");
        let referred = user(&profiles, "femi");

        service.record(referrer, referred).unwrap();
        assert_eq!(service.points(&referrer), POINTS_PER_REFERRAL);
        assert_eq!(notifications.unread_count(&referrer), 1);
    }

    #[test]
    fn test_unknown_referred_user_rejected() {
        let (service, profiles, _) = service();
        let referrer = user(&profiles, "ada");
        assert!(service.record(referrer, UserId::generate()).is_err());
        assert_eq!(service.points(&referrer), 0);
    }
}
