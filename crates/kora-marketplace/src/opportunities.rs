//! Opportunity service

use kora_core::{
    KoraError, Opportunity, OpportunityId, OpportunityKind, Result, UserId,
};
use kora_storage::{OpportunityFilter, OpportunityStore, ProfileStore, Role};
use std::sync::Arc;
use tracing::info;

/// Create/list/close/delete for opportunities
pub struct OpportunityService {
    opportunities: Arc<OpportunityStore>,
    profiles: Arc<ProfileStore>,
}

impl OpportunityService {
    pub fn new(opportunities: Arc<OpportunityStore>, profiles: Arc<ProfileStore>) -> Self {
        Self {
            opportunities,
            profiles,
        }
    }

    /// Post a new opportunity; the caller must hold the sponsor role
    pub fn create(
        &self,
        sponsor_id: UserId,
        title: &str,
        kind: OpportunityKind,
        description: &str,
        category: &str,
    ) -> Result<Opportunity> {
        if title.trim().is_empty() {
            return Err(KoraError::MissingField("title"));
        }
        if description.trim().is_empty() {
            return Err(KoraError::MissingField("description"));
        }

        let profile = self.profiles.get(&sponsor_id)?;
        if !matches!(profile.role, Role::Sponsor | Role::Admin) {
            return Err(KoraError::Forbidden(
                "only sponsors can post opportunities".to_string(),
            ));
        }

        let opportunity = Opportunity::new(
            sponsor_id,
            title.trim().to_string(),
            kind,
            description.trim().to_string(),
            category.trim().to_string(),
        );
        self.opportunities.insert(opportunity.clone())?;
        info!(id = %opportunity.id, kind = opportunity.kind.tag(), "opportunity posted");
        Ok(opportunity)
    }

    pub fn get(&self, id: &OpportunityId) -> Result<Opportunity> {
        self.opportunities.get(id)
    }

    pub fn list(&self, filter: &OpportunityFilter) -> Vec<Opportunity> {
        self.opportunities.list(filter)
    }

    pub fn close(&self, id: &OpportunityId, sponsor_id: &UserId) -> Result<Opportunity> {
        self.opportunities.close(id, sponsor_id)
    }

    pub fn delete(&self, id: &OpportunityId, sponsor_id: &UserId) -> Result<()> {
        self.opportunities.delete(id, sponsor_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kora_storage::Profile;

    fn service_with_sponsor() -> (OpportunityService, UserId) {
        let profiles = Arc::new(ProfileStore::new());
        let sponsor = Profile::new("sponsor".to_string(), Role::Sponsor, "USD".to_string());
        let sponsor_id = sponsor.user_id;
        profiles.upsert(sponsor);

        let service = OpportunityService::new(Arc::new(OpportunityStore::new()), profiles);
        (service, sponsor_id)
    }

    #[test]
    fn test_sponsor_can_post() {
        let (service, sponsor_id) = service_with_sponsor();
        let opp = service
            .create(
                sponsor_id,
                "Build a widget",
                OpportunityKind::Bounty { reward: 250.0 },
                "details",
                "development",
            )
            .unwrap();
        assert_eq!(service.get(&opp.id).unwrap().title, "Build a widget");
    }

    #[test]
    fn test_talent_cannot_post() {
        let profiles = Arc::new(ProfileStore::new());
        let talent = Profile::new("talent".to_string(), Role::Talent, "USD".to_string());
        let talent_id = talent.user_id;
        profiles.upsert(talent);
        let service = OpportunityService::new(Arc::new(OpportunityStore::new()), profiles);

        let result = service.create(
            talent_id,
            "t",
            OpportunityKind::Bounty { reward: 1.0 },
            "d",
            "c",
        );
        assert!(matches!(result, Err(KoraError::Forbidden(_))));
    }

    #[test]
    fn test_missing_title_rejected() {
        let (service, sponsor_id) = service_with_sponsor();
        let result = service.create(
            sponsor_id,
            "  ",
            OpportunityKind::Grant { max_amount: 1.0 },
            "d",
            "c",
        );
        assert!(matches!(result, Err(KoraError::MissingField("title"))));
    }
}
