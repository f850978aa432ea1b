//! Submission service
//!
//! Talent apply to open opportunities; the posting sponsor (or an
//! admin) reviews each application exactly once. Review outcomes fan
//! out as notifications to the applicant.

use kora_core::{
    KoraError, Opportunity, OpportunityId, OpportunityStatus, Result, Submission, SubmissionId,
    SubmissionStatus, UserId,
};
use kora_storage::{Notification, NotificationStore, OpportunityStore, ProfileStore, Role, SubmissionStore};
use std::sync::Arc;
use tracing::info;

/// Apply/review/list for submissions
pub struct SubmissionService {
    submissions: Arc<SubmissionStore>,
    opportunities: Arc<OpportunityStore>,
    profiles: Arc<ProfileStore>,
    notifications: Arc<NotificationStore>,
}

impl SubmissionService {
    pub fn new(
        submissions: Arc<SubmissionStore>,
        opportunities: Arc<OpportunityStore>,
        profiles: Arc<ProfileStore>,
        notifications: Arc<NotificationStore>,
    ) -> Self {
        Self {
            submissions,
            opportunities,
            profiles,
            notifications,
        }
    }

    /// Apply to an opportunity
    ///
    /// The opportunity must still be active, and a user can apply to a
    /// given opportunity at most once.
    pub fn submit(
        &self,
        user_id: UserId,
        opportunity_id: OpportunityId,
        project_name: &str,
        project_url: &str,
        description: &str,
    ) -> Result<Submission> {
        if project_name.trim().is_empty() {
            return Err(KoraError::MissingField("project_name"));
        }
        if project_url.trim().is_empty() {
            return Err(KoraError::MissingField("project_url"));
        }

        // the applicant must exist
        self.profiles.get(&user_id)?;

        let opportunity = self.opportunities.get(&opportunity_id)?;
        if opportunity.status != OpportunityStatus::Active {
            return Err(KoraError::InvalidInput(
                "opportunity is no longer accepting submissions".to_string(),
            ));
        }

        let submission = Submission::new(
            opportunity_id,
            user_id,
            project_name.trim().to_string(),
            project_url.trim().to_string(),
            description.trim().to_string(),
        );
        self.submissions.insert(submission.clone())?;
        info!(id = %submission.id, opportunity = %opportunity_id, "submission received");
        Ok(submission)
    }

    /// Review a submission as approved or rejected
    ///
    /// Only the opportunity's sponsor or an admin may review. The
    /// applicant is notified of the outcome.
    pub fn review(
        &self,
        reviewer_id: &UserId,
        submission_id: &SubmissionId,
        status: SubmissionStatus,
    ) -> Result<Submission> {
        let submission = self.submissions.get(submission_id)?;
        let opportunity = self.opportunities.get(&submission.opportunity_id)?;
        self.authorize_reviewer(reviewer_id, &opportunity)?;

        let reviewed = self.submissions.set_status(submission_id, status)?;

        let verdict = match reviewed.status {
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
            SubmissionStatus::Pending => "pending",
        };
        self.notifications.push(Notification::new(
            reviewed.user_id,
            "submission_reviewed",
            format!(
                "Your submission \"{}\" to \"{}\" was {}",
                reviewed.project_name, opportunity.title, verdict
            ),
        ));
        info!(id = %reviewed.id, verdict, "submission reviewed");
        Ok(reviewed)
    }

    /// Submissions for one opportunity; sponsor/admin only
    pub fn list_for_opportunity(
        &self,
        reviewer_id: &UserId,
        opportunity_id: &OpportunityId,
    ) -> Result<Vec<Submission>> {
        let opportunity = self.opportunities.get(opportunity_id)?;
        self.authorize_reviewer(reviewer_id, &opportunity)?;
        Ok(self.submissions.list_by_opportunity(opportunity_id))
    }

    /// A user's own submissions, newest first
    pub fn list_for_user(&self, user_id: &UserId) -> Vec<Submission> {
        self.submissions.list_by_user(user_id)
    }

    fn authorize_reviewer(&self, reviewer_id: &UserId, opportunity: &Opportunity) -> Result<()> {
        if opportunity.sponsor_id == *reviewer_id {
            return Ok(());
        }
        let profile = self.profiles.get(reviewer_id)?;
        if profile.role == Role::Admin {
            return Ok(());
        }
        Err(KoraError::Forbidden(
            "only the posting sponsor or an admin can review submissions".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kora_core::OpportunityKind;
    use kora_storage::Profile;

    struct Fixture {
        service: SubmissionService,
        notifications: Arc<NotificationStore>,
        sponsor: UserId,
        talent: UserId,
        opportunity: OpportunityId,
    }

    fn fixture() -> Fixture {
        let submissions = Arc::new(SubmissionStore::new());
        let opportunities = Arc::new(OpportunityStore::new());
        let profiles = Arc::new(ProfileStore::new());
        let notifications = Arc::new(NotificationStore::new());

        let sponsor = Profile::new("sponsor".to_string(), Role::Sponsor, "USD".to_string());
        let sponsor_id = sponsor.user_id;
        profiles.upsert(sponsor);
        let talent = Profile::new("talent".to_string(), Role::Talent, "NGN".to_string());
        let talent_id = talent.user_id;
        profiles.upsert(talent);

        let opp = Opportunity::new(
            sponsor_id,
            "Logo design".to_string(),
            OpportunityKind::Bounty { reward: 300.0 },
            "desc".to_string(),
            "design".to_string(),
        );
        let opportunity_id = opp.id;
        opportunities.insert(opp).unwrap();

        Fixture {
            service: SubmissionService::new(
                submissions,
                opportunities.clone(),
                profiles,
                notifications.clone(),
            ),
            notifications,
            sponsor: sponsor_id,
            talent: talent_id,
            opportunity: opportunity_id,
        }
    }

    #[test]
    fn test_submit_and_review_notifies_talent() {
        let fx = fixture();
        let sub = fx
            .service
            .submit(fx.talent, fx.opportunity, "My logo", "https://example.com", "see link")
            .unwrap();

        fx.service
            .review(&fx.sponsor, &sub.id, SubmissionStatus::Approved)
            .unwrap();

        let notes = fx.notifications.list_for_user(&fx.talent);
        assert_eq!(notes.len(), 1);
        assert!(notes[0].message.contains("approved"));
    }

    #[test]
    fn test_duplicate_application_rejected() {
        let fx = fixture();
        fx.service
            .submit(fx.talent, fx.opportunity, "a", "https://x", "")
            .unwrap();
        let result = fx
            .service
            .submit(fx.talent, fx.opportunity, "b", "https://y", "");
        assert!(matches!(result, Err(KoraError::Conflict(_))));
    }

    #[test]
    fn test_talent_cannot_review() {
        let fx = fixture();
        let sub = fx
            .service
            .submit(fx.talent, fx.opportunity, "a", "https://x", "")
            .unwrap();
        let result = fx
            .service
            .review(&fx.talent, &sub.id, SubmissionStatus::Rejected);
        assert!(matches!(result, Err(KoraError::Forbidden(_))));
    }

    #[test]
    fn test_closed_opportunity_rejects_submissions() {
        let fx = fixture();
        fx.service
            .opportunities
            .close(&fx.opportunity, &fx.sponsor)
            .unwrap();
        let result = fx
            .service
            .submit(fx.talent, fx.opportunity, "late", "https://x", "");
        assert!(matches!(result, Err(KoraError::InvalidInput(_))));
    }
}
