//! Submission persistence
//!
//! Enforces the one-submission-per-(user, opportunity) invariant and
//! reports violations with the structured conflict error.

use kora_core::{
    KoraError, OpportunityId, Result, Submission, SubmissionId, SubmissionStatus, UserId,
};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

/// Store for talent submissions
#[derive(Default)]
pub struct SubmissionStore {
    records: RwLock<HashMap<SubmissionId, Submission>>,
    // uniqueness index over (user, opportunity)
    by_user_opportunity: RwLock<HashSet<(UserId, OpportunityId)>>,
}

impl SubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a submission; duplicate (user, opportunity) pairs conflict
    pub fn insert(&self, submission: Submission) -> Result<()> {
        let key = (submission.user_id, submission.opportunity_id);

        let mut index = self.by_user_opportunity.write();
        if index.contains(&key) {
            return Err(KoraError::Conflict(format!(
                "user {} already submitted to opportunity {}",
                submission.user_id, submission.opportunity_id
            )));
        }
        index.insert(key);
        self.records.write().insert(submission.id, submission);
        Ok(())
    }

    pub fn get(&self, id: &SubmissionId) -> Result<Submission> {
        self.records
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| KoraError::NotFound {
                entity: "submission",
                id: id.to_string(),
            })
    }

    pub fn list_by_opportunity(&self, opportunity_id: &OpportunityId) -> Vec<Submission> {
        let mut results: Vec<Submission> = self
            .records
            .read()
            .values()
            .filter(|s| s.opportunity_id == *opportunity_id)
            .cloned()
            .collect();
        results.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        results
    }

    pub fn list_by_user(&self, user_id: &UserId) -> Vec<Submission> {
        let mut results: Vec<Submission> = self
            .records
            .read()
            .values()
            .filter(|s| s.user_id == *user_id)
            .cloned()
            .collect();
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        results
    }

    /// Review a pending submission; terminal states never change again
    pub fn set_status(&self, id: &SubmissionId, status: SubmissionStatus) -> Result<Submission> {
        let mut records = self.records.write();
        let submission = records.get_mut(id).ok_or_else(|| KoraError::NotFound {
            entity: "submission",
            id: id.to_string(),
        })?;

        if submission.status.is_terminal() {
            return Err(KoraError::InvalidTransition {
                entity: "submission",
                from: format!("{:?}", submission.status),
                to: format!("{:?}", status),
            });
        }
        if status == SubmissionStatus::Pending {
            return Err(KoraError::InvalidTransition {
                entity: "submission",
                from: format!("{:?}", submission.status),
                to: format!("{:?}", status),
            });
        }

        submission.status = status;
        Ok(submission.clone())
    }
}
