//! Opportunity persistence

use kora_core::{KoraError, Opportunity, OpportunityId, OpportunityStatus, Result, UserId};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Listing filter; `None` fields match everything
#[derive(Clone, Debug, Default)]
pub struct OpportunityFilter {
    /// Only opportunities posted by this sponsor
    pub sponsor_id: Option<UserId>,
    /// Kind tag: "bounty", "grant", or "rfp"
    pub kind: Option<String>,
    /// Lifecycle status
    pub status: Option<OpportunityStatus>,
}

/// Store for opportunities
#[derive(Default)]
pub struct OpportunityStore {
    records: RwLock<HashMap<OpportunityId, Opportunity>>,
}

impl OpportunityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, opportunity: Opportunity) -> Result<()> {
        self.records.write().insert(opportunity.id, opportunity);
        Ok(())
    }

    pub fn get(&self, id: &OpportunityId) -> Result<Opportunity> {
        self.records
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| KoraError::NotFound {
                entity: "opportunity",
                id: id.to_string(),
            })
    }

    /// List matching opportunities, newest first
    pub fn list(&self, filter: &OpportunityFilter) -> Vec<Opportunity> {
        let records = self.records.read();
        let mut matches: Vec<Opportunity> = records
            .values()
            .filter(|o| filter.sponsor_id.map_or(true, |s| o.sponsor_id == s))
            .filter(|o| {
                filter
                    .kind
                    .as_deref()
                    .map_or(true, |k| o.kind.tag().eq_ignore_ascii_case(k))
            })
            .filter(|o| filter.status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matches
    }

    /// Close an opportunity; only its sponsor may do so
    pub fn close(&self, id: &OpportunityId, sponsor_id: &UserId) -> Result<Opportunity> {
        let mut records = self.records.write();
        let opportunity = records.get_mut(id).ok_or_else(|| KoraError::NotFound {
            entity: "opportunity",
            id: id.to_string(),
        })?;
        if opportunity.sponsor_id != *sponsor_id {
            return Err(KoraError::Forbidden(
                "only the posting sponsor can close an opportunity".to_string(),
            ));
        }
        opportunity.status = OpportunityStatus::Closed;
        Ok(opportunity.clone())
    }

    /// Delete an opportunity; only its sponsor may do so
    pub fn delete(&self, id: &OpportunityId, sponsor_id: &UserId) -> Result<()> {
        let mut records = self.records.write();
        let opportunity = records.get(id).ok_or_else(|| KoraError::NotFound {
            entity: "opportunity",
            id: id.to_string(),
        })?;
        if opportunity.sponsor_id != *sponsor_id {
            return Err(KoraError::Forbidden(
                "only the posting sponsor can delete an opportunity".to_string(),
            ));
        }
        records.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kora_core::OpportunityKind;

    fn bounty(sponsor: UserId, title: &str) -> Opportunity {
        Opportunity::new(
            sponsor,
            title.to_string(),
            OpportunityKind::Bounty { reward: 500.0 },
            "desc".to_string(),
            "development".to_string(),
        )
    }

    fn grant(sponsor: UserId) -> Opportunity {
        Opportunity::new(
            sponsor,
            "Grant".to_string(),
            OpportunityKind::Grant { max_amount: 10_000.0 },
            "desc".to_string(),
            "research".to_string(),
        )
    }

    #[test]
    fn test_filter_by_kind_and_sponsor() {
        let store = OpportunityStore::new();
        let sponsor = UserId::generate();
        store.insert(bounty(sponsor, "a")).unwrap();
        store.insert(bounty(UserId::generate(), "b")).unwrap();
        store.insert(grant(sponsor)).unwrap();

        let filter = OpportunityFilter {
            sponsor_id: Some(sponsor),
            kind: Some("bounty".to_string()),
            ..Default::default()
        };
        let results = store.list(&filter);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "a");
    }

    #[test]
    fn test_only_owner_can_delete() {
        let store = OpportunityStore::new();
        let sponsor = UserId::generate();
        let opp = bounty(sponsor, "mine");
        let id = opp.id;
        store.insert(opp).unwrap();

        let intruder = UserId::generate();
        assert!(matches!(
            store.delete(&id, &intruder),
            Err(KoraError::Forbidden(_))
        ));
        store.delete(&id, &sponsor).unwrap();
        assert!(store.get(&id).is_err());
    }

    #[test]
    fn test_close_flips_status() {
        let store = OpportunityStore::new();
        let sponsor = UserId::generate();
        let opp = bounty(sponsor, "open");
        let id = opp.id;
        store.insert(opp).unwrap();

        let closed = store.close(&id, &sponsor).unwrap();
        assert_eq!(closed.status, OpportunityStatus::Closed);

        let filter = OpportunityFilter {
            status: Some(OpportunityStatus::Active),
            ..Default::default()
        };
        assert!(store.list(&filter).is_empty());
    }
}
